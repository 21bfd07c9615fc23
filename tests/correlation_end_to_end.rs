//! End-to-end correlation analysis scenario.

use protquant::{
    Column, CorrelationAnalysis, CorrelationConfig, CorrelationMethod, DataTable, Normalization,
    PreparationConfig,
};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Five samples with correlated intensity profiles over ten features.
fn five_sample_table() -> DataTable {
    let base: Vec<f64> = (1..=10).map(|i| i as f64).collect();
    let scaled: Vec<f64> = base.iter().map(|v| v * 2.0 + 1.0).collect();
    let inverted: Vec<f64> = base.iter().map(|v| 20.0 - v).collect();
    let bumpy: Vec<f64> = base
        .iter()
        .enumerate()
        .map(|(i, v)| v + if i % 2 == 0 { 3.0 } else { -3.0 })
        .collect();
    let flat_noise: Vec<f64> = base
        .iter()
        .enumerate()
        .map(|(i, _)| 5.0 + ((i * 7) % 5) as f64)
        .collect();
    DataTable::new(vec![
        Column::from_text(
            "feature",
            &["f1", "f2", "f3", "f4", "f5", "f6", "f7", "f8", "f9", "f10"],
        ),
        Column::from_floats("s1", &base),
        Column::from_floats("s2", &scaled),
        Column::from_floats("s3", &inverted),
        Column::from_floats("s4", &bumpy),
        Column::from_floats("s5", &flat_noise),
    ])
    .unwrap()
}

#[test]
fn pearson_matrix_is_square_symmetric_and_bounded() {
    let preparation = PreparationConfig::new(vec![0, 1, 2, 3, 4, 5])
        .coerce(vec![], vec![1, 2, 3, 4, 5])
        .normalize(Normalization::Median, vec![1, 2, 3, 4, 5]);
    let engine = CorrelationAnalysis::new(CorrelationConfig::new(
        preparation,
        CorrelationMethod::Pearson,
    ));
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
    let report = engine.run(&five_sample_table(), &mut rng).expect_completed();

    assert_eq!(report.matrix.nrows(), 5);
    assert_eq!(report.matrix.ncols(), 5);
    assert_eq!(report.labels, vec!["s1", "s2", "s3", "s4", "s5"]);
    for i in 0..5 {
        assert_eq!(report.matrix[(i, i)], 1.0);
        for j in 0..5 {
            let r = report.matrix[(i, j)];
            assert_eq!(r, report.matrix[(j, i)]);
            assert!((-1.0 - 1e-12..=1.0 + 1e-12).contains(&r), "r = {}", r);
        }
    }
    // Known relationships survive the normalization.
    assert!((report.matrix[(0, 1)] - 1.0).abs() < 1e-9);
    assert!((report.matrix[(0, 2)] + 1.0).abs() < 1e-9);
}

#[test]
fn rank_methods_agree_on_monotone_columns() {
    for method in [CorrelationMethod::Spearman, CorrelationMethod::Kendall] {
        let preparation =
            PreparationConfig::new(vec![0, 1, 2, 3]).coerce(vec![], vec![1, 2, 3]);
        let engine = CorrelationAnalysis::new(CorrelationConfig::new(preparation, method));
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        let report = engine.run(&five_sample_table(), &mut rng).expect_completed();
        // s2 is a strictly increasing function of s1, s3 strictly
        // decreasing; both rank correlations are exact.
        assert!((report.matrix[(0, 1)] - 1.0).abs() < 1e-12, "{}", method);
        assert!((report.matrix[(0, 2)] + 1.0).abs() < 1e-12, "{}", method);
    }
}
