//! End-to-end checks of the data-preparation pipeline.

use protquant::pipeline::{prepare, PipelineOutcome, Stage};
use protquant::{Column, DataTable, Imputation, Normalization, PreparationConfig, Transform, Value};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

fn raw_table() -> DataTable {
    DataTable::new(vec![
        Column::from_text("peptide", &["AAK", "GLK", "MFR", "TYS"]),
        Column::from_text("intensity_a", &["2", "4", "0", "16"]),
        Column::from_text("intensity_b", &["8", "", "2", "4"]),
        Column::from_text("decoy", &["", "", "+", ""]),
        Column::from_floats("score", &[0.99, 0.80, 0.95, 0.05]),
    ])
    .unwrap()
}

// =============================================================================
// STAGE SEMANTICS
// =============================================================================

#[test]
fn log2_then_median_normalization() {
    let table = DataTable::new(vec![Column::from_text(
        "v",
        &["2", "4", "8", "16"],
    )])
    .unwrap();
    let config = PreparationConfig::new(vec![0])
        .coerce(vec![0], vec![0])
        .transform(Transform::Log2, vec![0])
        .normalize(Normalization::Median, vec![0]);
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
    let outcome = prepare(&table, &config, &mut rng).unwrap();
    let PipelineOutcome::Prepared(snapshots) = outcome else {
        panic!("no filters configured");
    };

    // log2([2,4,8,16]) = [1,2,3,4]
    assert_eq!(
        snapshots.transformed.float_column(0).unwrap(),
        vec![1.0, 2.0, 3.0, 4.0]
    );
    // median 2.5 subtracted
    assert_eq!(
        snapshots.normalized.float_column(0).unwrap(),
        vec![-1.5, -0.5, 0.5, 1.5]
    );
}

#[test]
fn none_strategies_are_identity() {
    let table = raw_table();
    let config = PreparationConfig::new(vec![0, 1, 2, 3, 4]).coerce(vec![1, 2], vec![1, 2]);
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
    let PipelineOutcome::Prepared(snapshots) = prepare(&table, &config, &mut rng).unwrap() else {
        panic!("no filters configured");
    };
    assert_eq!(snapshots.transformed, snapshots.float);
    assert_eq!(snapshots.normalized, snapshots.transformed);
    assert_eq!(snapshots.imputed, snapshots.normalized);
}

#[test]
fn float_columns_are_numeric_after_coercion() {
    let table = raw_table();
    let config = PreparationConfig::new(vec![0, 1, 2, 3, 4])
        .coerce(vec![1, 2], vec![1, 2])
        .zero_is_missing(true);
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
    let PipelineOutcome::Prepared(snapshots) = prepare(&table, &config, &mut rng).unwrap() else {
        panic!("no filters configured");
    };
    for col in [1, 2] {
        for row in 0..snapshots.float.n_rows() {
            assert!(matches!(
                snapshots.float.value(row, col),
                Value::Number(_) | Value::Missing
            ));
        }
    }
    // The measured zero and the empty cell both became missing.
    assert_eq!(snapshots.float.value(2, 1), &Value::Missing);
    assert_eq!(snapshots.float.value(1, 2), &Value::Missing);
}

// =============================================================================
// FULL RUN
// =============================================================================

fn full_config() -> PreparationConfig {
    PreparationConfig::new(vec![0, 1, 2, 3, 4])
        .coerce(vec![1, 2], vec![1, 2])
        .zero_is_missing(true)
        .transform(Transform::Log2, vec![1, 2])
        .normalize(Normalization::Median, vec![1, 2])
        .impute(
            Imputation::NormalDistribution {
                shift: 1.8,
                width: 0.3,
            },
            vec![1, 2],
        )
        .exclude(vec![3])
        .min_score(4, 0.5)
}

#[test]
fn all_eight_snapshots_are_retrievable() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(17);
    let PipelineOutcome::Prepared(snapshots) =
        prepare(&raw_table(), &full_config(), &mut rng).unwrap()
    else {
        panic!("rows should survive");
    };

    for stage in Stage::ALL {
        // Every stage has a named, independently owned table.
        let _ = snapshots.get(stage);
    }
    // The decoy row fell to the exclusion filter, the low score to the
    // score filter.
    assert_eq!(snapshots.excluded.n_rows(), 3);
    assert_eq!(snapshots.score_filtered.n_rows(), 2);
    assert_eq!(snapshots.final_table().index(), &[0, 1]);
}

#[test]
fn seeded_runs_are_reproducible() {
    let mut rng_a = Xoshiro256PlusPlus::seed_from_u64(99);
    let mut rng_b = Xoshiro256PlusPlus::seed_from_u64(99);
    let PipelineOutcome::Prepared(a) = prepare(&raw_table(), &full_config(), &mut rng_a).unwrap()
    else {
        panic!("rows should survive");
    };
    let PipelineOutcome::Prepared(b) = prepare(&raw_table(), &full_config(), &mut rng_b).unwrap()
    else {
        panic!("rows should survive");
    };
    assert_eq!(a.imputed, b.imputed);
}

#[test]
fn score_filter_empties_into_the_no_data_outcome() {
    let config = full_config().min_score(4, 2.0);
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(17);
    match prepare(&raw_table(), &config, &mut rng).unwrap() {
        PipelineOutcome::NoDataLeft(snapshots) => {
            assert_eq!(snapshots.score_filtered.n_rows(), 0);
            assert!(snapshots.imputed.n_rows() > 0);
        }
        PipelineOutcome::Prepared(_) => panic!("expected the no-data outcome"),
    }
}
