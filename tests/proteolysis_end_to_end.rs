//! End-to-end limited-proteolysis scenarios across a 2×2 band/lane grid.

use protquant::{
    Column, DataTable, LimitedProteolysisAnalysis, PreparationConfig, ProteinSequences,
    ProteolysisConfig, SampleRelation, Statistic, Value, NO_CLEAVAGE_MESSAGE,
};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

const PROTEIN: &str = "MKTAYIAKQRQISFVKSHFSRQLEERLGLIEVQAPILSRVGDGTQDNLSGAEKAVQ";

/// Three peptides with a shared 3-replicate control and a 2×2 grid.
/// `present` marks which peptides sit at control level in the (0, 0) cell.
fn grid_table(present: &[bool; 3]) -> DataTable {
    let level = |p: bool, base: f64| if p { base } else { base / 3.0 };
    let p = present;
    DataTable::new(vec![
        Column::from_text("sequence", &["QISFV", "AYIAK", "SHFSR"]),
        Column::from_floats("score", &[0.97, 0.92, 0.88]),
        // shared control
        Column::from_floats("c1", &[10.0, 12.0, 9.0]),
        Column::from_floats("c2", &[10.2, 12.1, 9.2]),
        Column::from_floats("c3", &[9.9, 11.8, 8.9]),
        // band 0 / lane 0
        Column::from_floats("b0l0r1", &[level(p[0], 10.0), level(p[1], 12.0), level(p[2], 9.0)]),
        Column::from_floats("b0l0r2", &[level(p[0], 10.1), level(p[1], 12.2), level(p[2], 9.1)]),
        Column::from_floats("b0l0r3", &[level(p[0], 9.9), level(p[1], 11.9), level(p[2], 8.9)]),
        // band 1 / lane 1: nothing at control level
        Column::from_floats("b1l1r1", &[3.0, 4.0, 3.0]),
        Column::from_floats("b1l1r2", &[3.1, 4.1, 3.1]),
        Column::from_floats("b1l1r3", &[2.9, 3.9, 2.9]),
    ])
    .unwrap()
}

fn engine(relation: SampleRelation) -> LimitedProteolysisAnalysis {
    let preparation = PreparationConfig::new((0..11).collect())
        .coerce(vec![], (2..11).collect())
        .min_score(1, 0.5);
    let config = ProteolysisConfig::new(
        preparation,
        vec!["band0".into(), "band1".into()],
        vec!["lane0".into(), "lane1".into()],
        0,
        vec![2, 3, 4],
    )
    .score_col(1)
    .relation(relation)
    .cell(0, 0, vec![5, 6, 7])
    .cell(1, 1, vec![8, 9, 10]);
    LimitedProteolysisAnalysis::new(config)
}

// =============================================================================
// DETECTION
// =============================================================================

#[test]
fn detected_peptides_sort_by_terminus() {
    let sequences = ProteinSequences::recombinant(PROTEIN);
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(21);
    let report = engine(SampleRelation::Independent)
        .run(&grid_table(&[true, true, false]), &sequences, &mut rng)
        .expect_completed();

    // Rows sorted by N-terminus: AYIAK (4), QISFV (11), SHFSR (16).
    let sequences_col = &report.table.id_columns[0];
    assert_eq!(sequences_col.values[0], Value::Text("AYIAK".into()));
    assert_eq!(sequences_col.values[1], Value::Text("QISFV".into()));
    assert_eq!(sequences_col.values[2], Value::Text("SHFSR".into()));

    // Only cells with data produce blocks.
    assert_eq!(report.table.blocks.len(), 2);
    let block = report
        .table
        .block("band0", "lane0", Statistic::Equivalence)
        .unwrap();
    // AYIAK and QISFV sit at control level; SHFSR does not.
    assert!(block.values[0] < 0.05);
    assert!(block.values[1] < 0.05);
    assert!(!(block.values[2] < 0.05));

    // The far-away band1/lane1 cell is never significant.
    let other = report
        .table
        .block("band1", "lane1", Statistic::Equivalence)
        .unwrap();
    assert!(other.values.iter().all(|&v| !(v < 0.05)));
}

#[test]
fn paired_relation_detects_the_same_cell() {
    let sequences = ProteinSequences::recombinant(PROTEIN);
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(21);
    let report = engine(SampleRelation::Paired)
        .run(&grid_table(&[true, false, false]), &sequences, &mut rng)
        .expect_completed();
    let block = report
        .table
        .block("band0", "lane0", Statistic::Equivalence)
        .unwrap();
    // QISFV sorts second by terminus (AYIAK first).
    assert!(block.values[1] < 0.05, "Ptost = {}", block.values[1]);
}

// =============================================================================
// ABORT SCENARIOS
// =============================================================================

#[test]
fn all_cells_insignificant_returns_no_cleavage() {
    let sequences = ProteinSequences::recombinant(PROTEIN);
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(21);
    let outcome = engine(SampleRelation::Independent).run(
        &grid_table(&[false, false, false]),
        &sequences,
        &mut rng,
    );
    assert!(!outcome.is_completed());
    assert_eq!(outcome.message(), Some(NO_CLEAVAGE_MESSAGE));
}

#[test]
fn native_lookup_failure_aborts_the_run() {
    // A native lookup is requested only when a native sequence exists, so
    // force the failure through a reference that claims one but errors.
    struct BrokenReference;
    impl protquant::SequenceReference for BrokenReference {
        fn find_peptide_location(
            &self,
            peptide: &str,
            use_recombinant: bool,
        ) -> Result<Option<protquant::PeptideLocation>, protquant::SequenceError> {
            if use_recombinant {
                ProteinSequences::recombinant(PROTEIN).find_peptide_location(peptide, true)
            } else {
                Err(protquant::SequenceError::NoNativeSequence)
            }
        }
        fn has_native(&self) -> bool {
            true
        }
    }

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(21);
    let outcome = engine(SampleRelation::Independent).run(
        &grid_table(&[true, true, false]),
        &BrokenReference,
        &mut rng,
    );
    assert!(!outcome.is_completed());
    assert!(outcome.message().unwrap().contains("native"));
}
