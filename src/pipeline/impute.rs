//! Stage 4: missing-value imputation.
//!
//! Missing entries are replaced with draws from a down-shifted normal
//! distribution, the standard device for left-censored intensity data:
//! values absent from a sample are most likely below the detection limit,
//! so replacements come from the low tail of the observed distribution.
//!
//! Draws go through the injected generator only; seeding it makes the whole
//! run reproducible.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::config::{Imputation, PreparationConfig};
use crate::stats::{nan_median, nan_std};
use crate::table::{DataTable, TableError, Value};

pub(crate) fn apply<R: Rng + ?Sized>(
    table: &DataTable,
    config: &PreparationConfig,
    rng: &mut R,
) -> Result<DataTable, TableError> {
    match config.imputation {
        Imputation::None => Ok(table.clone()),
        Imputation::NormalDistribution { shift, width } => {
            normal_distribution(table, &config.impute_cols, shift, width, rng)
        }
    }
}

fn normal_distribution<R: Rng + ?Sized>(
    table: &DataTable,
    cols: &[usize],
    shift: f64,
    width: f64,
    rng: &mut R,
) -> Result<DataTable, TableError> {
    let mut out = table.clone();
    for &col in cols {
        let floats = out.float_column(col)?;
        let center = nan_median(&floats);
        let spread = nan_std(&floats);
        if !center.is_finite() || !spread.is_finite() {
            // Not enough measurements to place the distribution.
            continue;
        }
        let dist = match Normal::new(center - spread * shift, spread * width) {
            Ok(d) => d,
            Err(_) => continue,
        };
        let values = floats
            .into_iter()
            .map(|v| {
                if v.is_nan() {
                    Value::Number(dist.sample(rng))
                } else {
                    Value::Number(v)
                }
            })
            .collect();
        out = out.with_column_values(col, values)?;
    }
    Ok(out)
}
