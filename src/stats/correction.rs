//! Multiple-testing corrections.
//!
//! The family-wise and false-discovery-rate procedures used by the profiling
//! engine. All methods return adjusted p-values aligned with the input, NaN
//! entries pass through unchanged and do not count toward the number of
//! tests, and adjusted values are clipped to 1.

use serde::{Deserialize, Serialize};

/// p-value correction procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CorrectionMethod {
    /// No correction.
    #[default]
    None,
    /// Bonferroni: `p · m`.
    Bonferroni,
    /// Šidák: `1 − (1−p)^m`.
    Sidak,
    /// Holm step-down.
    Holm,
    /// Holm with Šidák factors.
    HolmSidak,
    /// Simes–Hochberg step-up.
    SimesHochberg,
    /// Hommel closed-test procedure.
    Hommel,
    /// Benjamini–Hochberg false discovery rate.
    BenjaminiHochberg,
    /// Benjamini–Yekutieli false discovery rate under dependence.
    BenjaminiYekutieli,
}

impl std::fmt::Display for CorrectionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CorrectionMethod::None => "none",
            CorrectionMethod::Bonferroni => "bonferroni",
            CorrectionMethod::Sidak => "sidak",
            CorrectionMethod::Holm => "holm",
            CorrectionMethod::HolmSidak => "holm-sidak",
            CorrectionMethod::SimesHochberg => "simes-hochberg",
            CorrectionMethod::Hommel => "hommel",
            CorrectionMethod::BenjaminiHochberg => "benjamini-hochberg",
            CorrectionMethod::BenjaminiYekutieli => "benjamini-yekutieli",
        };
        write!(f, "{}", name)
    }
}

/// Adjust p-values for multiple testing.
///
/// The output has the same length and order as the input. NaN entries stay
/// NaN; the effective number of tests `m` counts only the finite entries.
pub fn adjust_p_values(p_values: &[f64], method: CorrectionMethod) -> Vec<f64> {
    if method == CorrectionMethod::None {
        return p_values.to_vec();
    }

    // Work on the finite entries only, remembering their positions.
    let mut positions = Vec::new();
    let mut finite = Vec::new();
    for (i, &p) in p_values.iter().enumerate() {
        if !p.is_nan() {
            positions.push(i);
            finite.push(p);
        }
    }
    let m = finite.len();
    let mut result = vec![f64::NAN; p_values.len()];
    if m == 0 {
        return result;
    }

    // Sort ascending, adjust in the sorted domain, then unsort.
    let mut order: Vec<usize> = (0..m).collect();
    order.sort_by(|&a, &b| finite[a].total_cmp(&finite[b]));
    let sorted: Vec<f64> = order.iter().map(|&i| finite[i]).collect();
    let adjusted_sorted = adjust_sorted(&sorted, method);

    for (rank, &idx) in order.iter().enumerate() {
        result[positions[idx]] = adjusted_sorted[rank].min(1.0);
    }
    result
}

fn adjust_sorted(p: &[f64], method: CorrectionMethod) -> Vec<f64> {
    let m = p.len();
    let m_f = m as f64;
    match method {
        CorrectionMethod::None => p.to_vec(),
        CorrectionMethod::Bonferroni => p.iter().map(|&v| v * m_f).collect(),
        CorrectionMethod::Sidak => p.iter().map(|&v| 1.0 - (1.0 - v).powf(m_f)).collect(),
        CorrectionMethod::Holm => {
            let raw: Vec<f64> = p
                .iter()
                .enumerate()
                .map(|(i, &v)| (m_f - i as f64) * v)
                .collect();
            cummax(&raw)
        }
        CorrectionMethod::HolmSidak => {
            let raw: Vec<f64> = p
                .iter()
                .enumerate()
                .map(|(i, &v)| 1.0 - (1.0 - v).powf(m_f - i as f64))
                .collect();
            cummax(&raw)
        }
        CorrectionMethod::SimesHochberg => {
            let raw: Vec<f64> = p
                .iter()
                .enumerate()
                .map(|(i, &v)| (m_f - i as f64) * v)
                .collect();
            cummin_from_end(&raw)
        }
        CorrectionMethod::Hommel => hommel(p),
        CorrectionMethod::BenjaminiHochberg => {
            let raw: Vec<f64> = p
                .iter()
                .enumerate()
                .map(|(i, &v)| v * m_f / (i as f64 + 1.0))
                .collect();
            cummin_from_end(&raw)
        }
        CorrectionMethod::BenjaminiYekutieli => {
            let harmonic: f64 = (1..=m).map(|j| 1.0 / j as f64).sum();
            let raw: Vec<f64> = p
                .iter()
                .enumerate()
                .map(|(i, &v)| v * m_f * harmonic / (i as f64 + 1.0))
                .collect();
            cummin_from_end(&raw)
        }
    }
}

/// Hommel's procedure on sorted p-values (the `p.adjust` formulation).
fn hommel(p: &[f64]) -> Vec<f64> {
    let n = p.len();
    if n == 1 {
        return p.to_vec();
    }
    let q_min = (0..n)
        .map(|i| n as f64 * p[i] / (i as f64 + 1.0))
        .fold(f64::INFINITY, f64::min);
    let mut pa = vec![q_min; n];
    let mut q = vec![q_min; n];

    for mm in (2..n).rev() {
        let cut = n - mm + 1;
        // Smallest bound over the top block, denominators 2..=mm.
        let q1 = (cut..n)
            .map(|j| mm as f64 * p[j] / (j - cut + 2) as f64)
            .fold(f64::INFINITY, f64::min);
        for (j, q_j) in q.iter_mut().enumerate().take(cut) {
            *q_j = (mm as f64 * p[j]).min(q1);
        }
        let tail = q[cut - 1];
        for q_j in q.iter_mut().skip(cut) {
            *q_j = tail;
        }
        for (pa_j, &q_j) in pa.iter_mut().zip(&q) {
            *pa_j = pa_j.max(q_j);
        }
    }
    pa.iter().zip(p).map(|(&a, &v)| a.max(v)).collect()
}

fn cummax(values: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    let mut running = f64::NEG_INFINITY;
    for &v in values {
        running = running.max(v);
        out.push(running);
    }
    out
}

fn cummin_from_end(values: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; values.len()];
    let mut running = f64::INFINITY;
    for i in (0..values.len()).rev() {
        running = running.min(values[i]);
        out[i] = running;
    }
    out
}
