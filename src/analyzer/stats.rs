//! Fonctions statistiques communes aux bilans.

/// Arithmetic mean. Returns 0.0 if the slice is empty.
pub fn moyenne(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Percentile with linear interpolation. `p` is in [0, 100].
/// Returns 0.0 if the slice is empty.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let rank = p / 100.0 * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let frac = rank - lower as f64;
        sorted[lower] * (1.0 - frac) + sorted[upper] * frac
    }
}

pub fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Share of `part` in `total` as a percentage with one decimal; 0.0 when total is 0.
pub fn pct(part: i64, total: i64) -> f64 {
    if total == 0 {
        0.0
    } else {
        round1(part as f64 / total as f64 * 100.0)
    }
}

/// Relative change from `previous` to `current` in percent; None when previous is 0.
pub fn variation_pct(current: i64, previous: i64) -> Option<f64> {
    if previous == 0 {
        None
    } else {
        Some(round1((current - previous) as f64 / previous as f64 * 100.0))
    }
}
