use chrono::NaiveDateTime;
use serde::Serialize;

use super::bilan::{summarize, Totals};
use super::stats::variation_pct;
use super::temporal::{previous_range, resolve_range, DateRange, ReportingPeriod};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::parser::types::InfractionRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Variation {
    pub current: i64,
    pub previous: i64,
    pub delta: i64,
    /// None quand la période précédente vaut 0.
    pub delta_pct: Option<f64>,
}

impl Variation {
    pub fn new(current: i64, previous: i64) -> Self {
        Variation {
            current,
            previous,
            delta: current - previous,
            delta_pct: variation_pct(current, previous),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evolution {
    pub current_range: DateRange,
    pub previous_range: DateRange,
    pub count: Variation,
    pub amount_total: Variation,
    pub amount_collected: Variation,
    pub amount_overdue: Variation,
}

/// Évolution par rapport à la période immédiatement précédente, de même durée.
/// Les deux périodes sont classifiées au même instant `now`.
pub fn compute_evolution(
    records: &[InfractionRecord],
    period: &ReportingPeriod,
    now: NaiveDateTime,
    config: &AppConfig,
) -> Result<Evolution, AppError> {
    let current_range = resolve_range(period, now, config)?;
    let prev_range = previous_range(&current_range);

    let current = summarize(records, &current_range, now, config)?;
    let previous = summarize(records, &prev_range, now, config)?;

    Ok(diff_totals(current_range, prev_range, &current, &previous))
}

pub fn diff_totals(
    current_range: DateRange,
    previous_range: DateRange,
    current: &Totals,
    previous: &Totals,
) -> Evolution {
    Evolution {
        current_range,
        previous_range,
        count: Variation::new(current.count as i64, previous.count as i64),
        amount_total: Variation::new(current.amount_total, previous.amount_total),
        amount_collected: Variation::new(current.amount_collected, previous.amount_collected),
        amount_overdue: Variation::new(current.amount_overdue, previous.amount_overdue),
    }
}
