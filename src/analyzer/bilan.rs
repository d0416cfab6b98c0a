use chrono::NaiveDateTime;
use serde::Serialize;

use super::classifier::{classify, ClassifiedFine, FineStatus};
use super::stats::{moyenne, pct};
use super::temporal::{
    generate_buckets, locate_bucket, resolve_range, Bucket, DateRange, ReportingPeriod,
};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::parser::types::InfractionRecord;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub pending: usize,
    pub paid: usize,
    pub overdue: usize,
    pub disputed: usize,
}

impl StatusCounts {
    fn incr(&mut self, status: FineStatus) {
        match status {
            FineStatus::Pending => self.pending += 1,
            FineStatus::Paid => self.paid += 1,
            FineStatus::Overdue => self.overdue += 1,
            FineStatus::Disputed => self.disputed += 1,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketResult {
    pub key: String,
    pub label: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub count: usize,
    pub par_statut: StatusCounts,
    pub amount_total: i64,
    /// Montants des amendes payées.
    pub amount_collected: i64,
}

impl BucketResult {
    fn empty(bucket: &Bucket) -> Self {
        BucketResult {
            key: bucket.key.clone(),
            label: bucket.label.clone(),
            start: bucket.start,
            end: bucket.end,
            count: 0,
            par_statut: StatusCounts::default(),
            amount_total: 0,
            amount_collected: 0,
        }
    }

    fn add(&mut self, record: &InfractionRecord, fine: &ClassifiedFine) {
        self.count += 1;
        self.par_statut.incr(fine.status);
        self.amount_total += record.amount;
        if fine.status == FineStatus::Paid {
            self.amount_collected += record.amount;
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub count: usize,
    pub par_statut: StatusCounts,
    /// Somme des montants de base, hors majorations.
    pub amount_total: i64,
    pub amount_collected: i64,
    pub amount_pending: i64,
    /// Montants en retard, majorations comprises.
    pub amount_overdue: i64,
    pub amount_disputed: i64,
    pub penalties_total: i64,
    pub pct_collected: f64,
    pub pct_pending: f64,
    pub pct_overdue: f64,
    pub average_per_bucket: f64,
}

impl Totals {
    fn add(&mut self, record: &InfractionRecord, fine: &ClassifiedFine) {
        self.count += 1;
        self.par_statut.incr(fine.status);
        self.amount_total += record.amount;
        match fine.status {
            FineStatus::Paid => self.amount_collected += record.amount,
            FineStatus::Pending => self.amount_pending += record.amount,
            FineStatus::Overdue => {
                self.amount_overdue += record.amount + fine.penalty;
                self.penalties_total += fine.penalty;
            }
            FineStatus::Disputed => self.amount_disputed += record.amount,
        }
    }

    fn finalize(&mut self, bucket_counts: &[f64]) {
        self.pct_collected = pct(self.amount_collected, self.amount_total);
        self.pct_pending = pct(self.amount_pending, self.amount_total);
        self.pct_overdue = pct(self.amount_overdue, self.amount_total);
        self.average_per_bucket = moyenne(bucket_counts);
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodReport {
    pub period: ReportingPeriod,
    pub range: DateRange,
    pub buckets: Vec<BucketResult>,
    pub totals: Totals,
}

/// Agrège les amendes d'une période en tranches et totaux.
///
/// - les enregistrements hors plage sont ignorés avant classification ;
/// - les amendes annulées sont exclues ;
/// - la structure des tranches est fixe, les tranches sans données restent à 0.
pub fn aggregate(
    records: &[InfractionRecord],
    period: &ReportingPeriod,
    now: NaiveDateTime,
    config: &AppConfig,
) -> Result<PeriodReport, AppError> {
    let range = resolve_range(period, now, config)?;
    let layout = generate_buckets(period, &range)?;

    let mut buckets: Vec<BucketResult> = layout.iter().map(BucketResult::empty).collect();
    let mut totals = Totals::default();

    for record in records.iter().filter(|r| range.contains(r.occurred_at)) {
        let Some(fine) = classify(record, now, config)? else {
            continue;
        };
        match locate_bucket(&layout, record.occurred_at) {
            Some(i) => {
                buckets[i].add(record, &fine);
                totals.add(record, &fine);
            }
            None => log::warn!(
                "Amende {} hors des tranches de la période ({})",
                record.id,
                record.occurred_at
            ),
        }
    }

    let counts: Vec<f64> = buckets.iter().map(|b| b.count as f64).collect();
    totals.finalize(&counts);

    Ok(PeriodReport {
        period: *period,
        range,
        buckets,
        totals,
    })
}

/// Totals over an explicit range, without bucket layout.
pub fn summarize(
    records: &[InfractionRecord],
    range: &DateRange,
    now: NaiveDateTime,
    config: &AppConfig,
) -> Result<Totals, AppError> {
    let mut totals = Totals::default();
    for record in records.iter().filter(|r| range.contains(r.occurred_at)) {
        if let Some(fine) = classify(record, now, config)? {
            totals.add(record, &fine);
        }
    }
    totals.finalize(&[totals.count as f64]);
    Ok(totals)
}
