use std::time::Instant;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::import::{validate_records, RecordRejection};
use crate::analyzer::bilan::{aggregate, PeriodReport};
use crate::analyzer::evolution::{compute_evolution, Evolution};
use crate::analyzer::temporal::ReportingPeriod;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::parser::deserializers::{parse_date, parse_datetime};
use crate::parser::types::InfractionRecord;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BilanRequest {
    pub periode: String,
    pub date_debut: Option<String>,
    pub date_fin: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BilanComplet {
    pub rapport: PeriodReport,
    pub evolution: Evolution,
    pub rejets: Vec<RecordRejection>,
    pub calcul_duration_ms: u64,
}

/// A date-only bound becomes the start of the day (`fin_de_journee = false`)
/// or its last second (`fin_de_journee = true`).
fn parse_date_flexible(s: &str, fin_de_journee: bool) -> Result<NaiveDateTime, AppError> {
    if let Some(dt) = parse_datetime(s) {
        return Ok(dt);
    }
    let date: NaiveDate = parse_date(s).ok_or_else(|| AppError::InvalidDate(s.to_string()))?;
    let time = if fin_de_journee {
        NaiveTime::from_hms_opt(23, 59, 59)
    } else {
        NaiveTime::from_hms_opt(0, 0, 0)
    }
    .ok_or_else(|| AppError::InvalidDate(s.to_string()))?;
    Ok(date.and_time(time))
}

/// Maps the period name sent by the console to a `ReportingPeriod`.
pub fn parse_period(request: &BilanRequest) -> Result<ReportingPeriod, AppError> {
    match request.periode.trim().to_lowercase().as_str() {
        "today" | "jour" | "aujourdhui" => Ok(ReportingPeriod::Today),
        "week" | "semaine" => Ok(ReportingPeriod::Week),
        "month" | "mois" => Ok(ReportingPeriod::Month),
        "year" | "annee" | "année" => Ok(ReportingPeriod::Year),
        "all" | "alltime" | "tout" => Ok(ReportingPeriod::AllTime),
        "custom" | "personnalise" | "personnalisé" => {
            let debut = request
                .date_debut
                .as_deref()
                .ok_or_else(|| AppError::InvalidDate("date de début manquante".to_string()))?;
            let fin = request
                .date_fin
                .as_deref()
                .ok_or_else(|| AppError::InvalidDate("date de fin manquante".to_string()))?;
            Ok(ReportingPeriod::Custom {
                start: parse_date_flexible(debut, false)?,
                end: parse_date_flexible(fin, true)?,
            })
        }
        other => Err(AppError::UnknownPeriod(other.to_string())),
    }
}

/// Shared report logic: invalid records are set aside as rejections,
/// the remaining ones are aggregated and compared with the previous period.
pub fn run_bilan_logic(
    records: &[InfractionRecord],
    request: &BilanRequest,
    now: NaiveDateTime,
    config: &AppConfig,
) -> Result<BilanComplet, AppError> {
    let start = Instant::now();
    let period = parse_period(request)?;
    let (valides, rejets) = validate_records(records, config);

    let rapport = aggregate(&valides, &period, now, config)?;
    let evolution = compute_evolution(&valides, &period, now, config)?;

    let calcul_duration_ms = start.elapsed().as_millis() as u64;
    log::info!(
        "Bilan {:?}: {} amendes sur {} tranches en {} ms",
        period,
        rapport.totals.count,
        rapport.buckets.len(),
        calcul_duration_ms
    );

    Ok(BilanComplet {
        rapport,
        evolution,
        rejets,
        calcul_duration_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn request(periode: &str, debut: Option<&str>, fin: Option<&str>) -> BilanRequest {
        BilanRequest {
            periode: periode.to_string(),
            date_debut: debut.map(str::to_string),
            date_fin: fin.map(str::to_string),
        }
    }

    #[test]
    fn test_parse_period_names() {
        assert_eq!(parse_period(&request("semaine", None, None)).unwrap(), ReportingPeriod::Week);
        assert_eq!(parse_period(&request("Month", None, None)).unwrap(), ReportingPeriod::Month);
        assert_eq!(parse_period(&request("tout", None, None)).unwrap(), ReportingPeriod::AllTime);
        assert!(matches!(
            parse_period(&request("trimestre", None, None)),
            Err(AppError::UnknownPeriod(_))
        ));
    }

    #[test]
    fn test_parse_custom_date_only_end_covers_day() {
        let p = parse_period(&request("custom", Some("2025-09-01"), Some("2025-09-30"))).unwrap();
        assert_eq!(
            p,
            ReportingPeriod::Custom {
                start: dt("2025-09-01 00:00:00"),
                end: dt("2025-09-30 23:59:59"),
            }
        );
    }

    #[test]
    fn test_parse_custom_missing_or_bad_dates() {
        assert!(matches!(
            parse_period(&request("custom", Some("2025-09-01"), None)),
            Err(AppError::InvalidDate(_))
        ));
        assert!(matches!(
            parse_period(&request("custom", Some("hier"), Some("2025-09-30"))),
            Err(AppError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_run_bilan_inverted_custom_range() {
        let res = run_bilan_logic(
            &[],
            &request("custom", Some("2025-10-01"), Some("2025-09-01")),
            dt("2026-01-01 00:00:00"),
            &AppConfig::default(),
        );
        assert!(matches!(res, Err(AppError::InvalidRange { .. })));
    }

    #[test]
    fn test_run_bilan_sets_invalid_records_aside() {
        let now = dt("2026-03-18 15:00:00");
        let t = dt("2026-03-18 09:00:00");
        let records = vec![
            InfractionRecord::new("A", 1_000, t, "recorded", t),
            InfractionRecord::new("B", -1_000, t, "recorded", t),
        ];
        let bilan = run_bilan_logic(
            &records,
            &request("today", None, None),
            now,
            &AppConfig::default(),
        )
        .unwrap();
        assert_eq!(bilan.rapport.totals.count, 1);
        assert_eq!(bilan.rejets.len(), 1);
        assert_eq!(bilan.rejets[0].id, "B");
        assert_eq!(bilan.evolution.count.current, 1);
    }
}
