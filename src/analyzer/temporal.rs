use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::config::AppConfig;
use crate::error::AppError;

/// Période de reporting sélectionnée dans le tableau de bord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum ReportingPeriod {
    Today,
    Week,
    Month,
    Year,
    AllTime,
    Custom {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

/// Closed interval `[start, end]` of a resolved period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    pub fn contains(&self, t: NaiveDateTime) -> bool {
        self.start <= t && t <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    pub key: String,
    pub label: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn first_of_month(year: i32, month: u32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, month, 1).map(midnight)
}

fn first_of_next_month(year: i32, month: u32) -> Option<NaiveDateTime> {
    if month == 12 {
        first_of_month(year + 1, 1)
    } else {
        first_of_month(year, month + 1)
    }
}

fn out_of_calendar(what: &str) -> AppError {
    AppError::InvalidDate(format!("{} hors calendrier", what))
}

/// Résout la plage `[début, fin]` d'une période relativement à `now`.
pub fn resolve_range(
    period: &ReportingPeriod,
    now: NaiveDateTime,
    config: &AppConfig,
) -> Result<DateRange, AppError> {
    let start = match *period {
        ReportingPeriod::Today => midnight(now.date()),
        ReportingPeriod::Week => now - Duration::days(7),
        ReportingPeriod::Month => {
            first_of_month(now.year(), now.month()).ok_or_else(|| out_of_calendar("mois"))?
        }
        ReportingPeriod::Year => {
            first_of_month(now.year(), 1).ok_or_else(|| out_of_calendar("année"))?
        }
        ReportingPeriod::AllTime => midnight(config.date_lancement),
        ReportingPeriod::Custom { start, end } => {
            if start > end {
                return Err(invalid_range(start, end));
            }
            return Ok(DateRange { start, end });
        }
    };

    if start > now {
        return Err(invalid_range(start, now));
    }
    Ok(DateRange { start, end: now })
}

fn invalid_range(start: NaiveDateTime, end: NaiveDateTime) -> AppError {
    AppError::InvalidRange {
        debut: start.format("%Y-%m-%d %H:%M:%S").to_string(),
        fin: end.format("%Y-%m-%d %H:%M:%S").to_string(),
    }
}

/// The range of equal length ending one nanosecond before `range` starts,
/// so that no instant falls between the two.
pub fn previous_range(range: &DateRange) -> DateRange {
    let length = range.end - range.start;
    let end = range.start - Duration::nanoseconds(1);
    DateRange {
        start: end - length,
        end,
    }
}

/// Generates the fixed bucket layout of a period over its resolved range.
/// The layout never depends on the records, so empty buckets still appear.
pub fn generate_buckets(
    period: &ReportingPeriod,
    range: &DateRange,
) -> Result<Vec<Bucket>, AppError> {
    match period {
        ReportingPeriod::Today => Ok(generate_hour_buckets(range)),
        ReportingPeriod::Week => Ok(generate_weekday_buckets(range)),
        ReportingPeriod::Month => generate_week_of_month_buckets(range),
        ReportingPeriod::Year => generate_month_buckets(range),
        ReportingPeriod::AllTime => generate_year_buckets(range),
        ReportingPeriod::Custom { .. } => Ok(generate_day_buckets(range)),
    }
}

/// 6 tranches de 4 heures depuis minuit.
fn generate_hour_buckets(range: &DateRange) -> Vec<Bucket> {
    let day_start = midnight(range.start.date());
    (0..6)
        .map(|i| {
            let start = day_start + Duration::hours(4 * i);
            Bucket {
                key: format!("{:02}h", 4 * i),
                label: format!("{:02}h-{:02}h", 4 * i, 4 * (i + 1)),
                start,
                end: start + Duration::hours(4),
            }
        })
        .collect()
}

/// 7 tranches de 24h de la fenêtre glissante, ordonnées du lundi au dimanche
/// selon le jour de début de chaque tranche.
fn generate_weekday_buckets(range: &DateRange) -> Vec<Bucket> {
    let mut buckets: Vec<Bucket> = (0..7)
        .map(|i| {
            let start = range.start + Duration::days(i);
            let end = if i == 6 {
                range.end
            } else {
                start + Duration::days(1)
            };
            Bucket {
                key: start.format("%Y-%m-%d").to_string(),
                label: french_weekday_abbrev(start.weekday().num_days_from_monday()).to_string(),
                start,
                end,
            }
        })
        .collect();
    buckets.sort_by_key(|b| b.start.weekday().num_days_from_monday());
    buckets
}

/// "Sem 1" … "Sem 5" : 7 jours chacune depuis le 1er du mois, la dernière
/// s'étend jusqu'à la fin du mois.
fn generate_week_of_month_buckets(range: &DateRange) -> Result<Vec<Bucket>, AppError> {
    let year = range.start.year();
    let month = range.start.month();
    let month_start = first_of_month(year, month).ok_or_else(|| out_of_calendar("mois"))?;
    let month_end =
        first_of_next_month(year, month).ok_or_else(|| out_of_calendar("mois suivant"))?;

    Ok((0..5)
        .map(|i| {
            let start = month_start + Duration::days(7 * i);
            let end = if i == 4 {
                month_end.max(start)
            } else {
                start + Duration::days(7)
            };
            Bucket {
                key: format!("{:04}-{:02}-S{}", year, month, i + 1),
                label: format!("Sem {}", i + 1),
                start,
                end,
            }
        })
        .collect())
}

/// 12 mois calendaires de l'année de la plage.
fn generate_month_buckets(range: &DateRange) -> Result<Vec<Bucket>, AppError> {
    let year = range.start.year();
    (1..=12)
        .map(|month| -> Result<Bucket, AppError> {
            let start = first_of_month(year, month).ok_or_else(|| out_of_calendar("mois"))?;
            let end =
                first_of_next_month(year, month).ok_or_else(|| out_of_calendar("mois suivant"))?;
            Ok(Bucket {
                key: format!("{:04}-{:02}", year, month),
                label: french_month_abbrev(month).to_string(),
                start,
                end,
            })
        })
        .collect()
}

/// Une tranche par année civile présente dans la plage.
fn generate_year_buckets(range: &DateRange) -> Result<Vec<Bucket>, AppError> {
    (range.start.year()..=range.end.year())
        .map(|year| -> Result<Bucket, AppError> {
            let start = first_of_month(year, 1)
                .ok_or_else(|| out_of_calendar("année"))?
                .max(range.start);
            let end = first_of_month(year + 1, 1).ok_or_else(|| out_of_calendar("année"))?;
            Ok(Bucket {
                key: format!("{:04}", year),
                label: year.to_string(),
                start,
                end,
            })
        })
        .collect()
}

/// Une tranche par jour, bornée par la plage.
fn generate_day_buckets(range: &DateRange) -> Vec<Bucket> {
    let mut result = Vec::new();
    let mut current = range.start.date();
    let last = range.end.date();

    while current <= last {
        let start = midnight(current).max(range.start);
        let end = if current == last {
            range.end
        } else {
            midnight(current + Duration::days(1))
        };
        result.push(Bucket {
            key: current.format("%Y-%m-%d").to_string(),
            label: format!("{:02}/{:02}", current.day(), current.month()),
            start,
            end,
        });
        current += Duration::days(1);
    }

    result
}

/// Index of the bucket holding `t`: `[start, end)`, except that the
/// chronologically last bucket also accepts `t == end`.
pub fn locate_bucket(buckets: &[Bucket], t: NaiveDateTime) -> Option<usize> {
    if let Some(i) = buckets.iter().position(|b| b.start <= t && t < b.end) {
        return Some(i);
    }
    buckets
        .iter()
        .enumerate()
        .max_by_key(|(_, b)| b.end)
        .filter(|(_, b)| b.start <= t && t == b.end)
        .map(|(i, _)| i)
}

fn french_weekday_abbrev(days_from_monday: u32) -> &'static str {
    match days_from_monday {
        0 => "Lun",
        1 => "Mar",
        2 => "Mer",
        3 => "Jeu",
        4 => "Ven",
        5 => "Sam",
        _ => "Dim",
    }
}

fn french_month_abbrev(month: u32) -> &'static str {
    match month {
        1 => "Janv",
        2 => "Févr",
        3 => "Mars",
        4 => "Avr",
        5 => "Mai",
        6 => "Juin",
        7 => "Juil",
        8 => "Août",
        9 => "Sept",
        10 => "Oct",
        11 => "Nov",
        12 => "Déc",
        _ => "Inconnu",
    }
}
