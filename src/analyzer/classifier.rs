use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

use crate::config::{normalize_code, AppConfig};
use crate::error::AppError;
use crate::parser::types::InfractionRecord;

/// Cycle de vie d'une amende, dans l'ordre d'affichage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum FineStatus {
    Pending,
    Paid,
    Overdue,
    Disputed,
}

impl FineStatus {
    pub fn libelle(&self) -> &'static str {
        match self {
            FineStatus::Pending => "En attente",
            FineStatus::Paid => "Payée",
            FineStatus::Overdue => "En retard",
            FineStatus::Disputed => "Contestée",
        }
    }

    /// Accepts the English variant name or the French label, case-insensitively.
    pub fn parse(s: &str) -> Option<FineStatus> {
        match normalize_code(s).as_str() {
            "pending" | "en attente" | "en_attente" => Some(FineStatus::Pending),
            "paid" | "payée" | "payee" => Some(FineStatus::Paid),
            "overdue" | "en retard" | "en_retard" => Some(FineStatus::Overdue),
            "disputed" | "contestée" | "contestee" => Some(FineStatus::Disputed),
            _ => None,
        }
    }
}

/// Raw status families as configured in `AppConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFamily {
    Settled,
    Contested,
    Cancelled,
    Open,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedFine {
    pub status: FineStatus,
    pub penalty: i64,
    pub due_date: NaiveDateTime,
    pub paid_date: Option<NaiveDateTime>,
    pub total_due: i64,
}

/// Maps a raw status code to its family. Unknown codes yield None.
pub fn status_family(code: &str, config: &AppConfig) -> Option<StatusFamily> {
    let code = normalize_code(code);
    let contains = |list: &[String]| list.iter().any(|c| normalize_code(c) == code);

    if contains(&config.statuts_regles) {
        Some(StatusFamily::Settled)
    } else if contains(&config.statuts_contestes) {
        Some(StatusFamily::Contested)
    } else if contains(&config.statuts_annules) {
        Some(StatusFamily::Cancelled)
    } else if contains(&config.statuts_en_cours) {
        Some(StatusFamily::Open)
    } else {
        None
    }
}

/// Plafond d'un montant, en plus petite unité monétaire.
pub const MONTANT_MAX: i64 = 1_000_000_000_000;

/// Majoration = taux × montant, arrondie à l'unité (demi vers le haut).
/// None en cas de dépassement de capacité.
pub fn compute_penalty(amount: i64, taux_pct: u32) -> Option<i64> {
    amount
        .checked_mul(taux_pct as i64)?
        .checked_add(50)
        .map(|v| v / 100)
}

/// Checks the record invariants without classifying it.
pub fn validate_record(record: &InfractionRecord, config: &AppConfig) -> Result<(), AppError> {
    if record.amount < 0 {
        return Err(AppError::invalid_record(
            &record.id,
            format!("montant négatif ({})", record.amount),
        ));
    }
    if record.amount > MONTANT_MAX {
        return Err(AppError::invalid_record(
            &record.id,
            format!("montant hors limites ({})", record.amount),
        ));
    }
    if record.updated_at < record.occurred_at {
        return Err(AppError::invalid_record(
            &record.id,
            "dernière modification antérieure à l'infraction",
        ));
    }
    if status_family(&record.payment_status, config).is_none() {
        return Err(AppError::invalid_record(
            &record.id,
            format!("statut de paiement inconnu {:?}", record.payment_status),
        ));
    }
    Ok(())
}

/// Classifie une amende à l'instant `now`.
/// Ordre de priorité : Réglée > Contestée > Annulée (exclue) > En retard > En attente.
/// Retourne `Ok(None)` pour une amende annulée, exclue de tout reporting.
pub fn classify(
    record: &InfractionRecord,
    now: NaiveDateTime,
    config: &AppConfig,
) -> Result<Option<ClassifiedFine>, AppError> {
    validate_record(record, config)?;

    let grace = Duration::days(config.delai_grace_jours as i64);
    let due_date = record.occurred_at + grace;

    let (status, penalty, paid_date) = match status_family(&record.payment_status, config) {
        Some(StatusFamily::Settled) => (FineStatus::Paid, 0, Some(record.updated_at)),
        Some(StatusFamily::Contested) => (FineStatus::Disputed, 0, None),
        Some(StatusFamily::Cancelled) => return Ok(None),
        // Strictement plus que le délai de grâce
        _ if now - record.occurred_at > grace => (
            FineStatus::Overdue,
            compute_penalty(record.amount, config.taux_majoration_pct)
                .ok_or_else(|| out_of_bounds(record))?,
            None,
        ),
        _ => (FineStatus::Pending, 0, None),
    };

    let total_due = record
        .amount
        .checked_add(penalty)
        .ok_or_else(|| out_of_bounds(record))?;

    Ok(Some(ClassifiedFine {
        status,
        penalty,
        due_date,
        paid_date,
        total_due,
    }))
}

fn out_of_bounds(record: &InfractionRecord) -> AppError {
    AppError::invalid_record(&record.id, "montant hors limites")
}
