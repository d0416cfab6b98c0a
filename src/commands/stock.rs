use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::analyzer::classifier::FineStatus;
use crate::analyzer::stock::{build_encours, fine_detail, list_fines, EncoursOverview, FineView};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::parser::types::InfractionRecord;

use super::import::validate_records;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmendeFilters {
    pub statut: Option<String>,
    pub agent: Option<String>,
    pub min_montant: Option<i64>,
}

/// Vue d'ensemble des amendes impayées ; les enregistrements invalides sont ignorés.
pub fn get_encours(
    records: &[InfractionRecord],
    now: NaiveDateTime,
    config: &AppConfig,
) -> Result<EncoursOverview, AppError> {
    let (valides, _) = validate_records(records, config);
    build_encours(&valides, now, config)
}

pub fn get_liste_amendes(
    records: &[InfractionRecord],
    filters: &AmendeFilters,
    now: NaiveDateTime,
    config: &AppConfig,
) -> Result<Vec<FineView>, AppError> {
    let statut = match filters.statut.as_deref() {
        Some(s) => Some(
            FineStatus::parse(s)
                .ok_or_else(|| AppError::InvalidFilter(format!("statut inconnu {:?}", s)))?,
        ),
        None => None,
    };
    let (valides, _) = validate_records(records, config);

    let fines = list_fines(&valides, now, config, statut)?
        .into_iter()
        .filter(|f| match filters.agent.as_deref() {
            Some(agent) => f.agent.as_deref() == Some(agent),
            None => true,
        })
        .filter(|f| filters.min_montant.map_or(true, |min| f.amount >= min))
        .collect::<Vec<_>>();

    log::debug!("Liste amendes: {} résultat(s)", fines.len());
    Ok(fines)
}

/// Détail d'une amende ; un enregistrement invalide remonte son erreur.
pub fn get_amende(
    records: &[InfractionRecord],
    id: &str,
    now: NaiveDateTime,
    config: &AppConfig,
) -> Result<FineView, AppError> {
    fine_detail(records, id, now, config)
}
