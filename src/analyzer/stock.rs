use chrono::NaiveDateTime;
use serde::Serialize;

use super::classifier::{classify, ClassifiedFine, FineStatus};
use super::stats::{pct, percentile};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::parser::types::InfractionRecord;

/// Nombre de jours avant échéance sous lequel une amende est signalée.
const ECHEANCE_PROCHE_JOURS: i64 = 7;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EcheanceRangeCount {
    pub label: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncoursOverview {
    pub total_impayees: usize,
    pub total_en_retard: usize,
    pub total_contestees: usize,
    /// Majorations comprises.
    pub montant_du: i64,
    pub montant_median: f64,
    pub par_echeance: Vec<EcheanceRangeCount>,
    pub pct_en_retard: f64,
    pub couleur_seuil: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FineView {
    pub id: String,
    pub amount: i64,
    pub occurred_at: NaiveDateTime,
    pub payment_status: String,
    pub status: FineStatus,
    pub status_label: String,
    pub penalty: i64,
    pub total_due: i64,
    pub due_date: NaiveDateTime,
    pub paid_date: Option<NaiveDateTime>,
    /// Négatif une fois l'échéance dépassée.
    pub jours_avant_echeance: i64,
    pub echeance_proche: bool,
    pub agent: Option<String>,
    pub lieu: Option<String>,
    pub motif: Option<String>,
}

impl FineView {
    fn new(record: &InfractionRecord, fine: ClassifiedFine, now: NaiveDateTime) -> Self {
        let jours_avant_echeance = (fine.due_date - now).num_days();
        let echeance_proche = fine.status == FineStatus::Pending
            && (0..=ECHEANCE_PROCHE_JOURS).contains(&jours_avant_echeance);
        FineView {
            id: record.id.clone(),
            amount: record.amount,
            occurred_at: record.occurred_at,
            payment_status: record.payment_status.clone(),
            status: fine.status,
            status_label: fine.status.libelle().to_string(),
            penalty: fine.penalty,
            total_due: fine.total_due,
            due_date: fine.due_date,
            paid_date: fine.paid_date,
            jours_avant_echeance,
            echeance_proche,
            agent: record.agent.clone(),
            lieu: record.lieu.clone(),
            motif: record.motif.clone(),
        }
    }
}

/// Liste des amendes classifiées, triées par échéance puis identifiant.
/// Les amendes annulées n'apparaissent pas.
pub fn list_fines(
    records: &[InfractionRecord],
    now: NaiveDateTime,
    config: &AppConfig,
    filtre: Option<FineStatus>,
) -> Result<Vec<FineView>, AppError> {
    let mut views = Vec::new();
    for record in records {
        let Some(fine) = classify(record, now, config)? else {
            continue;
        };
        if filtre.is_some_and(|s| s != fine.status) {
            continue;
        }
        views.push(FineView::new(record, fine, now));
    }
    views.sort_by(|a, b| a.due_date.cmp(&b.due_date).then_with(|| a.id.cmp(&b.id)));
    Ok(views)
}

/// Détail d'une amende ; une amende annulée est traitée comme introuvable.
pub fn fine_detail(
    records: &[InfractionRecord],
    id: &str,
    now: NaiveDateTime,
    config: &AppConfig,
) -> Result<FineView, AppError> {
    let record = records
        .iter()
        .find(|r| r.id == id)
        .ok_or_else(|| AppError::FineNotFound(id.to_string()))?;
    let fine = classify(record, now, config)?.ok_or_else(|| AppError::FineNotFound(id.to_string()))?;
    Ok(FineView::new(record, fine, now))
}

/// Distribue les amendes impayées selon leur position par rapport à l'échéance.
/// `jours_retard` est négatif ou nul tant que l'échéance n'est pas dépassée.
pub fn compute_echeance_distribution(jours_retard: &[i64]) -> Vec<EcheanceRangeCount> {
    let total = jours_retard.len() as i64;

    let mut dans_delais: i64 = 0;
    let mut lt30: i64 = 0;
    let mut from30to90: i64 = 0;
    let mut gt90: i64 = 0;

    for &j in jours_retard {
        if j <= 0 {
            dans_delais += 1;
        } else if j < 30 {
            lt30 += 1;
        } else if j < 90 {
            from30to90 += 1;
        } else {
            gt90 += 1;
        }
    }

    [
        ("Dans les délais", dans_delais),
        ("< 30j de retard", lt30),
        ("30-90j de retard", from30to90),
        ("> 90j de retard", gt90),
    ]
    .into_iter()
    .map(|(label, count)| EcheanceRangeCount {
        label: label.to_string(),
        count: count as usize,
        percentage: pct(count, total),
    })
    .collect()
}

/// Retourne la couleur RAG selon la part d'amendes en retard (en %).
/// Vert  : part < seuil_retard_vert
/// Jaune : seuil_retard_vert  <= part < seuil_retard_jaune
/// Orange: seuil_retard_jaune <= part < seuil_retard_orange
/// Rouge : part >= seuil_retard_orange
pub fn compute_couleur_seuil(pct_en_retard: f64, config: &AppConfig) -> String {
    if pct_en_retard < config.seuil_retard_vert as f64 {
        "vert".to_string()
    } else if pct_en_retard < config.seuil_retard_jaune as f64 {
        "jaune".to_string()
    } else if pct_en_retard < config.seuil_retard_orange as f64 {
        "orange".to_string()
    } else {
        "rouge".to_string()
    }
}

/// Vue d'ensemble des amendes non réglées (en attente, en retard, contestées).
pub fn build_encours(
    records: &[InfractionRecord],
    now: NaiveDateTime,
    config: &AppConfig,
) -> Result<EncoursOverview, AppError> {
    let impayees: Vec<FineView> = list_fines(records, now, config, None)?
        .into_iter()
        .filter(|f| f.status != FineStatus::Paid)
        .collect();

    let total = impayees.len();
    let total_en_retard = impayees
        .iter()
        .filter(|f| f.status == FineStatus::Overdue)
        .count();
    let total_contestees = impayees
        .iter()
        .filter(|f| f.status == FineStatus::Disputed)
        .count();

    let montant_du: i64 = impayees.iter().map(|f| f.total_due).sum();
    let montants: Vec<f64> = impayees.iter().map(|f| f.amount as f64).collect();
    let jours_retard: Vec<i64> = impayees.iter().map(|f| -f.jours_avant_echeance).collect();

    let pct_en_retard = pct(total_en_retard as i64, total as i64);

    Ok(EncoursOverview {
        total_impayees: total,
        total_en_retard,
        total_contestees,
        montant_du,
        montant_median: percentile(&montants, 50.0),
        par_echeance: compute_echeance_distribution(&jours_retard),
        pct_en_retard,
        couleur_seuil: compute_couleur_seuil(pct_en_retard, config),
    })
}
