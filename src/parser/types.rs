use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One CSV row as read from the records-service export, before validation.
#[derive(Debug, Clone, Default)]
pub struct InfractionRaw {
    pub id: Option<String>,
    pub montant: Option<String>,
    pub date_infraction: Option<String>,
    pub statut_paiement: Option<String>,
    pub derniere_modification: Option<String>,
    pub agent: Option<String>,
    pub lieu: Option<String>,
    pub motif: Option<String>,
}

/// An infraction record as supplied by the records service.
///
/// `amount` is in the smallest currency unit. It is signed so that a
/// negative amount coming from the collaborator can be rejected by the
/// classifier instead of wrapping silently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfractionRecord {
    pub id: String,
    pub amount: i64,
    pub occurred_at: NaiveDateTime,
    pub payment_status: String,
    pub updated_at: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lieu: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motif: Option<String>,
}

impl InfractionRecord {
    pub fn new(
        id: impl Into<String>,
        amount: i64,
        occurred_at: NaiveDateTime,
        payment_status: impl Into<String>,
        updated_at: NaiveDateTime,
    ) -> Self {
        InfractionRecord {
            id: id.into(),
            amount,
            occurred_at,
            payment_status: payment_status.into(),
            updated_at,
            agent: None,
            lieu: None,
            motif: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseWarning {
    pub line: usize,
    pub message: String,
}
