use serde::Serialize;

use crate::analyzer::classifier::validate_record;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::parser::types::{InfractionRecord, ParseWarning};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordRejection {
    pub id: String,
    pub motif: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub records: Vec<InfractionRecord>,
    pub rejets: Vec<RecordRejection>,
    pub warnings: Vec<ParseWarning>,
    pub total_rows: usize,
    pub skipped_rows: usize,
    pub missing_optional_columns: Vec<String>,
    pub unique_statuts: Vec<String>,
    pub parse_duration_ms: u64,
}

/// Splits records into those the classifier accepts and rejections.
/// Aggregation never swallows invalid records, so callers filter here first.
pub fn validate_records(
    records: &[InfractionRecord],
    config: &AppConfig,
) -> (Vec<InfractionRecord>, Vec<RecordRejection>) {
    let mut valides = Vec::with_capacity(records.len());
    let mut rejets = Vec::new();
    for record in records {
        match validate_record(record, config) {
            Ok(()) => valides.push(record.clone()),
            Err(AppError::InvalidRecord { id, motif }) => rejets.push(RecordRejection { id, motif }),
            Err(e) => rejets.push(RecordRejection {
                id: record.id.clone(),
                motif: e.to_string(),
            }),
        }
    }
    if !rejets.is_empty() {
        log::warn!("{} enregistrement(s) rejeté(s)", rejets.len());
    }
    (valides, rejets)
}

/// Parses a records-service CSV export and keeps only valid records.
pub fn import_csv(path: &str, config: &AppConfig) -> Result<ImportResult, AppError> {
    let output = crate::parser::parse_csv(path)?;
    let (records, rejets) = validate_records(&output.records, config);

    log::info!(
        "Import {}: {} valides, {} rejetés, {} lignes ignorées en {} ms",
        path,
        records.len(),
        rejets.len(),
        output.skipped_rows,
        output.parse_duration_ms
    );

    Ok(ImportResult {
        records,
        rejets,
        warnings: output.warnings,
        total_rows: output.total_rows_processed,
        skipped_rows: output.skipped_rows,
        missing_optional_columns: output.missing_optional_columns,
        unique_statuts: output.unique_statuts,
        parse_duration_ms: output.parse_duration_ms,
    })
}
