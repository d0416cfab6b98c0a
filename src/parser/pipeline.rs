use std::collections::BTreeSet;
use std::io::Read;
use std::time::Instant;

use crate::error::AppError;
use crate::parser::columns::{
    validate_columns, ColumnMap, COL_AGENT, COL_DATE_INFRACTION, COL_DERNIERE_MODIF, COL_ID,
    COL_LIEU, COL_MONTANT, COL_MOTIF, COL_STATUT,
};
use crate::parser::deserializers::{parse_datetime, parse_spaced_amount};
use crate::parser::types::{InfractionRaw, InfractionRecord, ParseWarning};

/// Output of `parse_csv` carries the parsed records and import metadata.
#[derive(Debug)]
pub struct ParseOutput {
    pub records: Vec<InfractionRecord>,
    pub warnings: Vec<ParseWarning>,
    pub total_rows_processed: usize,
    pub skipped_rows: usize,
    pub detected_columns: Vec<String>,
    pub missing_optional_columns: Vec<String>,
    pub unique_statuts: Vec<String>,
    pub parse_duration_ms: u64,
}

/// Parse a records-service CSV export from `path`.
pub fn parse_csv(path: &str) -> Result<ParseOutput, AppError> {
    let file = std::fs::File::open(path)?;
    parse_csv_reader(std::io::BufReader::new(file))
}

/// Core parsing logic. Accepts any `Read` source, useful for tests.
pub fn parse_csv_reader<R: Read>(reader: R) -> Result<ParseOutput, AppError> {
    let start = Instant::now();

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .double_quote(true)
        .quoting(true)
        .from_reader(reader);

    // Phase 1: validate columns
    let headers = rdr.headers()?.clone();
    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(AppError::EmptyFile);
    }
    let col_map = ColumnMap::from_headers(&headers);
    let col_validation = validate_columns(&col_map)?;

    // Phase 2: parse records
    let mut records: Vec<InfractionRecord> = Vec::new();
    let mut warnings: Vec<ParseWarning> = Vec::new();
    let mut skipped = 0usize;
    let mut row_idx = 0usize;
    let mut unique_statuts: BTreeSet<String> = BTreeSet::new();

    for result in rdr.records() {
        row_idx += 1;

        let parsed = result
            .map_err(|e| e.to_string())
            .and_then(|record| normalize_record(&record_to_raw(&col_map, &record)));

        match parsed {
            Ok(record) => {
                unique_statuts.insert(record.payment_status.clone());
                records.push(record);
            }
            Err(message) => {
                log::debug!("Ligne {} ignorée: {}", row_idx + 1, message);
                warnings.push(ParseWarning {
                    line: row_idx + 1, // +1 for the header row
                    message,
                });
                skipped += 1;
            }
        }
    }

    if row_idx == 0 {
        return Err(AppError::EmptyFile);
    }

    log::info!(
        "Import CSV: {} lignes, {} enregistrements, {} ignorées",
        row_idx,
        records.len(),
        skipped
    );

    Ok(ParseOutput {
        records,
        warnings,
        total_rows_processed: row_idx,
        skipped_rows: skipped,
        detected_columns: col_validation.present,
        missing_optional_columns: col_validation.missing_optional,
        unique_statuts: unique_statuts.into_iter().collect(),
        parse_duration_ms: start.elapsed().as_millis() as u64,
    })
}

fn record_to_raw(col_map: &ColumnMap, record: &csv::StringRecord) -> InfractionRaw {
    let get = |col: &str| col_map.get(record, col).map(str::to_string);
    InfractionRaw {
        id: get(COL_ID),
        montant: get(COL_MONTANT),
        date_infraction: get(COL_DATE_INFRACTION),
        statut_paiement: get(COL_STATUT),
        derniere_modification: get(COL_DERNIERE_MODIF),
        agent: get(COL_AGENT),
        lieu: get(COL_LIEU),
        motif: get(COL_MOTIF),
    }
}

/// Structural validation only; domain rules (negative amounts, unknown
/// statuses, timestamp order) are enforced by the classifier.
fn normalize_record(raw: &InfractionRaw) -> Result<InfractionRecord, String> {
    let id = raw.id.as_deref().unwrap_or("").trim().to_string();
    if id.is_empty() {
        return Err("ID manquant".to_string());
    }

    let montant_str = raw.montant.as_deref().unwrap_or("");
    let amount = parse_spaced_amount(montant_str)
        .ok_or_else(|| format!("Montant invalide: {:?}", montant_str))?;

    let date_str = raw.date_infraction.as_deref().unwrap_or("");
    let occurred_at = parse_datetime(date_str)
        .ok_or_else(|| format!("Date d'infraction invalide: {:?}", date_str))?;

    let payment_status = raw.statut_paiement.as_deref().unwrap_or("").trim().to_string();
    if payment_status.is_empty() {
        return Err("Statut de paiement manquant".to_string());
    }

    // Dernière modification vide → date de l'infraction
    let modif_str = raw.derniere_modification.as_deref().unwrap_or("");
    let updated_at = if modif_str.trim().is_empty() {
        occurred_at
    } else {
        parse_datetime(modif_str)
            .ok_or_else(|| format!("Dernière modification invalide: {:?}", modif_str))?
    };

    let optional = |v: &Option<String>| {
        v.as_deref()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };

    Ok(InfractionRecord {
        id,
        amount,
        occurred_at,
        payment_status,
        updated_at,
        agent: optional(&raw.agent),
        lieu: optional(&raw.lieu),
        motif: optional(&raw.motif),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HDR: &str = "ID;Montant;Date infraction;Statut paiement;Dernière modification";

    fn parse(csv: &str) -> ParseOutput {
        parse_csv_reader(csv.as_bytes()).unwrap()
    }

    fn parse_err(csv: &str) -> AppError {
        parse_csv_reader(csv.as_bytes()).unwrap_err()
    }

    #[test]
    fn test_basic_row() {
        let out = parse(&format!(
            "{HDR}\nPV-001;45 000;05-01-2026 16:24;recorded;06-01-2026 09:00"
        ));
        assert_eq!(out.records.len(), 1);
        let r = &out.records[0];
        assert_eq!(r.id, "PV-001");
        assert_eq!(r.amount, 45_000);
        assert_eq!(r.payment_status, "recorded");
        assert_eq!(
            r.occurred_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
            "2026-01-05T16:24:00"
        );
        assert_eq!(out.missing_optional_columns, vec!["Agent", "Lieu", "Motif"]);
    }

    #[test]
    fn test_bom_utf8() {
        let out = parse(&format!("\u{FEFF}{HDR}\nPV-1;100;01-01-2026 08:00;paid;02-01-2026 08:00"));
        assert_eq!(out.records.len(), 1, "BOM doit être ignoré");
    }

    #[test]
    fn test_empty_updated_at_defaults_to_occurred_at() {
        let out = parse(&format!("{HDR}\nPV-1;100;01-01-2026 08:00;recorded;"));
        let r = &out.records[0];
        assert_eq!(r.updated_at, r.occurred_at);
    }

    #[test]
    fn test_optional_columns() {
        let csv = format!(
            "{HDR};Agent;Lieu;Motif\nPV-1;100;01-01-2026 08:00;recorded;;Dupont;;Excès de vitesse"
        );
        let out = parse(&csv);
        let r = &out.records[0];
        assert_eq!(r.agent.as_deref(), Some("Dupont"));
        assert!(r.lieu.is_none());
        assert_eq!(r.motif.as_deref(), Some("Excès de vitesse"));
        assert!(out.missing_optional_columns.is_empty());
    }

    #[test]
    fn test_malformed_lines_skip() {
        let csv = format!(
            "{HDR}\n\
             PV-1;100;01-01-2026 08:00;recorded;\n\
             PV-2;abc;pas-une-date;recorded;\n\
             PV-3;200;02-01-2026 09:00;;\n\
             PV-4;300;03-01-2026 10:00;paid;04-01-2026 10:00"
        );
        let out = parse(&csv);
        assert_eq!(out.records.len(), 2);
        assert_eq!(out.skipped_rows, 2);
        assert_eq!(out.warnings.len(), 2);
        assert_eq!(out.warnings[0].line, 3);
        assert_eq!(out.unique_statuts, vec!["paid", "recorded"]);
    }

    #[test]
    fn test_negative_amount_is_kept_for_classifier() {
        let out = parse(&format!("{HDR}\nPV-1;-50;01-01-2026 08:00;recorded;"));
        assert_eq!(out.records[0].amount, -50);
    }

    #[test]
    fn test_missing_required_column_error() {
        match parse_err("ID;Montant\nPV-1;100") {
            AppError::MissingColumns(cols) => {
                assert!(cols.contains(&"Statut paiement".to_string()));
            }
            e => panic!("Expected MissingColumns, got {:?}", e),
        }
    }

    #[test]
    fn test_header_only_is_empty_file() {
        match parse_err(HDR) {
            AppError::EmptyFile => {}
            e => panic!("Expected EmptyFile, got {:?}", e),
        }
    }

    #[test]
    fn test_empty_input_error() {
        match parse_err("") {
            AppError::EmptyFile | AppError::MissingColumns(_) | AppError::Csv(_) => {}
            e => panic!("Expected EmptyFile or related error, got {:?}", e),
        }
    }
}
