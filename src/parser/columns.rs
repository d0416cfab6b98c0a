use std::collections::HashMap;

use crate::error::AppError;

pub const COL_ID: &str = "ID";
pub const COL_MONTANT: &str = "Montant";
pub const COL_DATE_INFRACTION: &str = "Date infraction";
pub const COL_STATUT: &str = "Statut paiement";
pub const COL_DERNIERE_MODIF: &str = "Dernière modification";
pub const COL_AGENT: &str = "Agent";
pub const COL_LIEU: &str = "Lieu";
pub const COL_MOTIF: &str = "Motif";

/// Colonnes obligatoires : l'import échoue si l'une d'elles est absente.
const REQUIRED: &[&str] = &[
    COL_ID,
    COL_MONTANT,
    COL_DATE_INFRACTION,
    COL_STATUT,
    COL_DERNIERE_MODIF,
];

/// Colonnes optionnelles : absentes = None, signalées dans le résultat.
const OPTIONAL: &[&str] = &[COL_AGENT, COL_LIEU, COL_MOTIF];

/// Maps column names to their index in a CSV record.
pub struct ColumnMap {
    indices: HashMap<String, usize>,
    headers: Vec<String>,
}

impl ColumnMap {
    /// Header fields are trimmed, and a leading UTF-8 BOM is dropped.
    pub fn from_headers(headers: &csv::StringRecord) -> Self {
        let mut indices = HashMap::new();
        let mut header_list = Vec::new();
        for (i, field) in headers.iter().enumerate() {
            let name = field.trim_start_matches('\u{FEFF}').trim().to_string();
            indices.insert(name.clone(), i);
            header_list.push(name);
        }
        ColumnMap {
            indices,
            headers: header_list,
        }
    }

    pub fn get<'a>(&self, record: &'a csv::StringRecord, col: &str) -> Option<&'a str> {
        self.indices.get(col).and_then(|&i| record.get(i))
    }

    pub fn has(&self, col: &str) -> bool {
        self.indices.contains_key(col)
    }

    pub fn all_headers(&self) -> &[String] {
        &self.headers
    }
}

#[derive(Debug)]
pub struct ColumnValidation {
    pub present: Vec<String>,
    pub missing_optional: Vec<String>,
}

/// Returns `AppError::MissingColumns` if any required column is absent.
pub fn validate_columns(col_map: &ColumnMap) -> Result<ColumnValidation, AppError> {
    let missing_required: Vec<String> = REQUIRED
        .iter()
        .filter(|&&c| !col_map.has(c))
        .map(|c| c.to_string())
        .collect();

    if !missing_required.is_empty() {
        return Err(AppError::MissingColumns(missing_required));
    }

    let missing_optional = OPTIONAL
        .iter()
        .filter(|&&c| !col_map.has(c))
        .map(|c| c.to_string())
        .collect();

    Ok(ColumnValidation {
        present: col_map.all_headers().to_vec(),
        missing_optional,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_headers(cols: &[&str]) -> csv::StringRecord {
        csv::StringRecord::from(cols.to_vec())
    }

    const ALL_REQUIRED: &[&str] = &[
        "ID",
        "Montant",
        "Date infraction",
        "Statut paiement",
        "Dernière modification",
    ];

    #[test]
    fn test_column_map_get() {
        let cm = ColumnMap::from_headers(&make_headers(&["ID", "Montant"]));
        let record = csv::StringRecord::from(vec!["PV-1", "45000"]);
        assert_eq!(cm.get(&record, "ID"), Some("PV-1"));
        assert_eq!(cm.get(&record, "Montant"), Some("45000"));
        assert_eq!(cm.get(&record, "Lieu"), None);
    }

    #[test]
    fn test_column_map_trim_and_bom() {
        let cm = ColumnMap::from_headers(&make_headers(&["\u{FEFF}ID", " Montant "]));
        assert!(cm.has("ID"));
        assert!(cm.has("Montant"));
    }

    #[test]
    fn test_validate_columns_ok_with_missing_optional() {
        let cm = ColumnMap::from_headers(&make_headers(ALL_REQUIRED));
        let val = validate_columns(&cm).unwrap();
        assert_eq!(val.present.len(), 5);
        assert_eq!(val.missing_optional, vec!["Agent", "Lieu", "Motif"]);
    }

    #[test]
    fn test_validate_columns_missing_required() {
        let cm = ColumnMap::from_headers(&make_headers(&["ID", "Montant"]));
        match validate_columns(&cm).unwrap_err() {
            AppError::MissingColumns(cols) => {
                assert!(cols.contains(&"Date infraction".to_string()));
                assert!(cols.contains(&"Statut paiement".to_string()));
                assert!(!cols.contains(&"ID".to_string()));
            }
            e => panic!("Expected MissingColumns, got {:?}", e),
        }
    }
}
