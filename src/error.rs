use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erreur d'entrée/sortie: {0}")]
    Io(#[from] std::io::Error),

    #[error("Erreur CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Erreur de sérialisation: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Enregistrement invalide {id}: {motif}")]
    InvalidRecord { id: String, motif: String },

    #[error("Plage invalide: début {debut} postérieur à la fin {fin}")]
    InvalidRange { debut: String, fin: String },

    #[error("Date invalide: {0}")]
    InvalidDate(String),

    #[error("Période inconnue: {0}")]
    UnknownPeriod(String),

    #[error("Configuration invalide: {0}")]
    InvalidConfig(String),

    #[error("Filtre invalide: {0}")]
    InvalidFilter(String),

    #[error("Amende introuvable: {0}")]
    FineNotFound(String),

    #[error("Colonnes obligatoires manquantes: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Fichier vide ou sans données")]
    EmptyFile,
}

impl AppError {
    pub(crate) fn invalid_record(id: &str, motif: impl Into<String>) -> Self {
        AppError::InvalidRecord {
            id: id.to_string(),
            motif: motif.into(),
        }
    }
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
