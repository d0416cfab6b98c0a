use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub delai_grace_jours: u32,
    pub taux_majoration_pct: u32,
    /// Plancher de la période "depuis le lancement".
    pub date_lancement: NaiveDate,
    pub statuts_regles: Vec<String>,
    pub statuts_contestes: Vec<String>,
    pub statuts_annules: Vec<String>,
    pub statuts_en_cours: Vec<String>,
    pub seuil_retard_vert: u32,
    pub seuil_retard_jaune: u32,
    pub seuil_retard_orange: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            delai_grace_jours: 30,
            taux_majoration_pct: 10,
            date_lancement: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default(),
            statuts_regles: vec![
                "paid".into(),
                "archived".into(),
                "payee".into(),
                "archivee".into(),
            ],
            statuts_contestes: vec!["disputed".into(), "contestee".into()],
            statuts_annules: vec!["cancelled".into(), "annulee".into()],
            statuts_en_cours: vec![
                "recorded".into(),
                "validated".into(),
                "enregistree".into(),
                "validee".into(),
            ],
            seuil_retard_vert: 10,
            seuil_retard_jaune: 25,
            seuil_retard_orange: 50,
        }
    }
}

impl AppConfig {
    /// Rejects configurations the classifier cannot apply unambiguously.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.delai_grace_jours == 0 {
            return Err(AppError::InvalidConfig(
                "delaiGraceJours doit être strictement positif".to_string(),
            ));
        }

        if self.taux_majoration_pct > 100 {
            return Err(AppError::InvalidConfig(
                "tauxMajorationPct doit être compris entre 0 et 100".to_string(),
            ));
        }

        let listes: [(&str, &Vec<String>); 4] = [
            ("statutsRegles", &self.statuts_regles),
            ("statutsContestes", &self.statuts_contestes),
            ("statutsAnnules", &self.statuts_annules),
            ("statutsEnCours", &self.statuts_en_cours),
        ];
        for (i, (nom_a, liste_a)) in listes.iter().enumerate() {
            for (nom_b, liste_b) in listes.iter().skip(i + 1) {
                if let Some(code) = liste_a
                    .iter()
                    .find(|a| liste_b.iter().any(|b| normalize_code(a) == normalize_code(b)))
                {
                    return Err(AppError::InvalidConfig(format!(
                        "statut {:?} présent dans {} et {}",
                        code, nom_a, nom_b
                    )));
                }
            }
        }

        if !(self.seuil_retard_vert <= self.seuil_retard_jaune
            && self.seuil_retard_jaune <= self.seuil_retard_orange)
        {
            return Err(AppError::InvalidConfig(
                "seuils de retard non croissants".to_string(),
            ));
        }

        Ok(())
    }

    /// Applies `key=value` overrides. Unparseable values keep the current setting.
    pub fn apply_overrides<'a>(&mut self, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) {
        for (key, value) in pairs {
            let value = value.trim();
            match key.trim() {
                "delai_grace_jours" => {
                    self.delai_grace_jours = value.parse().unwrap_or(self.delai_grace_jours)
                }
                "taux_majoration_pct" => {
                    self.taux_majoration_pct = value.parse().unwrap_or(self.taux_majoration_pct)
                }
                "date_lancement" => {
                    if let Ok(d) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
                        self.date_lancement = d;
                    }
                }
                "seuil_retard_vert" => {
                    self.seuil_retard_vert = value.parse().unwrap_or(self.seuil_retard_vert)
                }
                "seuil_retard_jaune" => {
                    self.seuil_retard_jaune = value.parse().unwrap_or(self.seuil_retard_jaune)
                }
                "seuil_retard_orange" => {
                    self.seuil_retard_orange = value.parse().unwrap_or(self.seuil_retard_orange)
                }
                "statuts_regles" => set_list(&mut self.statuts_regles, value),
                "statuts_contestes" => set_list(&mut self.statuts_contestes, value),
                "statuts_annules" => set_list(&mut self.statuts_annules, value),
                "statuts_en_cours" => set_list(&mut self.statuts_en_cours, value),
                other => log::warn!("Clé de configuration inconnue ignorée: {}", other),
            }
        }
    }
}

/// Accepts either a JSON array or a comma-separated list.
fn set_list(target: &mut Vec<String>, value: &str) {
    if let Ok(v) = serde_json::from_str::<Vec<String>>(value) {
        *target = v;
        return;
    }
    let items: Vec<String> = value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if !items.is_empty() {
        *target = items;
    }
}

/// Status codes are compared trimmed and case-insensitively.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_lowercase()
}

/// Loads the configuration from a JSON file; absent keys take their default value.
pub fn load_config(path: &Path) -> Result<AppConfig, AppError> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.delai_grace_jours, 30);
        assert_eq!(config.taux_majoration_pct, 10);
        assert_eq!(config.date_lancement, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"delaiGraceJours": 45}"#).unwrap();
        assert_eq!(config.delai_grace_jours, 45);
        assert_eq!(config.taux_majoration_pct, 10);
        assert!(config.statuts_regles.contains(&"paid".to_string()));
    }

    #[test]
    fn test_overrides() {
        let mut config = AppConfig::default();
        config.apply_overrides(vec![
            ("taux_majoration_pct", "20"),
            ("delai_grace_jours", "abc"),
            ("date_lancement", "2018-06-01"),
            ("statuts_annules", "cancelled, void"),
        ]);
        assert_eq!(config.taux_majoration_pct, 20);
        assert_eq!(config.delai_grace_jours, 30); // invalide → inchangé
        assert_eq!(config.date_lancement, NaiveDate::from_ymd_opt(2018, 6, 1).unwrap());
        assert_eq!(config.statuts_annules, vec!["cancelled", "void"]);
    }

    #[test]
    fn test_override_json_list() {
        let mut config = AppConfig::default();
        config.apply_overrides(vec![("statuts_contestes", r#"["appeal"]"#)]);
        assert_eq!(config.statuts_contestes, vec!["appeal"]);
    }

    #[test]
    fn test_overlapping_statuses_rejected() {
        let mut config = AppConfig::default();
        config.statuts_annules.push("PAID".into());
        match config.validate() {
            Err(AppError::InvalidConfig(msg)) => assert!(msg.contains("statutsRegles")),
            other => panic!("Expected InvalidConfig, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_grace_rejected() {
        let config = AppConfig {
            delai_grace_jours: 0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rate_above_hundred_rejected() {
        let config = AppConfig {
            taux_majoration_pct: 150,
            ..AppConfig::default()
        };
        assert!(matches!(config.validate(), Err(AppError::InvalidConfig(_))));
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("  Paid "), "paid");
    }
}
