use std::path::Path;

use crate::config::{load_config, AppConfig};
use crate::error::AppError;

/// Builds the effective configuration: JSON file (or defaults), then `key=value` overrides.
pub fn get_config(path: Option<&Path>, overrides: &[String]) -> Result<AppConfig, AppError> {
    let mut config = match path {
        Some(p) => load_config(p)?,
        None => AppConfig::default(),
    };

    let mut pairs = Vec::with_capacity(overrides.len());
    for item in overrides {
        let (key, value) = item.split_once('=').ok_or_else(|| {
            AppError::InvalidConfig(format!("surcharge sans '=': {:?}", item))
        })?;
        pairs.push((key, value));
    }
    config.apply_overrides(pairs);
    config.validate()?;

    log::debug!("Configuration effective: {:?}", config);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_with_overrides() {
        let config = get_config(None, &["taux_majoration_pct=15".to_string()]).unwrap();
        assert_eq!(config.taux_majoration_pct, 15);
        assert_eq!(config.delai_grace_jours, 30);
    }

    #[test]
    fn test_override_without_equals() {
        let res = get_config(None, &["taux_majoration_pct".to_string()]);
        assert!(matches!(res, Err(AppError::InvalidConfig(_))));
    }

    #[test]
    fn test_override_breaking_validation() {
        let res = get_config(None, &["statuts_annules=paid".to_string()]);
        assert!(matches!(res, Err(AppError::InvalidConfig(_))));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join("amendes_dashboard_config_test.json");
        std::fs::write(&path, r#"{"delaiGraceJours": 60, "dateLancement": "2018-01-01"}"#)
            .unwrap();
        let config = get_config(Some(&path), &[]).unwrap();
        assert_eq!(config.delai_grace_jours, 60);
        assert_eq!(config.date_lancement.to_string(), "2018-01-01");
        let _ = std::fs::remove_file(&path);
    }
}
