use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// User configuration for the engine and the command-line runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub locale: String,
    pub currency: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Where the rule/instance snapshot lives. Defaults to `<home>/data`.
    pub data_dir: Option<PathBuf>,

    #[serde(default = "Config::default_backup_retention")]
    pub backup_retention: usize,

    /// Ceiling, in years, on how far open-ended rules are materialized.
    #[serde(default = "Config::default_projection_years")]
    pub projection_years: u32,

    #[serde(default = "Config::default_log_filter")]
    pub log_filter: String,

    #[serde(default = "Config::default_color_output")]
    pub color_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "pt-BR".into(),
            currency: "BRL".into(),
            data_dir: None,
            backup_retention: Self::default_backup_retention(),
            projection_years: Self::default_projection_years(),
            log_filter: Self::default_log_filter(),
            color_output: Self::default_color_output(),
        }
    }
}

impl Config {
    pub fn default_backup_retention() -> usize {
        5
    }

    pub fn default_projection_years() -> u32 {
        50
    }

    pub fn default_log_filter() -> String {
        "recurra=info".into()
    }

    pub fn default_color_output() -> bool {
        true
    }

    pub fn resolve_data_dir(&self, home: &Path) -> PathBuf {
        match &self.data_dir {
            Some(path) => path.clone(),
            None => home.join("data"),
        }
    }

    /// Rejects values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backup_retention == 0 {
            return Err(ConfigError::Invalid(
                "backup_retention must be at least 1".into(),
            ));
        }
        if self.projection_years == 0 {
            return Err(ConfigError::Invalid(
                "projection_years must be at least 1".into(),
            ));
        }
        if self.currency.trim().is_empty() {
            return Err(ConfigError::Invalid("currency must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_optional_fields_take_defaults() {
        let cfg: Config = serde_json::from_str(r#"{"locale":"en-US","currency":"USD"}"#).unwrap();
        assert_eq!(cfg.backup_retention, 5);
        assert_eq!(cfg.projection_years, 50);
        assert_eq!(cfg.log_filter, "recurra=info");
        assert!(cfg.color_output);
        assert!(cfg.data_dir.is_none());
    }

    #[test]
    fn data_dir_override_wins_over_home() {
        let mut cfg = Config::default();
        let home = Path::new("/home/ana/.recurra");
        assert_eq!(cfg.resolve_data_dir(home), PathBuf::from("/home/ana/.recurra/data"));
        cfg.data_dir = Some(PathBuf::from("/srv/recurra"));
        assert_eq!(cfg.resolve_data_dir(home), PathBuf::from("/srv/recurra"));
    }

    #[test]
    fn zero_ceiling_is_rejected() {
        let cfg = Config {
            projection_years: 0,
            ..Config::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
        assert!(Config::default().validate().is_ok());
    }
}
