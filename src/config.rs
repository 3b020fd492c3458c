use serde::Deserialize;
use thiserror::Error;

use crate::form::ValidationMode;
use crate::i18n::I18nManager;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// `"system"` or a locale tag such as `"fr"`.
    pub locale: String,
    pub validation: ValidationConfig,
    pub dashboard: DashboardConfig,
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub password_min_length: usize,
    pub mode: ValidationMode,
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub recent_transactions_limit: usize,
    pub budget_alert_threshold_percent: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            locale: "system".to_string(),
            validation: ValidationConfig::default(),
            dashboard: DashboardConfig::default(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            password_min_length: 6,
            mode: ValidationMode::All,
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            recent_transactions_limit: 5,
            budget_alert_threshold_percent: 80,
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.validation.password_min_length == 0 {
            return Err(ConfigError::Invalid(
                "validation.password_min_length must be at least 1".to_string(),
            ));
        }
        if self.dashboard.budget_alert_threshold_percent == 0 {
            return Err(ConfigError::Invalid(
                "dashboard.budget_alert_threshold_percent must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn i18n(&self) -> I18nManager {
        I18nManager::with_locale(self.locale.as_str())
    }
}
