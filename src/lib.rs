pub mod auth;
pub mod config;
pub mod dashboard;
pub mod form;
pub mod i18n;
pub mod prelude;
pub mod session;

pub use config::{AppConfig, ConfigError};
pub use i18n::{I18nManager, Locale};
