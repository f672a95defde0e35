//! Configuration management for the Aklatan server

use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

/// Circulation engine settings
#[derive(Debug, Deserialize, Clone)]
pub struct CirculationConfig {
    /// Library wall-clock offset east of UTC, in hours (Asia/Manila = 8)
    pub utc_offset_hours: i32,
    /// Interval of the periodic overdue-refresh sweep, in seconds
    pub refresh_interval_secs: u64,
}

/// Overdue fine tier schedule (currency units, 2 decimal places)
#[derive(Debug, Deserialize, Clone)]
pub struct FinesConfig {
    /// Charged once per full overdue day
    pub daily_rate: Decimal,
    /// Charged when the partial day has at least one full hour
    pub first_hour_rate: Decimal,
    /// Charged for every partial-day hour after the first
    pub succeeding_hour_rate: Decimal,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotificationsConfig {
    /// Librarian accounts that receive overdue notices
    pub recipients: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub circulation: CirculationConfig,
    #[serde(default)]
    pub fines: FinesConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default"))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (with prefix AKLATAN_)
            .add_source(
                Environment::with_prefix("AKLATAN")
                    .separator("_")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for CirculationConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: 8,
            refresh_interval_secs: 60,
        }
    }
}

impl Default for FinesConfig {
    fn default() -> Self {
        Self {
            daily_rate: Decimal::new(2500, 2),
            first_hour_rate: Decimal::new(1000, 2),
            succeeding_hour_rate: Decimal::new(500, 2),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self { recipients: Vec::new() }
    }
}
