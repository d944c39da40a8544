//! Service configuration, read from the environment (and `.env`, if present).

use std::{collections::HashMap, env};

use thiserror::Error;

use crate::sweeper::SweeperConfig;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:5000";

#[derive(Debug, Clone)]
pub struct Config {
    /// sqlx SQLite URL, e.g. `sqlite:chat.db`. The file is created if missing.
    pub database_url: String,
    pub bind_address: String,
    pub sweeper: SweeperConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("{name} must be a positive integer, got '{value}'")]
    InvalidSeconds { name: &'static str, value: String },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_vars(&env::vars().collect())
    }

    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_url = vars
            .get("DATABASE_URL")
            .ok_or(ConfigError::MissingEnvVar("DATABASE_URL"))?
            .clone();

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_owned());

        let defaults = SweeperConfig::default();
        let sweeper = SweeperConfig {
            interval_seconds: seconds(vars, "SWEEP_INTERVAL_SECONDS", defaults.interval_seconds)?,
            inactivity_seconds: seconds(
                vars,
                "INACTIVITY_THRESHOLD_SECONDS",
                defaults.inactivity_seconds,
            )?,
        };

        Ok(Config { database_url, bind_address, sweeper })
    }
}

fn seconds(
    vars: &HashMap<String, String>,
    name: &'static str,
    default: u64,
) -> Result<u64, ConfigError> {
    let Some(value) = vars.get(name) else {
        return Ok(default);
    };

    match value.parse::<u64>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        _ => Err(ConfigError::InvalidSeconds { name, value: value.clone() }),
    }
}
