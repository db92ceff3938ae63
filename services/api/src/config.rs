//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use crate::adapters::openfoodfacts::DEFAULT_BASE_URL;
use carbonscope_core::DEFAULT_MAX_ALTERNATIVES;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
    #[error("Failed to load emission factors from {0}: {1}")]
    FactorsFile(PathBuf, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub cors_origin: String,
    /// Optional JSON file overriding the built-in emission factors.
    pub factors_path: Option<PathBuf>,
    pub max_alternatives: usize,
    /// Supply the current month as the seasonal input when a request has none.
    pub seasonal_adjustment: bool,
    /// Look up uncatalogued barcodes on OpenFoodFacts.
    pub external_lookup: bool,
    pub openfoodfacts_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 8000)),
            log_level: Level::INFO,
            cors_origin: "http://localhost:3000".to_string(),
            factors_path: None,
            max_alternatives: DEFAULT_MAX_ALTERNATIVES,
            seasonal_adjustment: false,
            external_lookup: true,
            openfoodfacts_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        // --- Server Settings ---
        let bind_address = match lookup("BIND_ADDRESS") {
            Some(raw) => raw.parse::<SocketAddr>().map_err(|e| {
                ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
            })?,
            None => defaults.bind_address,
        };

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin = lookup("CORS_ORIGIN").unwrap_or(defaults.cors_origin);

        // --- Estimation Settings ---
        let factors_path = lookup("FACTORS_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        let max_alternatives = match lookup("MAX_ALTERNATIVES") {
            Some(raw) => raw.trim().parse::<usize>().map_err(|e| {
                ConfigError::InvalidValue("MAX_ALTERNATIVES".to_string(), e.to_string())
            })?,
            None => defaults.max_alternatives,
        };

        let seasonal_adjustment = match lookup("SEASONAL_ADJUSTMENT") {
            Some(raw) => parse_flag(&raw).ok_or_else(|| {
                ConfigError::InvalidValue(
                    "SEASONAL_ADJUSTMENT".to_string(),
                    format!("'{}' is not a boolean", raw),
                )
            })?,
            None => defaults.seasonal_adjustment,
        };

        // --- Product Lookup Settings ---
        let external_lookup = match lookup("EXTERNAL_LOOKUP") {
            Some(raw) => parse_flag(&raw).ok_or_else(|| {
                ConfigError::InvalidValue(
                    "EXTERNAL_LOOKUP".to_string(),
                    format!("'{}' is not a boolean", raw),
                )
            })?,
            None => defaults.external_lookup,
        };

        let openfoodfacts_url = lookup("OPENFOODFACTS_URL")
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or(defaults.openfoodfacts_url);

        Ok(Self {
            bind_address,
            log_level,
            cors_origin,
            factors_path,
            max_alternatives,
            seasonal_adjustment,
            external_lookup,
            openfoodfacts_url,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_address.port(), 8000);
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.max_alternatives, 3);
        assert!(!config.seasonal_adjustment);
        assert!(config.factors_path.is_none());
        assert!(config.external_lookup);
        assert_eq!(config.openfoodfacts_url, "https://world.openfoodfacts.org");
    }

    #[test]
    fn external_lookup_can_be_redirected_or_disabled() {
        let config = Config::from_lookup(lookup(&[
            ("EXTERNAL_LOOKUP", "off"),
            ("OPENFOODFACTS_URL", " http://localhost:9999 "),
        ]))
        .unwrap();
        assert!(!config.external_lookup);
        assert_eq!(config.openfoodfacts_url, "http://localhost:9999");

        assert!(matches!(
            Config::from_lookup(lookup(&[("EXTERNAL_LOOKUP", "sometimes")])),
            Err(ConfigError::InvalidValue(key, _)) if key == "EXTERNAL_LOOKUP"
        ));
    }

    #[test]
    fn values_are_read() {
        let config = Config::from_lookup(lookup(&[
            ("BIND_ADDRESS", "127.0.0.1:9000"),
            ("RUST_LOG", "debug"),
            ("MAX_ALTERNATIVES", "2"),
            ("SEASONAL_ADJUSTMENT", "yes"),
            ("FACTORS_PATH", "./factors.json"),
        ]))
        .unwrap();
        assert_eq!(config.bind_address.port(), 9000);
        assert_eq!(config.log_level, Level::DEBUG);
        assert_eq!(config.max_alternatives, 2);
        assert!(config.seasonal_adjustment);
        assert_eq!(config.factors_path, Some(PathBuf::from("./factors.json")));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            Config::from_lookup(lookup(&[("MAX_ALTERNATIVES", "many")])),
            Err(ConfigError::InvalidValue(key, _)) if key == "MAX_ALTERNATIVES"
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[("SEASONAL_ADJUSTMENT", "maybe")])),
            Err(ConfigError::InvalidValue(key, _)) if key == "SEASONAL_ADJUSTMENT"
        ));
        assert!(Config::from_lookup(lookup(&[("BIND_ADDRESS", "nowhere")])).is_err());
    }
}
