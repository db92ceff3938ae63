//! services/api/src/adapters/factors_file.rs
//!
//! Loads optional emission factor overrides from a JSON file and merges them over the
//! built-in tables. Values are validated here so the estimator only ever sees usable
//! factors.

use crate::config::ConfigError;
use carbonscope_core::domain::{normalize_tag, ProductCategory, PurchaseChannel};
use carbonscope_core::factors::EmissionFactors;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// The on-disk shape of a factor override file. Every section is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FactorOverrides {
    #[serde(default)]
    pub category_base: HashMap<String, f64>,
    #[serde(default)]
    pub material_weights: HashMap<String, f64>,
    #[serde(default)]
    pub packaging_weights: HashMap<String, f64>,
    #[serde(default)]
    pub origin_multipliers: HashMap<String, f64>,
    #[serde(default)]
    pub context_multipliers: HashMap<String, f64>,
    pub seasonal: Option<[f64; 12]>,
    pub transport_share: Option<f64>,
    pub packaging_share: Option<f64>,
    pub electronics_usage_kg: Option<f64>,
}

impl FactorOverrides {
    pub fn from_json(raw: &str) -> Result<Self, String> {
        serde_json::from_str(raw).map_err(|e| e.to_string())
    }

    /// Merges the overrides into `factors`, rejecting unusable values and unknown keys.
    pub fn apply(self, mut factors: EmissionFactors) -> Result<EmissionFactors, String> {
        for (key, value) in self.category_base {
            let category = ProductCategory::ALL
                .into_iter()
                .find(|c| c.as_str() == normalize_tag(&key))
                .ok_or_else(|| format!("unknown category '{}'", key))?;
            factors.category_base.insert(category, checked(&key, value)?);
        }

        for (key, value) in self.context_multipliers {
            let channel = PurchaseChannel::parse(Some(&key));
            if channel == PurchaseChannel::Unknown {
                return Err(format!("unknown purchase context '{}'", key));
            }
            factors.context_multipliers.insert(channel, checked(&key, value)?);
        }

        merge_keyed(&mut factors.material_weights, self.material_weights)?;
        merge_keyed(&mut factors.packaging_weights, self.packaging_weights)?;
        merge_keyed(&mut factors.origin_multipliers, self.origin_multipliers)?;

        if let Some(seasonal) = self.seasonal {
            for (month, value) in seasonal.iter().enumerate() {
                checked(&format!("seasonal[{}]", month + 1), *value)?;
            }
            factors.seasonal = seasonal;
        }
        if let Some(share) = self.transport_share {
            factors.transport_share = checked("transport_share", share)?;
        }
        if let Some(share) = self.packaging_share {
            factors.packaging_share = checked("packaging_share", share)?;
        }
        if let Some(usage) = self.electronics_usage_kg {
            factors.electronics_usage_kg = checked("electronics_usage_kg", usage)?;
        }

        Ok(factors)
    }
}

/// Reads the file at `path` and returns the standard factors with its overrides applied.
pub fn load_factors(path: &Path) -> Result<EmissionFactors, ConfigError> {
    let to_config_error = |message: String| ConfigError::FactorsFile(path.to_path_buf(), message);

    let raw = std::fs::read_to_string(path).map_err(|e| to_config_error(e.to_string()))?;
    let factors = FactorOverrides::from_json(&raw)
        .and_then(|overrides| overrides.apply(EmissionFactors::standard()))
        .map_err(to_config_error)?;

    info!("Loaded emission factor overrides from {}", path.display());
    Ok(factors)
}

fn merge_keyed(target: &mut HashMap<String, f64>, overrides: HashMap<String, f64>) -> Result<(), String> {
    for (key, value) in overrides {
        target.insert(normalize_tag(&key), checked(&key, value)?);
    }
    Ok(())
}

fn checked(key: &str, value: f64) -> Result<f64, String> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(format!("'{}' must be a positive number, got {}", key, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_are_merged() {
        let overrides = FactorOverrides::from_json(
            r#"{
                "category_base": { "Beverage": 1.0 },
                "material_weights": { "Bamboo Fibre": 0.3 },
                "origin_multipliers": { "New Zealand": 1.8 },
                "context_multipliers": { "online": 1.2 },
                "electronics_usage_kg": 12.5
            }"#,
        )
        .unwrap();
        let factors = overrides.apply(EmissionFactors::standard()).unwrap();

        assert_eq!(factors.category_base(ProductCategory::Beverage), 1.0);
        assert_eq!(factors.material_weight("bamboo_fibre"), 0.3);
        assert!(factors.is_known_origin("new zealand"));
        assert_eq!(factors.context_multiplier(PurchaseChannel::Online), 1.2);
        assert_eq!(factors.electronics_usage_kg, 12.5);
        // Untouched entries keep their built-in values.
        assert_eq!(factors.material_weight("aluminum"), 1.8);
    }

    #[test]
    fn unusable_values_are_rejected() {
        let negative = FactorOverrides::from_json(r#"{ "material_weights": { "glass": -1.0 } }"#).unwrap();
        assert!(negative.apply(EmissionFactors::standard()).is_err());

        let zero_share = FactorOverrides::from_json(r#"{ "transport_share": 0.0 }"#).unwrap();
        assert!(zero_share.apply(EmissionFactors::standard()).is_err());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let category = FactorOverrides::from_json(r#"{ "category_base": { "toys": 2.0 } }"#).unwrap();
        assert!(category.apply(EmissionFactors::standard()).is_err());

        let channel = FactorOverrides::from_json(r#"{ "context_multipliers": { "drone": 2.0 } }"#).unwrap();
        assert!(channel.apply(EmissionFactors::standard()).is_err());

        assert!(FactorOverrides::from_json(r#"{ "mystery_table": {} }"#).is_err());
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let result = load_factors(Path::new("/definitely/not/here/factors.json"));
        assert!(matches!(result, Err(ConfigError::FactorsFile(_, _))));
    }
}
