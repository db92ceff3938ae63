//! crates/carbonscope_core/src/factors.rs
//!
//! Immutable lookup tables that parameterise the estimator and the recommender.
//!
//! The tables are plain data handed to the calculators at construction time. Every
//! lookup degrades to a neutral value instead of failing, so a partially populated
//! table still yields a valid estimate.

use crate::domain::{normalize_tag, ProductCategory, PurchaseChannel};
use std::collections::HashMap;

/// Multiplier substituted whenever a lookup is missing or unusable.
pub const NEUTRAL: f64 = 1.0;

//=========================================================================================
// Emission Factors
//=========================================================================================

/// Confidence increments awarded for input completeness.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceWeights {
    pub base: f64,
    pub verified_bonus: f64,
    pub materials_bonus: f64,
    pub origin_bonus: f64,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            base: 0.5,
            verified_bonus: 0.2,
            materials_bonus: 0.15,
            origin_bonus: 0.15,
        }
    }
}

/// Every scalar the estimator consults.
#[derive(Debug, Clone, PartialEq)]
pub struct EmissionFactors {
    /// kg CO2e per unit, by category.
    pub category_base: HashMap<ProductCategory, f64>,
    /// Relative carbon intensity per material tag (1.0 = typical).
    pub material_weights: HashMap<String, f64>,
    /// Relative intensity of materials that count as packaging.
    pub packaging_weights: HashMap<String, f64>,
    /// Transport multiplier by normalised country name.
    pub origin_multipliers: HashMap<String, f64>,
    /// Transport multiplier by month, January first.
    pub seasonal: [f64; 12],
    pub context_multipliers: HashMap<PurchaseChannel, f64>,
    /// Nominal transport share of the category base.
    pub transport_share: f64,
    /// Nominal packaging share of the category base.
    pub packaging_share: f64,
    /// Lifetime energy estimate for electronics, kg CO2e.
    pub electronics_usage_kg: f64,
    pub confidence: ConfidenceWeights,
}

impl EmissionFactors {
    /// The built-in factor set.
    pub fn standard() -> Self {
        let category_base = HashMap::from([
            (ProductCategory::Electronics, 15.0),
            (ProductCategory::Beverage, 0.8),
            (ProductCategory::Food, 2.0),
            (ProductCategory::Apparel, 8.0),
            (ProductCategory::Other, 3.0),
        ]);

        let material_weights = keyed([
            ("aluminum", 1.8),
            ("plastic", 0.55),
            ("plastic_pet", 0.55),
            ("plastic_hdpe", 0.35),
            ("glass", 0.15),
            ("steel", 0.35),
            ("metal", 1.0),
            ("cardboard", 0.2),
            ("paper", 0.2),
            ("cotton", 0.9),
            ("polyester", 1.5),
            ("recycled_polyester", 0.65),
            ("rare_earth_metals", 3.9),
            ("lithium", 2.35),
            ("organic_matter", 0.05),
        ]);

        let packaging_weights = keyed([
            ("aluminum", 1.8),
            ("plastic", 1.0),
            ("plastic_pet", 1.0),
            ("plastic_hdpe", 0.8),
            ("glass", 1.2),
            ("steel", 1.1),
            ("cardboard", 0.6),
            ("paper", 0.6),
        ]);

        let origin_multipliers = keyed([
            ("usa", 1.0),
            ("united_states", 1.0),
            ("canada", 1.1),
            ("mexico", 1.2),
            ("uk", 1.2),
            ("united_kingdom", 1.2),
            ("germany", 1.3),
            ("france", 1.3),
            ("ecuador", 1.5),
            ("brazil", 1.6),
            ("japan", 1.6),
            ("south_korea", 1.7),
            ("china", 1.8),
            ("india", 1.8),
            ("vietnam", 1.8),
            ("bangladesh", 1.8),
        ]);

        let context_multipliers = HashMap::from([
            (PurchaseChannel::RetailStore, 0.9),
            (PurchaseChannel::Online, 1.1),
            (PurchaseChannel::ExpressShipping, 1.5),
            (PurchaseChannel::SameDayDelivery, 3.0),
            (PurchaseChannel::OvernightShipping, 2.0),
            (PurchaseChannel::BulkPurchase, 0.8),
            (PurchaseChannel::Subscription, 0.85),
        ]);

        Self {
            category_base,
            material_weights,
            packaging_weights,
            origin_multipliers,
            // Winter storms and the holiday surge at both ends of the year.
            seasonal: [1.2, 1.15, 1.05, 1.0, 1.0, 1.1, 1.15, 1.15, 1.1, 1.05, 1.1, 1.2],
            context_multipliers,
            transport_share: 0.3,
            packaging_share: 0.1,
            electronics_usage_kg: 10.0,
            confidence: ConfidenceWeights::default(),
        }
    }

    /// Base factor for a category, falling back to `Other`, then to neutral.
    pub fn category_base(&self, category: ProductCategory) -> f64 {
        self.category_base
            .get(&category)
            .or_else(|| self.category_base.get(&ProductCategory::Other))
            .copied()
            .map(positive_or_neutral)
            .unwrap_or(NEUTRAL)
    }

    pub fn material_weight(&self, tag: &str) -> f64 {
        lookup(&self.material_weights, tag)
    }

    /// `Some(weight)` only for tags that count as packaging.
    pub fn packaging_weight(&self, tag: &str) -> Option<f64> {
        self.packaging_weights
            .get(&normalize_tag(tag))
            .copied()
            .map(positive_or_neutral)
    }

    /// Whether the country has its own entry in the origin table.
    pub fn is_known_origin(&self, country: &str) -> bool {
        self.origin_multipliers.contains_key(&normalize_tag(country))
    }

    pub fn origin_multiplier(&self, country: &str) -> f64 {
        lookup(&self.origin_multipliers, country)
    }

    /// Seasonal factor for a 1-based month; neutral when absent or out of range.
    pub fn seasonal_multiplier(&self, month: Option<u32>) -> f64 {
        month
            .filter(|m| (1..=12).contains(m))
            .map(|m| positive_or_neutral(self.seasonal[(m - 1) as usize]))
            .unwrap_or(NEUTRAL)
    }

    pub fn context_multiplier(&self, channel: PurchaseChannel) -> f64 {
        self.context_multipliers
            .get(&channel)
            .copied()
            .map(positive_or_neutral)
            .unwrap_or(NEUTRAL)
    }
}

impl Default for EmissionFactors {
    fn default() -> Self {
        Self::standard()
    }
}

//=========================================================================================
// Alternative Catalog
//=========================================================================================

/// A configured substitute for products in one category.
#[derive(Debug, Clone, PartialEq)]
pub struct AlternativeCandidate {
    pub name: String,
    pub co2_reduction: f64,
    pub reason: String,
    pub availability: Option<String>,
}

impl AlternativeCandidate {
    fn new(name: &str, co2_reduction: f64, reason: &str, availability: &str) -> Self {
        Self {
            name: name.to_string(),
            co2_reduction,
            reason: reason.to_string(),
            availability: Some(availability.to_string()),
        }
    }
}

/// Category-specific substitutes. Categories without an entry get no suggestions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AlternativeCatalog {
    pub by_category: HashMap<ProductCategory, Vec<AlternativeCandidate>>,
}

impl AlternativeCatalog {
    pub fn standard() -> Self {
        let by_category = HashMap::from([
            (
                ProductCategory::Beverage,
                vec![
                    AlternativeCandidate::new(
                        "Local Brand Alternative",
                        0.40,
                        "Shorter transport distance",
                        "Regional grocery stores",
                    ),
                    AlternativeCandidate::new(
                        "Concentrate or Reusable Bottle",
                        0.60,
                        "Ships far less water and packaging per serving",
                        "Most supermarkets",
                    ),
                    AlternativeCandidate::new(
                        "Glass Bottle Version",
                        0.25,
                        "Returnable, recyclable packaging",
                        "Widely available",
                    ),
                ],
            ),
            (
                ProductCategory::Electronics,
                vec![
                    AlternativeCandidate::new(
                        "Refurbished Option",
                        0.75,
                        "No new manufacturing",
                        "Certified refurbishers",
                    ),
                    AlternativeCandidate::new(
                        "Energy Efficient Model",
                        0.30,
                        "Lower lifetime energy use",
                        "Major electronics retailers",
                    ),
                    AlternativeCandidate::new(
                        "Previous Generation Model",
                        0.40,
                        "Built on amortised production lines",
                        "Major electronics retailers",
                    ),
                ],
            ),
            (
                ProductCategory::Food,
                vec![
                    AlternativeCandidate::new(
                        "Plant-Based Option",
                        0.50,
                        "Lower production emissions",
                        "Most supermarkets",
                    ),
                    AlternativeCandidate::new(
                        "Local Seasonal Produce",
                        0.35,
                        "Minimal transport and cold storage",
                        "Farmers markets",
                    ),
                    AlternativeCandidate::new(
                        "Bulk Pack",
                        0.15,
                        "Less packaging per unit",
                        "Warehouse stores",
                    ),
                ],
            ),
            (
                ProductCategory::Apparel,
                vec![
                    AlternativeCandidate::new(
                        "Second-Hand Item",
                        0.80,
                        "No new production",
                        "Thrift stores and resale platforms",
                    ),
                    AlternativeCandidate::new(
                        "Recycled Fibre Garment",
                        0.30,
                        "Recycled polyester needs roughly half the energy",
                        "Outdoor and sportswear brands",
                    ),
                    AlternativeCandidate::new(
                        "Organic Cotton Alternative",
                        0.25,
                        "No synthetic fertiliser",
                        "Selected fashion retailers",
                    ),
                ],
            ),
        ]);

        Self { by_category }
    }

    pub fn candidates(&self, category: ProductCategory) -> &[AlternativeCandidate] {
        self.by_category
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

//=========================================================================================
// Helpers
//=========================================================================================

fn keyed<const N: usize>(entries: [(&str, f64); N]) -> HashMap<String, f64> {
    entries
        .into_iter()
        .map(|(k, v)| (normalize_tag(k), v))
        .collect()
}

fn lookup(table: &HashMap<String, f64>, key: &str) -> f64 {
    table
        .get(&normalize_tag(key))
        .copied()
        .map(positive_or_neutral)
        .unwrap_or(NEUTRAL)
}

/// Non-finite and non-positive factors are never used.
pub fn positive_or_neutral(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        NEUTRAL
    }
}

/// Material tags that carry no information.
pub(crate) const PLACEHOLDER_TAGS: [&str; 3] = ["unknown", "n/a", "none"];
