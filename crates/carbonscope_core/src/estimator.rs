//! crates/carbonscope_core/src/estimator.rs
//!
//! The weighted multi-factor carbon model.
//!
//! Production scales the category base by the mean material intensity; transport and
//! packaging take nominal shares of the base adjusted by origin, season, purchase
//! channel and packaging material; electronics add a fixed lifetime usage figure.

use crate::domain::{AppliedFactors, CarbonEstimate, ProductCategory, ProductDescriptor, PurchaseContext};
use crate::factors::{positive_or_neutral, EmissionFactors, NEUTRAL, PLACEHOLDER_TAGS};
use tracing::debug;

const MATERIAL_METHODOLOGY: &str = "Multi-Factor Category + Material Analysis";
const BASELINE_METHODOLOGY: &str = "Multi-Factor Category Baseline Analysis";

/// Computes a `CarbonEstimate` for a product and purchase.
///
/// Stateless apart from its immutable factor tables; safe to share across threads.
#[derive(Debug, Clone, Default)]
pub struct CarbonEstimator {
    factors: EmissionFactors,
}

impl CarbonEstimator {
    /// Creates a new `CarbonEstimator` over the given factor tables.
    pub fn new(factors: EmissionFactors) -> Self {
        Self { factors }
    }

    pub fn factors(&self) -> &EmissionFactors {
        &self.factors
    }

    /// Produces the full-precision estimate. Never fails; unknown inputs are neutral.
    pub fn estimate(&self, product: &ProductDescriptor, context: &PurchaseContext) -> CarbonEstimate {
        let factors = &self.factors;
        let base = factors.category_base(product.category);
        let materials = informative_materials(&product.materials);

        if product.category == ProductCategory::Other {
            debug!("Product {} has no specific category, using the 'other' base factor", product.barcode);
        }

        // --- Production ---
        let material_weight = mean(materials.iter().map(|tag| factors.material_weight(tag)));
        if material_weight.is_none() {
            debug!("Product {} lists no materials, production uses the category base", product.barcode);
        }
        let production = base * material_weight.unwrap_or(NEUTRAL);

        // --- Transport ---
        let known_origin = factors.is_known_origin(&product.country_of_origin);
        if !known_origin {
            debug!(
                "Origin '{}' of product {} is not in the origin table, using a neutral multiplier",
                product.country_of_origin, product.barcode
            );
        }
        let origin_multiplier = factors.origin_multiplier(&product.country_of_origin);
        let seasonal_multiplier = factors.seasonal_multiplier(context.month);
        let context_multiplier = factors.context_multiplier(context.channel);
        let transport = base
            * positive_or_neutral(factors.transport_share)
            * origin_multiplier
            * seasonal_multiplier
            * context_multiplier;

        // --- Packaging ---
        let packaging_weight =
            mean(materials.iter().filter_map(|tag| factors.packaging_weight(tag))).unwrap_or(NEUTRAL);
        let packaging = base * positive_or_neutral(factors.packaging_share) * packaging_weight;

        // --- Usage ---
        let usage = (product.category == ProductCategory::Electronics)
            .then(|| positive_or_neutral(factors.electronics_usage_kg));

        // --- Confidence ---
        let weights = &factors.confidence;
        let mut confidence = weights.base;
        if product.verified {
            confidence += weights.verified_bonus;
        }
        if !materials.is_empty() {
            confidence += weights.materials_bonus;
        }
        if known_origin {
            confidence += weights.origin_bonus;
        }

        let methodology = if material_weight.is_some() {
            MATERIAL_METHODOLOGY
        } else {
            BASELINE_METHODOLOGY
        };

        CarbonEstimate::from_components(
            production,
            transport,
            packaging,
            usage,
            confidence,
            methodology,
            AppliedFactors {
                origin_multiplier,
                seasonal_multiplier,
                context_multiplier,
                material_weight,
                packaging_weight,
                verified_data: product.verified,
            },
        )
    }
}

/// Material tags that actually say something about the product.
fn informative_materials(materials: &[String]) -> Vec<&str> {
    materials
        .iter()
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty())
        .filter(|tag| !PLACEHOLDER_TAGS.iter().any(|p| tag.eq_ignore_ascii_case(p)))
        .collect()
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}
