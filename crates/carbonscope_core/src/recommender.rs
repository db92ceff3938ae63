//! crates/carbonscope_core/src/recommender.rs
//!
//! Proposes lower-carbon substitutes from a static, category-keyed catalog.

use crate::domain::{round2, Alternative, CarbonEstimate, ProductDescriptor};
use crate::factors::AlternativeCatalog;
use tracing::debug;

pub const DEFAULT_MAX_ALTERNATIVES: usize = 3;

#[derive(Debug, Clone)]
pub struct AlternativeRecommender {
    catalog: AlternativeCatalog,
    max_results: usize,
}

impl AlternativeRecommender {
    pub fn new(catalog: AlternativeCatalog, max_results: usize) -> Self {
        Self { catalog, max_results }
    }

    /// Alternatives for the product, largest savings first.
    ///
    /// Savings are computed against the presented total, so every figure in a response
    /// agrees with the presented estimate whether `estimate` is raw or already presented.
    /// Categories without a catalog entry get an empty list.
    pub fn recommend(&self, product: &ProductDescriptor, estimate: &CarbonEstimate) -> Vec<Alternative> {
        let total = estimate.presented().total_co2_kg;

        let mut alternatives: Vec<Alternative> = self
            .catalog
            .candidates(product.category)
            .iter()
            .filter(|candidate| {
                let usable = candidate.co2_reduction.is_finite()
                    && candidate.co2_reduction > 0.0
                    && candidate.co2_reduction <= 1.0;
                if !usable {
                    debug!(
                        "Skipping alternative '{}' with reduction {}",
                        candidate.name, candidate.co2_reduction
                    );
                }
                usable
            })
            .map(|candidate| {
                let co2_kg = round2(total * (1.0 - candidate.co2_reduction));
                Alternative {
                    name: candidate.name.clone(),
                    co2_kg,
                    co2_reduction: candidate.co2_reduction,
                    savings_kg: round2(total - co2_kg),
                    reason: candidate.reason.clone(),
                    availability: candidate.availability.clone(),
                }
            })
            .collect();

        // Stable: equal savings keep the larger configured reduction first, then catalog order.
        alternatives.sort_by(|a, b| {
            b.savings_kg
                .total_cmp(&a.savings_kg)
                .then(b.co2_reduction.total_cmp(&a.co2_reduction))
        });
        alternatives.truncate(self.max_results);
        alternatives
    }
}

impl Default for AlternativeRecommender {
    fn default() -> Self {
        Self::new(AlternativeCatalog::standard(), DEFAULT_MAX_ALTERNATIVES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AppliedFactors, ProductCategory, PurchaseChannel, PurchaseContext};
    use crate::estimator::CarbonEstimator;
    use crate::factors::{AlternativeCandidate, EmissionFactors};

    fn estimate_of(total: f64) -> CarbonEstimate {
        CarbonEstimate::from_components(
            total,
            0.0,
            0.0,
            None,
            0.5,
            "test",
            AppliedFactors {
                origin_multiplier: 1.0,
                seasonal_multiplier: 1.0,
                context_multiplier: 1.0,
                material_weight: None,
                packaging_weight: 1.0,
                verified_data: false,
            },
        )
    }

    fn product(category: ProductCategory) -> ProductDescriptor {
        ProductDescriptor::new("1234567890123", "Item", category)
    }

    #[test]
    fn beverage_alternatives_led_by_concentrate() {
        let alternatives = AlternativeRecommender::default().recommend(&product(ProductCategory::Beverage), &estimate_of(1.84));

        assert_eq!(alternatives.len(), 3);
        assert!(alternatives[0].name.contains("Concentrate"));
        assert_eq!(alternatives[0].co2_reduction, 0.60);
        assert_eq!(alternatives[1].co2_reduction, 0.40);
        assert_eq!(alternatives[2].co2_reduction, 0.25);
    }

    #[test]
    fn savings_are_consistent_with_total() {
        let recommender = AlternativeRecommender::default();
        let estimate = estimate_of(57.025);
        let total = estimate.presented().total_co2_kg;
        let catalog = AlternativeCatalog::standard();

        for alternative in recommender.recommend(&product(ProductCategory::Electronics), &estimate) {
            assert_eq!(alternative.savings_kg, round2(total - alternative.co2_kg));
            let configured = catalog
                .candidates(ProductCategory::Electronics)
                .iter()
                .find(|c| c.name == alternative.name)
                .map(|c| c.co2_reduction);
            assert_eq!(configured, Some(alternative.co2_reduction));
            assert!(alternative.availability.is_some());
        }
    }

    #[test]
    fn raw_estimates_are_priced_against_the_presented_total() {
        let product = ProductDescriptor::new("1234567890123", "Cola 330ml Can", ProductCategory::Beverage)
            .with_materials(["aluminum"])
            .with_origin("USA");
        let raw = CarbonEstimator::new(EmissionFactors::standard())
            .estimate(&product, &PurchaseContext::new(PurchaseChannel::Online));
        // Rounding the raw total gives 1.85; the presented components sum to 1.84.
        assert_eq!(round2(raw.total_co2_kg), 1.85);
        assert_eq!(raw.presented().total_co2_kg, 1.84);

        let recommender = AlternativeRecommender::default();
        let from_raw = recommender.recommend(&product, &raw);
        assert!(!from_raw.is_empty());
        assert_eq!(from_raw, recommender.recommend(&product, &raw.presented()));
        for alternative in &from_raw {
            assert_eq!(alternative.co2_kg, round2(1.84 * (1.0 - alternative.co2_reduction)));
            assert_eq!(alternative.savings_kg, round2(1.84 - alternative.co2_kg));
        }
    }

    #[test]
    fn sorted_by_savings_descending() {
        let alternatives =
            AlternativeRecommender::default().recommend(&product(ProductCategory::Apparel), &estimate_of(12.0));

        assert!(alternatives.windows(2).all(|pair| pair[0].savings_kg >= pair[1].savings_kg));
        assert_eq!(alternatives[0].name, "Second-Hand Item");
    }

    #[test]
    fn no_table_means_no_alternatives() {
        let alternatives = AlternativeRecommender::default().recommend(&product(ProductCategory::Other), &estimate_of(3.5));
        assert!(alternatives.is_empty());
    }

    #[test]
    fn invalid_reductions_are_skipped_and_results_truncated() {
        let mut catalog = AlternativeCatalog::default();
        catalog.by_category.insert(
            ProductCategory::Food,
            [("Negative", -0.2), ("Too Much", 1.5), ("Half", 0.5), ("Quarter", 0.25), ("Tenth", 0.1)]
                .into_iter()
                .map(|(name, co2_reduction)| AlternativeCandidate {
                    name: name.to_string(),
                    co2_reduction,
                    reason: "test".to_string(),
                    availability: None,
                })
                .collect(),
        );

        let alternatives = AlternativeRecommender::new(catalog, 2).recommend(&product(ProductCategory::Food), &estimate_of(4.0));

        let names: Vec<&str> = alternatives.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["Half", "Quarter"]);
        assert_eq!(alternatives[0].co2_kg, 2.0);
        assert_eq!(alternatives[0].savings_kg, 2.0);
    }

    #[test]
    fn zero_total_keeps_reduction_order() {
        let alternatives =
            AlternativeRecommender::default().recommend(&product(ProductCategory::Electronics), &estimate_of(0.0));

        assert!(alternatives.iter().all(|a| a.savings_kg == 0.0));
        assert_eq!(alternatives[0].name, "Refurbished Option");
    }
}
