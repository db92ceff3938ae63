//! crates/carbonscope_core/src/analyzer.rs
//!
//! Runs the estimator and the recommender as a single analysis step.

use crate::domain::{ProductAnalysis, ProductDescriptor, PurchaseContext};
use crate::estimator::CarbonEstimator;
use crate::recommender::AlternativeRecommender;

/// The entry point used by request handlers. Holds no mutable state.
#[derive(Debug, Clone, Default)]
pub struct ProductAnalyzer {
    estimator: CarbonEstimator,
    recommender: AlternativeRecommender,
}

impl ProductAnalyzer {
    pub fn new(estimator: CarbonEstimator, recommender: AlternativeRecommender) -> Self {
        Self {
            estimator,
            recommender,
        }
    }

    /// Estimates the footprint and proposes alternatives.
    ///
    /// The returned estimate is the presented (two-decimal) view.
    pub fn analyze(&self, product: &ProductDescriptor, context: &PurchaseContext) -> ProductAnalysis {
        let estimate = self.estimator.estimate(product, context).presented();
        let alternatives = self.recommender.recommend(product, &estimate);
        ProductAnalysis {
            estimate,
            alternatives,
        }
    }
}
