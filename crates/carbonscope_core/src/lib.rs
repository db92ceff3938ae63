pub mod analyzer;
pub mod domain;
pub mod estimator;
pub mod factors;
pub mod ports;
pub mod recommender;

pub use analyzer::ProductAnalyzer;
pub use domain::{
    round2, Alternative, AppliedFactors, CarbonEstimate, ImpactLevel, ProductAnalysis, ProductCategory,
    ProductDescriptor, PurchaseChannel, PurchaseContext,
};
pub use estimator::CarbonEstimator;
pub use factors::{AlternativeCandidate, AlternativeCatalog, ConfidenceWeights, EmissionFactors};
pub use ports::{PortError, PortResult, ProductResolver};
pub use recommender::{AlternativeRecommender, DEFAULT_MAX_ALTERNATIVES};
