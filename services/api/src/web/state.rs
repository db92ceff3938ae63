//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use carbonscope_core::{
    AlternativeCatalog, AlternativeRecommender, CarbonEstimator, EmissionFactors, ProductAnalyzer,
    ProductResolver, PurchaseChannel, PurchaseContext,
};
use chrono::{Datelike, Utc};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub resolver: Arc<dyn ProductResolver>,
    pub analyzer: Arc<ProductAnalyzer>,
}

impl AppState {
    /// Wires the analyzer from the given factor tables and the configured result limit.
    pub fn new(config: Arc<Config>, resolver: Arc<dyn ProductResolver>, factors: EmissionFactors) -> Self {
        let analyzer = ProductAnalyzer::new(
            CarbonEstimator::new(factors),
            AlternativeRecommender::new(AlternativeCatalog::standard(), config.max_alternatives),
        );
        Self {
            config,
            resolver,
            analyzer: Arc::new(analyzer),
        }
    }

    /// Builds the purchase context for a request.
    ///
    /// With seasonal adjustment enabled, a request without a month gets the current one.
    pub fn purchase_context(
        &self,
        purchase_context: Option<&str>,
        user_location: Option<String>,
        month: Option<u32>,
    ) -> PurchaseContext {
        let month = match month {
            Some(m) => Some(m),
            None if self.config.seasonal_adjustment => Some(Utc::now().month()),
            None => None,
        };
        PurchaseContext {
            channel: PurchaseChannel::parse(purchase_context),
            user_location,
            month,
        }
    }
}
