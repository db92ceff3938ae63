//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::state::AppState;
use axum::{extract::State, http::StatusCode, response::Json};
use carbonscope_core::{
    Alternative, AppliedFactors, CarbonEstimate, PortError, ProductAnalysis, ProductCategory, ProductDescriptor,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        scan_product_handler,
        analyze_product_handler,
        health_handler,
        root_handler,
    ),
    components(
        schemas(
            ScanRequest,
            AnalyzeRequest,
            ProductAnalysisResponse,
            CarbonEstimateResponse,
            FactorsAppliedResponse,
            AlternativeResponse,
            HealthResponse,
            RootResponse,
        )
    ),
    tags(
        (name = "CarbonScope API", description = "Carbon footprint estimates for scanned products.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Request Payloads
//=========================================================================================

/// A barcode scan. The product is looked up by barcode.
#[derive(Deserialize, ToSchema, Debug, Default)]
pub struct ScanRequest {
    pub barcode: Option<String>,
    pub user_location: Option<String>,
    /// e.g. `retail_store`, `online`, `express_shipping`, `same_day_delivery`.
    pub purchase_context: Option<String>,
}

/// A fully described product, analysed without a catalog lookup.
#[derive(Deserialize, ToSchema, Debug, Default)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub barcode: String,
    pub product_name: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub materials: Vec<String>,
    pub country_of_origin: Option<String>,
    pub purchase_context: Option<String>,
    pub user_location: Option<String>,
    #[serde(default)]
    pub verified: bool,
    pub declared_weight_kg: Option<f64>,
    /// Calendar month (1-12) for the seasonal transport factor.
    pub month: Option<u32>,
}

//=========================================================================================
// API Response Structs
//=========================================================================================

#[derive(Serialize, ToSchema, Debug, Clone, PartialEq)]
pub struct FactorsAppliedResponse {
    pub origin_multiplier: f64,
    pub seasonal_multiplier: f64,
    pub context_multiplier: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material_weight: Option<f64>,
    pub packaging_weight: f64,
    pub verified_data: bool,
}

impl From<&AppliedFactors> for FactorsAppliedResponse {
    fn from(factors: &AppliedFactors) -> Self {
        Self {
            origin_multiplier: factors.origin_multiplier,
            seasonal_multiplier: factors.seasonal_multiplier,
            context_multiplier: factors.context_multiplier,
            material_weight: factors.material_weight,
            packaging_weight: factors.packaging_weight,
            verified_data: factors.verified_data,
        }
    }
}

/// The carbon breakdown, in kg CO2e.
#[derive(Serialize, ToSchema, Debug, Clone, PartialEq)]
pub struct CarbonEstimateResponse {
    pub production_co2_kg: f64,
    pub transport_co2_kg: f64,
    pub packaging_co2_kg: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_co2_kg: Option<f64>,
    pub total_co2_kg: f64,
    pub confidence_score: f64,
    /// One of `low`, `medium`, `high`, `very_high`.
    pub impact_level: String,
    pub methodology: String,
    pub factors_applied: FactorsAppliedResponse,
}

impl From<&CarbonEstimate> for CarbonEstimateResponse {
    fn from(estimate: &CarbonEstimate) -> Self {
        Self {
            production_co2_kg: estimate.production_co2_kg,
            transport_co2_kg: estimate.transport_co2_kg,
            packaging_co2_kg: estimate.packaging_co2_kg,
            usage_co2_kg: estimate.usage_co2_kg,
            total_co2_kg: estimate.total_co2_kg,
            confidence_score: estimate.confidence_score,
            impact_level: estimate.impact_level.as_str().to_string(),
            methodology: estimate.methodology.clone(),
            factors_applied: FactorsAppliedResponse::from(&estimate.factors),
        }
    }
}

#[derive(Serialize, ToSchema, Debug, Clone, PartialEq)]
pub struct AlternativeResponse {
    pub name: String,
    pub co2_kg: f64,
    pub co2_reduction: f64,
    pub savings_kg: f64,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability: Option<String>,
}

impl From<&Alternative> for AlternativeResponse {
    fn from(alternative: &Alternative) -> Self {
        Self {
            name: alternative.name.clone(),
            co2_kg: alternative.co2_kg,
            co2_reduction: alternative.co2_reduction,
            savings_kg: alternative.savings_kg,
            reason: alternative.reason.clone(),
            availability: alternative.availability.clone(),
        }
    }
}

/// The response payload for a scanned or described product.
#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct ProductAnalysisResponse {
    pub scan_id: Uuid,
    pub product_name: String,
    pub barcode: String,
    pub category: String,
    /// Material tags the estimate was based on.
    pub materials_detected: Vec<String>,
    pub carbon_estimate: CarbonEstimateResponse,
    pub alternatives: Vec<AlternativeResponse>,
    pub timestamp: DateTime<Utc>,
}

impl ProductAnalysisResponse {
    fn new(product: &ProductDescriptor, analysis: &ProductAnalysis) -> Self {
        Self {
            scan_id: Uuid::new_v4(),
            product_name: product.name.clone(),
            barcode: product.barcode.clone(),
            category: product.category.as_str().to_string(),
            materials_detected: product.materials.clone(),
            carbon_estimate: CarbonEstimateResponse::from(&analysis.estimate),
            alternatives: analysis.alternatives.iter().map(AlternativeResponse::from).collect(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct RootResponse {
    pub message: String,
    pub version: String,
    pub docs: String,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Scan a product by barcode and estimate its carbon footprint.
#[utoipa::path(
    post,
    path = "/api/v1/products/scan",
    request_body = ScanRequest,
    responses(
        (status = 200, description = "Product analysed", body = ProductAnalysisResponse),
        (status = 400, description = "Missing or blank barcode"),
        (status = 404, description = "Product could not be resolved"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn scan_product_handler(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<ScanRequest>,
) -> Result<Json<ProductAnalysisResponse>, (StatusCode, String)> {
    let barcode = req
        .barcode
        .as_deref()
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .ok_or_else(|| (StatusCode::BAD_REQUEST, "barcode is required".to_string()))?;

    let product = app_state
        .resolver
        .resolve(barcode)
        .await
        .map_err(port_error_response)?;

    let context = app_state.purchase_context(req.purchase_context.as_deref(), req.user_location, None);
    let analysis = app_state.analyzer.analyze(&product, &context);

    info!(
        "Scanned {} ({}): {} kg CO2e, impact {}",
        product.barcode,
        product.category.as_str(),
        analysis.estimate.total_co2_kg,
        analysis.estimate.impact_level.as_str()
    );
    Ok(Json(ProductAnalysisResponse::new(&product, &analysis)))
}

/// Estimate the carbon footprint of a fully described product.
#[utoipa::path(
    post,
    path = "/api/v1/products/analyze",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Product analysed", body = ProductAnalysisResponse),
        (status = 400, description = "Missing or blank barcode")
    )
)]
pub async fn analyze_product_handler(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<ProductAnalysisResponse>, (StatusCode, String)> {
    let barcode = req.barcode.trim();
    if barcode.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "barcode is required".to_string()));
    }

    let category = ProductCategory::parse(req.category.as_deref().unwrap_or_default());
    let name = req
        .product_name
        .clone()
        .unwrap_or_else(|| "Unknown Product".to_string());
    let product = ProductDescriptor {
        declared_weight_kg: req.declared_weight_kg.filter(|w| w.is_finite() && *w > 0.0),
        ..ProductDescriptor::new(barcode, name, category)
            .with_materials(req.materials)
            .with_origin(req.country_of_origin.unwrap_or_default())
            .with_verified(req.verified)
    };

    let context = app_state.purchase_context(req.purchase_context.as_deref(), req.user_location, req.month);
    let analysis = app_state.analyzer.analyze(&product, &context);

    info!(
        "Analysed {} ({}): {} kg CO2e, impact {}",
        product.barcode,
        product.category.as_str(),
        analysis.estimate.total_co2_kg,
        analysis.estimate.impact_level.as_str()
    );
    Ok(Json(ProductAnalysisResponse::new(&product, &analysis)))
}

/// Liveness check.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is healthy", body = HealthResponse))
)]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "carbonscope-api".to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Welcome message", body = RootResponse))
)]
pub async fn root_handler() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Welcome to CarbonScope API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        docs: "/swagger-ui".to_string(),
    })
}

fn port_error_response(e: PortError) -> (StatusCode, String) {
    match e {
        PortError::NotFound(what) => {
            warn!("Product lookup failed: {}", what);
            (StatusCode::NOT_FOUND, format!("Product not found: {}", what))
        }
        PortError::InvalidInput(message) => (StatusCode::BAD_REQUEST, message),
        PortError::Unexpected(message) => {
            error!("Product resolver error: {}", message);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to resolve product".to_string(),
            )
        }
    }
}
