//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{load_factors, InMemoryProductCatalog, OpenFoodFactsResolver},
    config::Config,
    error::ApiError,
    web::{
        analyze_product_handler, health_handler, rest::ApiDoc, root_handler, scan_product_handler,
        state::AppState,
    },
};
use axum::{
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{get, post},
    Router,
};
use carbonscope_core::EmissionFactors;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Load Emission Factors ---
    let factors = match &config.factors_path {
        Some(path) => load_factors(path)?,
        None => {
            info!("No FACTORS_PATH set, using the built-in emission factors.");
            EmissionFactors::standard()
        }
    };
    if config.seasonal_adjustment {
        info!("Seasonal adjustment enabled: requests without a month use the current month.");
    }

    // --- 3. Initialize Service Adapters ---
    let mut catalog = InMemoryProductCatalog::seeded();
    info!("Product catalog ready with {} verified products.", catalog.len());
    if config.external_lookup {
        let external = OpenFoodFactsResolver::new(config.openfoodfacts_url.clone())?;
        catalog = catalog.with_external(Arc::new(external));
        info!("Uncatalogued barcodes are looked up at {}.", config.openfoodfacts_url);
    }

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState::new(config.clone(), Arc::new(catalog), factors));

    let origin = config.cors_origin.parse::<HeaderValue>().map_err(|e| {
        ApiError::Internal(format!("Invalid CORS origin '{}': {}", config.cors_origin, e))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    // --- 5. Create the Web Router ---
    let api_router = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/api/v1/products/scan", post(scan_product_handler))
        .route("/api/v1/products/analyze", post(analyze_product_handler))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
