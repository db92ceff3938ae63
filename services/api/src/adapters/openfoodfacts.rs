//! services/api/src/adapters/openfoodfacts.rs
//!
//! A `ProductResolver` backed by the public OpenFoodFacts product API.
//!
//! Products found here are community data, so they are always returned unverified.
//! The category, materials and weight are guessed from the free-text fields.

use async_trait::async_trait;
use carbonscope_core::domain::{ProductCategory, ProductDescriptor};
use carbonscope_core::ports::{PortError, PortResult, ProductResolver};
use regex::Regex;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://world.openfoodfacts.org";
pub const LOOKUP_TIMEOUT: Duration = Duration::from_secs(3);

/// Used when the product carries no parsable quantity.
const DEFAULT_WEIGHT_KG: f64 = 0.1;

//=========================================================================================
// Wire Types
//=========================================================================================

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    status: i64,
    product: Option<OffProduct>,
}

#[derive(Debug, Default, Deserialize)]
struct OffProduct {
    product_name: Option<String>,
    brands: Option<String>,
    categories: Option<String>,
    packaging: Option<String>,
    countries: Option<String>,
    quantity: Option<Value>,
    net_weight: Option<Value>,
    serving_quantity: Option<Value>,
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

#[derive(Clone, Debug)]
pub struct OpenFoodFactsResolver {
    client: reqwest::Client,
    base_url: String,
}

impl OpenFoodFactsResolver {
    /// Creates a resolver against `base_url` with the standard three second timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        Self::with_timeout(base_url, LOOKUP_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("carbonscope-api/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn product_url(&self, barcode: &str) -> String {
        format!("{}/api/v0/product/{}.json", self.base_url, barcode)
    }
}

//=========================================================================================
// `ProductResolver` Trait Implementation
//=========================================================================================

#[async_trait]
impl ProductResolver for OpenFoodFactsResolver {
    async fn resolve(&self, barcode: &str) -> PortResult<ProductDescriptor> {
        let barcode = barcode.trim();
        if barcode.is_empty() {
            return Err(PortError::InvalidInput("barcode must not be empty".to_string()));
        }
        if !barcode.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(PortError::NotFound(format!("'{}' is not a product code", barcode)));
        }

        let response = self
            .client
            .get(self.product_url(barcode))
            .send()
            .await
            .map_err(|e| PortError::Unexpected(format!("OpenFoodFacts request failed: {}", e)))?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => return Err(PortError::NotFound(barcode.to_string())),
            status => {
                return Err(PortError::Unexpected(format!(
                    "OpenFoodFacts answered {} for {}",
                    status, barcode
                )))
            }
        }

        let body: LookupResponse = response
            .json()
            .await
            .map_err(|e| PortError::Unexpected(format!("Unreadable OpenFoodFacts response: {}", e)))?;

        match body.product {
            Some(product) if body.status == 1 => {
                debug!("OpenFoodFacts resolved {}", barcode);
                Ok(to_descriptor(barcode, product))
            }
            _ => Err(PortError::NotFound(barcode.to_string())),
        }
    }
}

//=========================================================================================
// Helpers
//=========================================================================================

fn to_descriptor(barcode: &str, product: OffProduct) -> ProductDescriptor {
    let name = non_blank(product.product_name).unwrap_or_else(|| {
        let prefix: String = barcode.chars().take(8).collect();
        format!("Product {}...", prefix)
    });
    let brand = non_blank(product.brands).unwrap_or_else(|| "Unknown Brand".to_string());
    let category = map_category(product.categories.as_deref().unwrap_or_default());
    let materials = guess_materials_from_packaging(product.packaging.as_deref().unwrap_or_default());
    let origin = product
        .countries
        .as_deref()
        .and_then(first_country)
        .unwrap_or_else(|| "Unknown".to_string());
    let weight_kg = [&product.quantity, &product.net_weight, &product.serving_quantity]
        .into_iter()
        .flatten()
        .find_map(parse_weight_kg)
        .unwrap_or(DEFAULT_WEIGHT_KG);

    ProductDescriptor {
        brand: Some(brand),
        declared_weight_kg: Some(weight_kg),
        ..ProductDescriptor::new(barcode, name, category)
            .with_materials(materials)
            .with_origin(origin)
            .with_verified(false)
    }
}

/// Maps the free-text category list to a category. Anything that is not clearly a
/// drink is treated as food, since the database only covers groceries.
pub fn map_category(categories: &str) -> ProductCategory {
    let categories = categories.to_lowercase();
    let is_drink = ["beverage", "drink", "soda", "water"]
        .iter()
        .any(|keyword| categories.contains(keyword));
    if is_drink {
        ProductCategory::Beverage
    } else {
        ProductCategory::Food
    }
}

/// Guesses material tags from the packaging description, or `["unknown"]` when
/// nothing matches.
pub fn guess_materials_from_packaging(packaging: &str) -> Vec<String> {
    let packaging = packaging.to_lowercase();
    let rules: [(&[&str], &str); 4] = [
        (&["plastic", "bottle"], "plastic"),
        (&["aluminum", "aluminium", "can"], "aluminum"),
        (&["glass"], "glass"),
        (&["cardboard", "box"], "cardboard"),
    ];

    let materials: Vec<String> = rules
        .iter()
        .filter(|(keywords, _)| keywords.iter().any(|k| packaging.contains(k)))
        .map(|(_, material)| material.to_string())
        .collect();

    if materials.is_empty() {
        vec!["unknown".to_string()]
    } else {
        materials
    }
}

/// The first number in a quantity such as `"330 ml"` or `"1.5 kg"`, in kilograms.
/// Litres count as kilograms.
fn parse_weight_kg(value: &Value) -> Option<f64> {
    let text = match value {
        Value::String(s) => s.to_lowercase(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    let pattern = Regex::new(r"(\d+(?:[.,]\d+)?)\s*(kg|g|ml|cl|l)?").ok()?;
    let captures = pattern.captures(&text)?;
    let amount: f64 = captures.get(1)?.as_str().replace(',', ".").parse().ok()?;
    let grams = match captures.get(2).map(|m| m.as_str()) {
        Some("kg" | "l") => amount * 1000.0,
        Some("cl") => amount * 10.0,
        _ => amount,
    };

    (grams > 0.0).then(|| grams / 1000.0)
}

/// `"en:france, Germany"` -> `"france"`.
fn first_country(countries: &str) -> Option<String> {
    let first = countries.split(',').next()?.trim();
    let name = first.split_once(':').map_or(first, |(_, rest)| rest).trim();
    (!name.is_empty()).then(|| name.replace('-', " "))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    const NUTELLA: &str = r#"{
        "status": 1,
        "product": {
            "product_name": "Nutella",
            "brands": "Ferrero",
            "categories": "Breakfasts, Spreads, Sweet spreads",
            "packaging": "Glass jar, plastic lid",
            "countries": "en:italy,en:france",
            "quantity": "400 g"
        }
    }"#;

    #[tokio::test]
    async fn maps_a_found_product() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v0/product/3017620422003.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(NUTELLA)
            .create_async()
            .await;

        let resolver = OpenFoodFactsResolver::new(server.url()).unwrap();
        let product = resolver.resolve("3017620422003").await.unwrap();

        mock.assert_async().await;
        assert_eq!(product.name, "Nutella");
        assert_eq!(product.brand.as_deref(), Some("Ferrero"));
        assert_eq!(product.category, ProductCategory::Food);
        assert_eq!(product.materials, vec!["plastic".to_string(), "glass".to_string()]);
        assert_eq!(product.country_of_origin, "italy");
        assert_eq!(product.declared_weight_kg, Some(0.4));
        assert!(!product.verified);
    }

    #[tokio::test]
    async fn sparse_products_get_defaults() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/v0/product/5000000000001.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{ "status": 1, "product": { "categories": "Sodas" } }"#)
            .create_async()
            .await;

        let resolver = OpenFoodFactsResolver::new(server.url()).unwrap();
        let product = resolver.resolve("5000000000001").await.unwrap();

        assert_eq!(product.name, "Product 50000000...");
        assert_eq!(product.brand.as_deref(), Some("Unknown Brand"));
        assert_eq!(product.category, ProductCategory::Beverage);
        assert_eq!(product.materials, vec!["unknown".to_string()]);
        assert_eq!(product.country_of_origin, "Unknown");
        assert_eq!(product.declared_weight_kg, Some(DEFAULT_WEIGHT_KG));
    }

    #[tokio::test]
    async fn missing_products_are_not_found() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/v0/product/0000000000000.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{ "status": 0, "status_verbose": "product not found" }"#)
            .create_async()
            .await;

        let resolver = OpenFoodFactsResolver::new(server.url()).unwrap();
        assert!(matches!(
            resolver.resolve("0000000000000").await,
            Err(PortError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn server_errors_are_unexpected() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/v0/product/1111111111111.json")
            .with_status(503)
            .create_async()
            .await;

        let resolver = OpenFoodFactsResolver::new(server.url()).unwrap();
        assert!(matches!(
            resolver.resolve("1111111111111").await,
            Err(PortError::Unexpected(_))
        ));
    }

    #[tokio::test]
    async fn odd_barcodes_never_reach_the_network() {
        let resolver = OpenFoodFactsResolver::new("http://127.0.0.1:1").unwrap();
        assert!(matches!(resolver.resolve("../admin").await, Err(PortError::NotFound(_))));
        assert!(matches!(resolver.resolve("  ").await, Err(PortError::InvalidInput(_))));
    }

    #[test]
    fn categories_map_by_keyword() {
        assert_eq!(map_category("Plant-based foods and beverages"), ProductCategory::Beverage);
        assert_eq!(map_category("Mineral WATER"), ProductCategory::Beverage);
        assert_eq!(map_category("Snacks, Chips"), ProductCategory::Food);
        assert_eq!(map_category(""), ProductCategory::Food);
    }

    #[test]
    fn materials_follow_packaging_keywords() {
        assert_eq!(guess_materials_from_packaging("Can"), vec!["aluminum".to_string()]);
        assert_eq!(
            guess_materials_from_packaging("Cardboard box, plastic bottle"),
            vec!["plastic".to_string(), "cardboard".to_string()]
        );
        assert_eq!(guess_materials_from_packaging("paper bag"), vec!["unknown".to_string()]);
    }

    #[test]
    fn weights_are_read_in_kilograms() {
        assert_eq!(parse_weight_kg(&Value::from("330 ml")), Some(0.33));
        assert_eq!(parse_weight_kg(&Value::from("1,5 kg")), Some(1.5));
        assert_eq!(parse_weight_kg(&Value::from(250)), Some(0.25));
        assert_eq!(parse_weight_kg(&Value::from("a few")), None);
        assert_eq!(parse_weight_kg(&Value::Null), None);
    }
}
