//! services/api/src/adapters/catalog.rs
//!
//! An in-memory implementation of the `ProductResolver` port.
//!
//! It serves a small set of verified products. Any other barcode is passed to an
//! optional external resolver, and when that has nothing an unverified descriptor is
//! derived from the barcode's leading digit, so a scan always yields something to
//! estimate.

use async_trait::async_trait;
use carbonscope_core::domain::{ProductCategory, ProductDescriptor};
use carbonscope_core::ports::{PortError, PortResult, ProductResolver};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A product resolver backed by a fixed barcode table.
#[derive(Clone, Default)]
pub struct InMemoryProductCatalog {
    products: HashMap<String, ProductDescriptor>,
    external: Option<Arc<dyn ProductResolver>>,
}

impl InMemoryProductCatalog {
    /// Creates a new `InMemoryProductCatalog` from the given descriptors.
    pub fn new(products: impl IntoIterator<Item = ProductDescriptor>) -> Self {
        Self {
            products: products
                .into_iter()
                .map(|p| (p.barcode.clone(), p))
                .collect(),
            external: None,
        }
    }

    /// Consults `resolver` for barcodes missing from the table before falling back to
    /// the barcode prefix.
    pub fn with_external(mut self, resolver: Arc<dyn ProductResolver>) -> Self {
        self.external = Some(resolver);
        self
    }

    /// A catalog pre-loaded with the verified demo products.
    pub fn seeded() -> Self {
        Self::new([
            verified(
                "1234567890123",
                "Coca-Cola Classic 330ml Can",
                "Coca-Cola",
                ProductCategory::Beverage,
                &["aluminum"],
                "USA",
                0.375,
            ),
            verified(
                "0123456789012",
                "Coca-Cola Classic 330ml Can",
                "Coca-Cola",
                ProductCategory::Beverage,
                &["aluminum", "plastic"],
                "USA",
                0.375,
            ),
            verified(
                "7890123456789",
                "iPhone 15 Pro 128GB",
                "Apple",
                ProductCategory::Electronics,
                &["aluminum", "glass", "rare_earth_metals", "lithium"],
                "China",
                0.187,
            ),
            verified(
                "5432109876543",
                "Organic Bananas 1kg",
                "Local Farm",
                ProductCategory::Food,
                &["organic_matter", "plastic"],
                "Ecuador",
                1.0,
            ),
            verified(
                "9876543210987",
                "Samsung Galaxy S24 Ultra",
                "Samsung",
                ProductCategory::Electronics,
                &["aluminum", "glass", "rare_earth_metals", "lithium"],
                "South Korea",
                0.232,
            ),
            verified(
                "1122334455667",
                "Patagonia Better Sweater Jacket",
                "Patagonia",
                ProductCategory::Apparel,
                &["recycled_polyester", "polyester"],
                "Vietnam",
                0.68,
            ),
        ])
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

//=========================================================================================
// `ProductResolver` Trait Implementation
//=========================================================================================

#[async_trait]
impl ProductResolver for InMemoryProductCatalog {
    async fn resolve(&self, barcode: &str) -> PortResult<ProductDescriptor> {
        let barcode = barcode.trim();
        if barcode.is_empty() {
            return Err(PortError::InvalidInput("barcode must not be empty".to_string()));
        }

        if let Some(product) = self.products.get(barcode) {
            return Ok(product.clone());
        }

        if let Some(external) = &self.external {
            match external.resolve(barcode).await {
                Ok(product) => return Ok(product),
                Err(PortError::NotFound(_)) => debug!("External lookup has no product for {}", barcode),
                Err(e) => warn!("External lookup for {} failed: {}", barcode, e),
            }
        }

        debug!("Barcode {} not in catalog, deriving a product from its prefix", barcode);
        Ok(derive_from_barcode(barcode))
    }
}

//=========================================================================================
// Helpers
//=========================================================================================

fn verified(
    barcode: &str,
    name: &str,
    brand: &str,
    category: ProductCategory,
    materials: &[&str],
    origin: &str,
    weight_kg: f64,
) -> ProductDescriptor {
    ProductDescriptor {
        brand: Some(brand.to_string()),
        declared_weight_kg: Some(weight_kg),
        ..ProductDescriptor::new(barcode, name, category)
            .with_materials(materials.iter().copied())
            .with_origin(origin)
            .with_verified(true)
    }
}

/// Guesses a plausible, unverified product from the barcode's first digit.
fn derive_from_barcode(barcode: &str) -> ProductDescriptor {
    let category = match barcode.chars().next() {
        Some('0' | '2' | '5') => ProductCategory::Food,
        Some('1' | '6') => ProductCategory::Beverage,
        Some('3' | '7' | '9') => ProductCategory::Electronics,
        Some('4') => ProductCategory::Apparel,
        _ => ProductCategory::Other,
    };
    let prefix: String = barcode.chars().take(8).collect();

    let (label, materials, origin, weight_kg): (&str, &[&str], &str, f64) = match category {
        ProductCategory::Food => ("Food Product", &["cardboard", "plastic"][..], "USA", 0.25),
        ProductCategory::Beverage => ("Beverage", &["plastic", "aluminum"][..], "USA", 0.35),
        ProductCategory::Electronics => (
            "Electronic Device",
            &["plastic", "metal", "rare_earth_metals"][..],
            "China",
            0.2,
        ),
        ProductCategory::Apparel => ("Clothing Item", &["cotton", "polyester"][..], "Bangladesh", 0.3),
        // Unassigned prefixes reuse the food template but stay uncategorised.
        ProductCategory::Other => ("Food Product", &["cardboard", "plastic"][..], "USA", 0.25),
    };

    ProductDescriptor {
        brand: Some("Unknown Brand".to_string()),
        declared_weight_kg: Some(weight_kg),
        ..ProductDescriptor::new(barcode, format!("{} {}...", label, prefix), category)
            .with_materials(materials.iter().copied())
            .with_origin(origin)
    }
}
