//! crates/carbonscope_core/src/domain.rs
//!
//! Defines the pure value objects exchanged with the estimation core.
//! These structs are independent of any transport or serialization format.

//=========================================================================================
// Product Input
//=========================================================================================

/// The coarse product family that selects the base emission factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductCategory {
    Electronics,
    Beverage,
    Food,
    Apparel,
    Other,
}

impl ProductCategory {
    pub const ALL: [ProductCategory; 5] = [
        ProductCategory::Electronics,
        ProductCategory::Beverage,
        ProductCategory::Food,
        ProductCategory::Apparel,
        ProductCategory::Other,
    ];

    /// Parses a free-form category tag. Anything unrecognised becomes `Other`.
    pub fn parse(raw: &str) -> Self {
        match normalize_tag(raw).as_str() {
            "electronics" | "electronic" | "device" | "devices" => Self::Electronics,
            "beverage" | "beverages" | "drink" | "drinks" => Self::Beverage,
            "food" | "foods" | "grocery" | "produce" => Self::Food,
            "apparel" | "clothing" | "clothes" | "fashion" => Self::Apparel,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Electronics => "electronics",
            Self::Beverage => "beverage",
            Self::Food => "food",
            Self::Apparel => "apparel",
            Self::Other => "other",
        }
    }
}

/// Product metadata as handed over by a `ProductResolver`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDescriptor {
    pub barcode: String,
    pub name: String,
    pub brand: Option<String>,
    pub category: ProductCategory,
    /// Ordered material tags, e.g. `aluminum`, `plastic_PET`.
    pub materials: Vec<String>,
    pub country_of_origin: String,
    pub declared_weight_kg: Option<f64>,
    /// Set when the resolver's data has been checked against a trusted source.
    pub verified: bool,
}

impl ProductDescriptor {
    pub fn new(barcode: impl Into<String>, name: impl Into<String>, category: ProductCategory) -> Self {
        Self {
            barcode: barcode.into(),
            name: name.into(),
            brand: None,
            category,
            materials: Vec::new(),
            country_of_origin: String::new(),
            declared_weight_kg: None,
            verified: false,
        }
    }

    pub fn with_materials<I, S>(mut self, materials: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.materials = materials.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_origin(mut self, country: impl Into<String>) -> Self {
        self.country_of_origin = country.into();
        self
    }

    pub fn with_verified(mut self, verified: bool) -> Self {
        self.verified = verified;
        self
    }
}

/// How the product reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PurchaseChannel {
    RetailStore,
    Online,
    ExpressShipping,
    SameDayDelivery,
    OvernightShipping,
    BulkPurchase,
    Subscription,
    #[default]
    Unknown,
}

impl PurchaseChannel {
    /// Parses a purchase context tag; missing or unrecognised tags become `Unknown`.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::Unknown;
        };
        match normalize_tag(raw).as_str() {
            "retail_store" | "retail" | "in_store" | "grocery_store" => Self::RetailStore,
            "online" => Self::Online,
            "express_shipping" | "express" => Self::ExpressShipping,
            "same_day_delivery" | "same_day" => Self::SameDayDelivery,
            "overnight_shipping" | "overnight" => Self::OvernightShipping,
            "bulk_purchase" | "bulk" => Self::BulkPurchase,
            "subscription" => Self::Subscription,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RetailStore => "retail_store",
            Self::Online => "online",
            Self::ExpressShipping => "express_shipping",
            Self::SameDayDelivery => "same_day_delivery",
            Self::OvernightShipping => "overnight_shipping",
            Self::BulkPurchase => "bulk_purchase",
            Self::Subscription => "subscription",
            Self::Unknown => "unknown",
        }
    }
}

/// The circumstances of a single purchase.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PurchaseContext {
    pub channel: PurchaseChannel,
    /// Informational only; never feeds the calculation.
    pub user_location: Option<String>,
    /// Calendar month (1-12) used for the seasonal transport factor.
    pub month: Option<u32>,
}

impl PurchaseContext {
    pub fn new(channel: PurchaseChannel) -> Self {
        Self {
            channel,
            ..Default::default()
        }
    }
}

//=========================================================================================
// Estimation Output
//=========================================================================================

/// Coarse bucket derived from the total footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpactLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl ImpactLevel {
    pub fn classify(total_co2_kg: f64) -> Self {
        if total_co2_kg < 1.0 {
            Self::Low
        } else if total_co2_kg < 5.0 {
            Self::Medium
        } else if total_co2_kg < 20.0 {
            Self::High
        } else {
            Self::VeryHigh
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::VeryHigh => "very_high",
        }
    }
}

/// The multipliers that went into an estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedFactors {
    pub origin_multiplier: f64,
    pub seasonal_multiplier: f64,
    pub context_multiplier: f64,
    /// Mean material weight, or `None` when production used the category base alone.
    pub material_weight: Option<f64>,
    pub packaging_weight: f64,
    pub verified_data: bool,
}

/// A carbon footprint broken down by life-cycle phase, in kg CO2e.
#[derive(Debug, Clone, PartialEq)]
pub struct CarbonEstimate {
    pub production_co2_kg: f64,
    pub transport_co2_kg: f64,
    pub packaging_co2_kg: f64,
    /// Only present for electronics.
    pub usage_co2_kg: Option<f64>,
    pub total_co2_kg: f64,
    pub confidence_score: f64,
    pub impact_level: ImpactLevel,
    pub methodology: String,
    pub factors: AppliedFactors,
}

impl CarbonEstimate {
    /// Builds an estimate whose total and impact level are derived from the components.
    pub fn from_components(
        production_co2_kg: f64,
        transport_co2_kg: f64,
        packaging_co2_kg: f64,
        usage_co2_kg: Option<f64>,
        confidence_score: f64,
        methodology: impl Into<String>,
        factors: AppliedFactors,
    ) -> Self {
        let total_co2_kg =
            production_co2_kg + transport_co2_kg + packaging_co2_kg + usage_co2_kg.unwrap_or(0.0);
        Self {
            production_co2_kg,
            transport_co2_kg,
            packaging_co2_kg,
            usage_co2_kg,
            total_co2_kg,
            confidence_score: clamp_unit(confidence_score),
            impact_level: ImpactLevel::classify(total_co2_kg),
            methodology: methodology.into(),
            factors,
        }
    }

    /// The two-decimal view handed to clients.
    ///
    /// Components are rounded first and the total is re-derived from them, so the
    /// presented parts always add up to the presented total.
    pub fn presented(&self) -> Self {
        let production = round2(self.production_co2_kg);
        let transport = round2(self.transport_co2_kg);
        let packaging = round2(self.packaging_co2_kg);
        let usage = self.usage_co2_kg.map(round2);
        let total = round2(production + transport + packaging + usage.unwrap_or(0.0));

        Self {
            production_co2_kg: production,
            transport_co2_kg: transport,
            packaging_co2_kg: packaging,
            usage_co2_kg: usage,
            total_co2_kg: total,
            confidence_score: clamp_unit(round2(self.confidence_score)),
            impact_level: ImpactLevel::classify(total),
            methodology: self.methodology.clone(),
            factors: self.factors.clone(),
        }
    }
}

/// A lower-carbon substitute for the analysed product.
#[derive(Debug, Clone, PartialEq)]
pub struct Alternative {
    pub name: String,
    pub co2_kg: f64,
    /// Fraction of the original footprint saved, in (0, 1].
    pub co2_reduction: f64,
    pub savings_kg: f64,
    pub reason: String,
    pub availability: Option<String>,
}

/// The complete result for one product and purchase.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductAnalysis {
    pub estimate: CarbonEstimate,
    pub alternatives: Vec<Alternative>,
}

//=========================================================================================
// Helpers
//=========================================================================================

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Canonical form of a lookup key: trimmed, lowercase, `_` for spaces and hyphens.
pub fn normalize_tag(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factors() -> AppliedFactors {
        AppliedFactors {
            origin_multiplier: 1.0,
            seasonal_multiplier: 1.0,
            context_multiplier: 1.0,
            material_weight: None,
            packaging_weight: 1.0,
            verified_data: false,
        }
    }

    #[test]
    fn category_parsing_accepts_legacy_tags() {
        assert_eq!(ProductCategory::parse("beverages"), ProductCategory::Beverage);
        assert_eq!(ProductCategory::parse(" Clothing "), ProductCategory::Apparel);
        assert_eq!(ProductCategory::parse("ELECTRONICS"), ProductCategory::Electronics);
        assert_eq!(ProductCategory::parse("general"), ProductCategory::Other);
        assert_eq!(ProductCategory::parse(""), ProductCategory::Other);
    }

    #[test]
    fn channel_parsing_falls_back_to_unknown() {
        assert_eq!(PurchaseChannel::parse(Some("same-day delivery")), PurchaseChannel::SameDayDelivery);
        assert_eq!(PurchaseChannel::parse(Some("Online")), PurchaseChannel::Online);
        assert_eq!(PurchaseChannel::parse(Some("teleport")), PurchaseChannel::Unknown);
        assert_eq!(PurchaseChannel::parse(None), PurchaseChannel::Unknown);
    }

    #[test]
    fn impact_thresholds() {
        assert_eq!(ImpactLevel::classify(0.0), ImpactLevel::Low);
        assert_eq!(ImpactLevel::classify(0.99), ImpactLevel::Low);
        assert_eq!(ImpactLevel::classify(1.0), ImpactLevel::Medium);
        assert_eq!(ImpactLevel::classify(4.99), ImpactLevel::Medium);
        assert_eq!(ImpactLevel::classify(5.0), ImpactLevel::High);
        assert_eq!(ImpactLevel::classify(19.99), ImpactLevel::High);
        assert_eq!(ImpactLevel::classify(20.0), ImpactLevel::VeryHigh);
    }

    #[test]
    fn total_is_sum_of_components() {
        let estimate = CarbonEstimate::from_components(1.234, 0.5, 0.111, Some(2.0), 0.7, "test", factors());
        assert_eq!(
            estimate.total_co2_kg,
            estimate.production_co2_kg
                + estimate.transport_co2_kg
                + estimate.packaging_co2_kg
                + estimate.usage_co2_kg.unwrap_or(0.0)
        );
        assert_eq!(estimate.impact_level, ImpactLevel::Medium);
    }

    #[test]
    fn presented_total_matches_rounded_parts() {
        let estimate = CarbonEstimate::from_components(0.335, 0.335, 0.335, None, 0.8000000000000002, "test", factors());
        let shown = estimate.presented();
        let parts = shown.production_co2_kg + shown.transport_co2_kg + shown.packaging_co2_kg;
        assert!((shown.total_co2_kg - parts).abs() < 1e-9);
        assert_eq!(shown.confidence_score, 0.8);
        assert_eq!(shown.impact_level, ImpactLevel::classify(shown.total_co2_kg));
    }

    #[test]
    fn confidence_is_clamped() {
        let high = CarbonEstimate::from_components(1.0, 0.0, 0.0, None, 1.7, "test", factors());
        let low = CarbonEstimate::from_components(1.0, 0.0, 0.0, None, -0.3, "test", factors());
        assert_eq!(high.confidence_score, 1.0);
        assert_eq!(low.confidence_score, 0.0);
    }
}
