pub mod catalog;
pub mod factors_file;
pub mod openfoodfacts;

pub use catalog::InMemoryProductCatalog;
pub use factors_file::{load_factors, FactorOverrides};
pub use openfoodfacts::OpenFoodFactsResolver;
