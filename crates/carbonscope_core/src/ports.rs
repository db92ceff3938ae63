//! crates/carbonscope_core/src/ports.rs
//!
//! Defines the service contracts (traits) at the edge of the estimation core.
//! Product metadata comes from an external resolver; the core only consumes it.

use crate::domain::ProductDescriptor;
use async_trait::async_trait;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait ProductResolver: Send + Sync {
    /// Looks up product metadata for a barcode.
    async fn resolve(&self, barcode: &str) -> PortResult<ProductDescriptor>;
}
