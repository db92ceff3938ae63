pub mod rest;
pub mod state;

// Re-export the handlers to make them easily accessible
// to the binary that builds the web server router.
pub use rest::{analyze_product_handler, health_handler, root_handler, scan_product_handler};
