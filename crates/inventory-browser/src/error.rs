//! Error types for the inventory browser.

use property_collector::inventory::InventoryError;
use property_collector::{CollectorError, FetchError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrowserError {
    /// A configuration value could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Inventory setup failed: {0}")]
    Inventory(#[from] InventoryError),

    #[error("Collector error: {0}")]
    Collector(#[from] CollectorError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Rendering failed: {0}")]
    Render(#[from] serde_json::Error),

    #[error("Collector task failed: {0}")]
    Shutdown(String),
}
