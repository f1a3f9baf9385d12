//! # Inventory Browser
//!
//! Lists the managed entities of an inventory through a property collector.
//!
//! - **[config]**: environment-driven settings (page size, output format).
//! - **[lifecycle]**: the [`InventorySession`](lifecycle::InventorySession) that starts
//!   the collector service and runs the inventory walk.
//! - **[render]**: text and JSON output of the flattened result.
//! - **[demo]**: the inventory the binary serves.

pub mod config;
pub mod demo;
pub mod error;
pub mod lifecycle;
pub mod render;

pub use error::BrowserError;
