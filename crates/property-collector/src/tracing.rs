//! # Observability
//!
//! Structured logging for the collector, its clients and the fetcher.
//!
//! Every component logs through `tracing` with fields rather than formatted
//! strings, so pages, tokens and faults can be filtered on:
//!
//! ```text
//! DEBUG retrieve_all_objects{collector=PropertyCollector:propertyCollector specs=1}: page=0 count=25 more=true Page received
//! DEBUG retrieve_all_objects{collector=PropertyCollector:propertyCollector specs=1}: page=1 count=7 more=false Page received
//!  INFO retrieve_all_objects{collector=PropertyCollector:propertyCollector specs=1}: pages=2 total=32 Retrieval complete
//! ```

/// Initializes the tracing subscriber for the application.
///
/// Filtering comes from the `RUST_LOG` environment variable:
/// - `RUST_LOG=info` - Retrieval summaries and service lifecycle
/// - `RUST_LOG=debug` - One event per page and per request
/// - `RUST_LOG=property_collector=debug` - Debug only for this crate
///
/// # Example
///
/// ```ignore
/// setup_tracing();
/// tracing::info!("Application started");
/// ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}
