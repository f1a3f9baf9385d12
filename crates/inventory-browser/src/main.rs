//! # Inventory Browser
//!
//! Starts an in-process property collector over the demo inventory, walks it
//! from the root folder and prints every managed entity with its name.
//!
//! ```bash
//! RUST_LOG=info cargo run
//! INVENTORY_PAGE_SIZE=5 INVENTORY_OUTPUT=json RUST_LOG=debug cargo run
//! ```

use inventory_browser::config::{BrowserConfig, OutputFormat};
use inventory_browser::demo::sample_inventory;
use inventory_browser::lifecycle::InventorySession;
use inventory_browser::render::{render_json, TextReport};
use inventory_browser::BrowserError;
use property_collector::tracing::setup_tracing;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), BrowserError> {
    setup_tracing();

    let config = BrowserConfig::from_env()?;
    info!(?config, "Starting inventory browser");

    let session = InventorySession::start(sample_inventory()?, &config).await?;

    let listing = session.list_inventory().await;
    session.shutdown().await?;

    let objects = match listing {
        Ok(objects) => objects,
        Err(e) => {
            error!(error = %e, partial = e.partial.len(), "Inventory listing failed");
            return Err(e.into());
        }
    };

    match config.output {
        OutputFormat::Text => print!("{}", TextReport(&objects)),
        OutputFormat::Json => println!("{}", render_json(&objects)?),
    }

    info!(count = objects.len(), "Done");
    Ok(())
}
