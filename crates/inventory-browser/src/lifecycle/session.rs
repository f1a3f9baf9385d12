use crate::config::BrowserConfig;
use crate::error::BrowserError;
use property_collector::inventory::Inventory;
use property_collector::{
    inventory_filter, retrieve_all_objects, CollectorActor, CollectorClient, FetchError,
    ObjectContent, RetrieveOptions, ServiceContent,
};
use tracing::{info, instrument};

/// A connected session against an in-process collector.
///
/// The session carries its own collector handle and passes it to every call,
/// so two sessions never share cursor state.
pub struct InventorySession {
    /// Client for the collector service
    pub client: CollectorClient,

    /// Root folder and property collector handles
    pub content: ServiceContent,

    options: RetrieveOptions,

    /// Task handle of the running service (used for graceful shutdown)
    handle: tokio::task::JoinHandle<()>,
}

impl InventorySession {
    /// Spawns the collector over `inventory` and fetches the service content.
    pub async fn start(inventory: Inventory, config: &BrowserConfig) -> Result<Self, BrowserError> {
        let (actor, client) = CollectorActor::new(inventory, config.service_buffer);
        let handle = tokio::spawn(actor.run());

        let content = client.service_content().await?;
        info!(root = %content.root_folder, collector = %content.property_collector, "Session started");

        Ok(Self {
            client,
            content,
            options: config.retrieve_options(),
            handle,
        })
    }

    /// Lists every managed entity below the root folder.
    #[instrument(skip(self))]
    pub async fn list_inventory(&self) -> Result<Vec<ObjectContent>, FetchError> {
        let spec = inventory_filter(self.content.root_folder.clone());
        retrieve_all_objects(
            &self.client,
            &self.content.property_collector,
            &[spec],
            &self.options,
        )
        .await
    }

    /// Stops the collector and waits for it to exit.
    pub async fn shutdown(self) -> Result<(), BrowserError> {
        info!("Shutting down session");
        drop(self.client);
        self.handle
            .await
            .map_err(|e| BrowserError::Shutdown(e.to_string()))
    }
}
