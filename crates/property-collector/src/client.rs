//! # Collector Client
//!
//! The cloneable, channel-backed handle to a [`CollectorActor`](crate::CollectorActor).
//! It implements [`PropertyCollector`] so the fetcher can drive it like any
//! remote collector.

use crate::collector::PropertyCollector;
use crate::error::CollectorError;
use crate::filter::FilterSpec;
use crate::message::CollectorRequest;
use crate::model::{ManagedObjectReference, RetrieveOptions, RetrieveResult, ServiceContent};
use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct CollectorClient {
    sender: mpsc::Sender<CollectorRequest>,
}

impl CollectorClient {
    pub fn new(sender: mpsc::Sender<CollectorRequest>) -> Self {
        Self { sender }
    }

    /// Fetches the root folder and property collector handles of the session.
    pub async fn service_content(&self) -> Result<ServiceContent, CollectorError> {
        let (respond_to, response) = oneshot::channel();
        self.send(CollectorRequest::ServiceContent { respond_to }).await?;
        response.await.map_err(|_| CollectorError::ServiceDropped)?
    }

    /// Discards the remaining pages of a retrieval.
    #[instrument(skip(self))]
    pub async fn cancel_retrieve(
        &self,
        collector: &ManagedObjectReference,
        token: &str,
    ) -> Result<(), CollectorError> {
        debug!("Sending request");
        let (respond_to, response) = oneshot::channel();
        self.send(CollectorRequest::Cancel {
            collector: collector.clone(),
            token: token.to_string(),
            respond_to,
        })
        .await?;
        response.await.map_err(|_| CollectorError::ServiceDropped)?
    }

    async fn send(&self, request: CollectorRequest) -> Result<(), CollectorError> {
        self.sender
            .send(request)
            .await
            .map_err(|_| CollectorError::ServiceClosed)
    }
}

#[async_trait]
impl PropertyCollector for CollectorClient {
    #[instrument(skip(self, specs), fields(specs = specs.len()))]
    async fn retrieve_properties(
        &self,
        collector: &ManagedObjectReference,
        specs: &[FilterSpec],
        options: &RetrieveOptions,
    ) -> Result<Option<RetrieveResult>, CollectorError> {
        debug!("Sending request");
        let (respond_to, response) = oneshot::channel();
        self.send(CollectorRequest::Retrieve {
            collector: collector.clone(),
            specs: specs.to_vec(),
            options: *options,
            respond_to,
        })
        .await?;
        response.await.map_err(|_| CollectorError::ServiceDropped)?
    }

    #[instrument(skip(self))]
    async fn continue_retrieve(
        &self,
        collector: &ManagedObjectReference,
        token: &str,
    ) -> Result<Option<RetrieveResult>, CollectorError> {
        debug!("Sending request");
        let (respond_to, response) = oneshot::channel();
        self.send(CollectorRequest::Continue {
            collector: collector.clone(),
            token: token.to_string(),
            respond_to,
        })
        .await?;
        response.await.map_err(|_| CollectorError::ServiceDropped)?
    }
}
