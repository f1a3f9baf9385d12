//! # Collector Messages
//!
//! Requests sent from a [`CollectorClient`](crate::CollectorClient) to the
//! [`CollectorActor`](crate::CollectorActor). Each carries a one-shot channel the
//! actor answers on.

use crate::error::CollectorError;
use crate::filter::FilterSpec;
use crate::model::{ManagedObjectReference, RetrieveOptions, RetrieveResult, ServiceContent};
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by the service.
pub type Response<T> = oneshot::Sender<Result<T, CollectorError>>;

#[derive(Debug)]
pub enum CollectorRequest {
    ServiceContent {
        respond_to: Response<ServiceContent>,
    },
    Retrieve {
        collector: ManagedObjectReference,
        specs: Vec<FilterSpec>,
        options: RetrieveOptions,
        respond_to: Response<Option<RetrieveResult>>,
    },
    Continue {
        collector: ManagedObjectReference,
        token: String,
        respond_to: Response<Option<RetrieveResult>>,
    },
    Cancel {
        collector: ManagedObjectReference,
        token: String,
        respond_to: Response<()>,
    },
}
