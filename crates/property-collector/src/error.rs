//! # Collector Errors
//!
//! This module defines the faults a property collector can signal and the error
//! returned by the pagination fetcher. Remote faults are carried verbatim; the
//! crate never translates one fault kind into another.

use crate::model::ObjectContent;

/// Faults signalled by a property collector, plus the transport failures of the
/// in-process service channel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollectorError {
    /// Generic server-side failure (invalid handle, stale token, malformed spec).
    #[error("Runtime fault: {0}")]
    RuntimeFault(String),

    /// A requested type name or property path is not recognized by the service.
    #[error("Invalid property: {name}")]
    InvalidProperty { name: String },

    #[error("Collector service closed")]
    ServiceClosed,

    #[error("Collector service dropped response channel")]
    ServiceDropped,
}

impl CollectorError {
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::RuntimeFault(message.into())
    }

    pub fn invalid_property(name: impl Into<String>) -> Self {
        Self::InvalidProperty { name: name.into() }
    }
}

/// Error returned when pagination is aborted by a fault.
///
/// `partial` holds every object accumulated before the failing call, in page
/// arrival order. It is empty when the initial retrieval itself failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("retrieval aborted after {} objects: {fault}", partial.len())]
pub struct FetchError {
    #[source]
    pub fault: CollectorError,
    pub partial: Vec<ObjectContent>,
}

impl FetchError {
    /// Drops the partial result and returns the underlying fault.
    pub fn into_fault(self) -> CollectorError {
        self.fault
    }
}
