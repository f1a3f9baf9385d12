//! # PropertyCollector Trait
//!
//! The two remote operations the fetcher depends on. Any transport (the
//! in-process [`CollectorClient`](crate::CollectorClient), a SOAP binding, the
//! [`MockCollector`](crate::mock::MockCollector)) plugs in by implementing this trait.
//!
//! Both operations take the collector handle explicitly. The handle names a
//! stateful server-side cursor owner, so one handle must not be shared by
//! concurrent traversals.

use crate::error::CollectorError;
use crate::filter::FilterSpec;
use crate::model::{ManagedObjectReference, RetrieveOptions, RetrieveResult};
use async_trait::async_trait;

#[async_trait]
pub trait PropertyCollector: Send + Sync {
    /// Starts a retrieval. `Ok(None)` means the service returned no result at all.
    async fn retrieve_properties(
        &self,
        collector: &ManagedObjectReference,
        specs: &[FilterSpec],
        options: &RetrieveOptions,
    ) -> Result<Option<RetrieveResult>, CollectorError>;

    /// Resumes a retrieval from a continuation token.
    async fn continue_retrieve(
        &self,
        collector: &ManagedObjectReference,
        token: &str,
    ) -> Result<Option<RetrieveResult>, CollectorError>;
}
