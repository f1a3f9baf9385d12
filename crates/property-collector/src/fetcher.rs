//! # Pagination Fetcher
//!
//! Runs a retrieval to completion: one initial call, then continuation calls
//! while the service hands back a non-empty token. Pages are concatenated in
//! arrival order. Nothing is deduplicated or retried.

use crate::collector::PropertyCollector;
use crate::error::FetchError;
use crate::filter::FilterSpec;
use crate::model::{ManagedObjectReference, ObjectContent, RetrieveOptions, RetrieveResult};
use tracing::{debug, info, instrument, warn};

/// Retrieves every object matched by `specs`, following continuation tokens.
///
/// Pagination ends at the first page without a token (absent or empty) and on a
/// null page. An empty page that still carries a token does not end it.
///
/// On a fault the error carries the fault unchanged plus the objects gathered
/// before it.
#[instrument(skip_all, fields(collector = %collector, specs = specs.len()))]
pub async fn retrieve_all_objects<C>(
    port: &C,
    collector: &ManagedObjectReference,
    specs: &[FilterSpec],
    options: &RetrieveOptions,
) -> Result<Vec<ObjectContent>, FetchError>
where
    C: PropertyCollector + ?Sized,
{
    let mut objects = Vec::new();

    let first = match port.retrieve_properties(collector, specs, options).await {
        Ok(page) => page,
        Err(fault) => {
            warn!(error = %fault, "Initial retrieval failed");
            return Err(FetchError {
                fault,
                partial: objects,
            });
        }
    };
    let mut token = absorb(&mut objects, first, 0);
    let mut page = 0;

    while let Some(current) = token {
        page += 1;
        match port.continue_retrieve(collector, &current).await {
            Ok(next) => token = absorb(&mut objects, next, page),
            Err(fault) => {
                warn!(page, error = %fault, collected = objects.len(), "Continuation failed");
                return Err(FetchError {
                    fault,
                    partial: objects,
                });
            }
        }
    }

    info!(pages = page + 1, total = objects.len(), "Retrieval complete");
    Ok(objects)
}

/// Appends a page's objects and returns its continuation token, if any.
fn absorb(
    objects: &mut Vec<ObjectContent>,
    page: Option<RetrieveResult>,
    index: usize,
) -> Option<String> {
    let Some(page) = page else {
        debug!(page = index, "Null page");
        return None;
    };
    let token = page.continuation().map(str::to_owned);
    debug!(page = index, count = page.objects.len(), more = token.is_some(), "Page received");
    objects.extend(page.objects);
    token
}
