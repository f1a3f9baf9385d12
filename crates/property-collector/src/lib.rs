//! # Property Collector
//!
//! Inventory traversal and paginated retrieval against a property collector.
//!
//! A property collector is a stateful query endpoint: you hand it a filter (where
//! to start, how to walk, what to report) and it returns matching objects one page
//! at a time, with a continuation token while more remain.
//!
//! ## Architecture Overview
//!
//! 1. **Query Layer** ([`traversal`], [`filter`]) - builds the rule graph and the
//!    filter that wraps it. [`inventory_filter`] produces the walk that reaches
//!    every managed entity under a root folder.
//! 2. **Capability Layer** ([`PropertyCollector`]) - the two remote operations,
//!    `retrieve_properties` and `continue_retrieve`. Transports implement it.
//! 3. **Fetch Layer** ([`retrieve_all_objects`]) - drives a collector until the
//!    token runs out and concatenates the pages.
//!
//! The crate also ships an in-process collector service ([`CollectorActor`] and
//! [`CollectorClient`]) over an in-memory [`inventory`], and a scripted
//! [`mock::MockCollector`] for tests.
//!
//! ## Example
//!
//! ```rust
//! use property_collector::inventory::Inventory;
//! use property_collector::{inventory_filter, retrieve_all_objects, CollectorActor, RetrieveOptions};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut inventory = Inventory::new();
//!     let root = inventory.root().clone();
//!     inventory.add_datacenter(&root, "dc1").unwrap();
//!
//!     let (actor, client) = CollectorActor::new(inventory, 16);
//!     tokio::spawn(actor.run());
//!
//!     let content = client.service_content().await.unwrap();
//!     let spec = inventory_filter(content.root_folder.clone());
//!     let objects = retrieve_all_objects(
//!         &client,
//!         &content.property_collector,
//!         &[spec],
//!         &RetrieveOptions::with_max_objects(2),
//!     )
//!     .await
//!     .unwrap();
//!
//!     // root folder, datacenter, host folder, vm folder
//!     assert_eq!(objects.len(), 4);
//! }
//! ```
//!
//! ## Concurrency Model
//!
//! Pagination is strictly sequential: page N+1 is requested only once page N's
//! token is known. The collector handle is passed to every call instead of living
//! in shared state, so independent traversals can run side by side as long as
//! each uses its own handle.
//!
//! ## Errors
//!
//! Remote faults ([`CollectorError`]) are never retried or translated. When
//! pagination fails midway, [`FetchError`] carries the fault and the objects
//! gathered before it.

pub mod actor;
pub mod client;
pub mod collector;
pub mod error;
pub mod fetcher;
pub mod filter;
pub mod inventory;
pub mod message;
pub mod mock;
pub mod model;
pub mod tracing;
pub mod traversal;

// Re-export core types for convenience
pub use actor::CollectorActor;
pub use client::CollectorClient;
pub use collector::PropertyCollector;
pub use error::{CollectorError, FetchError};
pub use fetcher::retrieve_all_objects;
pub use filter::{inventory_filter, FilterSpec, PropertySelection};
pub use message::{CollectorRequest, Response};
pub use model::{
    DynamicProperty, EntityKind, ManagedObjectReference, ObjectContent, PropertyValue,
    RetrieveOptions, RetrieveResult, ServiceContent,
};
pub use traversal::{RuleId, RuleSet, TraversalRule};
