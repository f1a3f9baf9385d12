//! # Mock Collector & Testing Guide
//!
//! `MockCollector` implements [`PropertyCollector`] from a script of expected
//! calls. It lets you test code that drives a collector (the fetcher, or your own
//! wrappers) without a service, and makes faults trivial to inject.
//!
//! ## When to use the Mock vs the In-Process Service
//!
//! | Feature | MockCollector | CollectorActor |
//! |---------|---------------|----------------|
//! | **Pages** | Exactly what you script | Computed from an inventory |
//! | **Faults** | Any fault, at any call | Only what a bad filter triggers |
//! | **Call log** | Recorded for assertions | Not recorded |
//! | **Use Case** | Pagination and error paths | Traversal semantics end to end |
//!
//! ## Example
//!
//! ```rust
//! use property_collector::mock::{Call, MockCollector};
//! use property_collector::{retrieve_all_objects, CollectorError, ManagedObjectReference, RetrieveOptions};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mock = MockCollector::new();
//!     mock.expect_retrieve().return_page(vec![], Some("t1"));
//!     mock.expect_continue("t1").return_err(CollectorError::runtime("session expired"));
//!
//!     let pc = ManagedObjectReference::new("PropertyCollector", "propertyCollector");
//!     let err = retrieve_all_objects(&mock, &pc, &[], &RetrieveOptions::default())
//!         .await
//!         .unwrap_err();
//!
//!     assert!(matches!(err.fault, CollectorError::RuntimeFault(_)));
//!     assert_eq!(mock.calls().last(), Some(&Call::Continue { token: "t1".into() }));
//!     mock.verify();
//! }
//! ```

use crate::collector::PropertyCollector;
use crate::error::CollectorError;
use crate::filter::FilterSpec;
use crate::model::{ManagedObjectReference, ObjectContent, RetrieveOptions, RetrieveResult};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

type Reply = Result<Option<RetrieveResult>, CollectorError>;

/// An expected call and the reply to give it.
enum Expectation {
    Retrieve { reply: Reply },
    Continue { token: String, reply: Reply },
}

/// A call the mock received.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Retrieve {
        specs: usize,
        options: RetrieveOptions,
    },
    Continue {
        token: String,
    },
}

/// A scripted [`PropertyCollector`].
///
/// Expectations are consumed in order. A call that does not match the next
/// expectation panics, failing the test at the offending call.
#[derive(Clone, Default)]
pub struct MockCollector {
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl MockCollector {
    /// Creates a new mock with no expectations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects a `retrieve_properties` call.
    pub fn expect_retrieve(&self) -> ReplyBuilder {
        ReplyBuilder {
            token: None,
            expectations: self.expectations.clone(),
        }
    }

    /// Expects a `continue_retrieve` call with exactly `token`.
    pub fn expect_continue(&self, token: impl Into<String>) -> ReplyBuilder {
        ReplyBuilder {
            token: Some(token.into()),
            expectations: self.expectations.clone(),
        }
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            panic!("Not all expectations were met. {} remaining", exps.len());
        }
    }

    fn next(&self, call: Call) -> Reply {
        self.calls.lock().unwrap().push(call.clone());
        let expectation = self.expectations.lock().unwrap().pop_front();

        match (call, expectation) {
            (Call::Retrieve { .. }, Some(Expectation::Retrieve { reply })) => reply,
            (Call::Continue { token }, Some(Expectation::Continue { token: expected, reply })) => {
                assert_eq!(token, expected, "continuation token mismatch");
                reply
            }
            (call, _) => panic!("Unexpected call or expectation mismatch: {call:?}"),
        }
    }
}

#[async_trait]
impl PropertyCollector for MockCollector {
    async fn retrieve_properties(
        &self,
        _collector: &ManagedObjectReference,
        specs: &[FilterSpec],
        options: &RetrieveOptions,
    ) -> Result<Option<RetrieveResult>, CollectorError> {
        self.next(Call::Retrieve {
            specs: specs.len(),
            options: *options,
        })
    }

    async fn continue_retrieve(
        &self,
        _collector: &ManagedObjectReference,
        token: &str,
    ) -> Result<Option<RetrieveResult>, CollectorError> {
        self.next(Call::Continue {
            token: token.to_string(),
        })
    }
}

/// Builder for the reply to one expected call.
pub struct ReplyBuilder {
    token: Option<String>,
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
}

impl ReplyBuilder {
    /// Replies with a page of `objects` and an optional continuation token.
    pub fn return_page(self, objects: Vec<ObjectContent>, token: Option<&str>) {
        let page = RetrieveResult::new(objects, token.map(str::to_string));
        self.push(Ok(Some(page)));
    }

    /// Replies with a null result.
    pub fn return_null(self) {
        self.push(Ok(None));
    }

    /// Replies with a fault.
    pub fn return_err(self, error: CollectorError) {
        self.push(Err(error));
    }

    fn push(self, reply: Reply) {
        let expectation = match self.token {
            Some(token) => Expectation::Continue { token, reply },
            None => Expectation::Retrieve { reply },
        };
        self.expectations.lock().unwrap().push_back(expectation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pc() -> ManagedObjectReference {
        ManagedObjectReference::new("PropertyCollector", "propertyCollector")
    }

    #[tokio::test]
    async fn replays_script_in_order() {
        let mock = MockCollector::new();
        mock.expect_retrieve().return_page(vec![], Some("t1"));
        mock.expect_continue("t1").return_null();

        let first = mock
            .retrieve_properties(&pc(), &[], &RetrieveOptions::with_max_objects(5))
            .await
            .unwrap();
        assert_eq!(first.and_then(|page| page.token), Some("t1".to_string()));
        assert_eq!(mock.continue_retrieve(&pc(), "t1").await, Ok(None));

        assert_eq!(
            mock.calls(),
            vec![
                Call::Retrieve {
                    specs: 0,
                    options: RetrieveOptions::with_max_objects(5)
                },
                Call::Continue { token: "t1".into() },
            ]
        );
        mock.verify();
    }

    #[tokio::test]
    #[should_panic(expected = "expectation mismatch")]
    async fn unexpected_call_panics() {
        let mock = MockCollector::new();
        mock.expect_retrieve().return_null();

        let _ = mock.continue_retrieve(&pc(), "t1").await;
    }

    #[test]
    #[should_panic(expected = "1 remaining")]
    fn verify_reports_unmet_expectations() {
        let mock = MockCollector::new();
        mock.expect_retrieve().return_null();
        mock.verify();
    }
}
