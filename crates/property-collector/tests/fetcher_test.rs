use property_collector::mock::{Call, MockCollector};
use property_collector::{
    inventory_filter, retrieve_all_objects, CollectorError, DynamicProperty, ManagedObjectReference,
    ObjectContent, PropertyValue, RetrieveOptions,
};

fn pc() -> ManagedObjectReference {
    ManagedObjectReference::new("PropertyCollector", "propertyCollector")
}

fn vm(id: u32) -> ObjectContent {
    ObjectContent::new(
        ManagedObjectReference::new("VirtualMachine", format!("vm-{id}")),
        vec![DynamicProperty::new("name", PropertyValue::Text(format!("vm{id}")))],
    )
}

fn spec() -> property_collector::FilterSpec {
    inventory_filter(ManagedObjectReference::new("Folder", "group-d1"))
}

#[tokio::test]
async fn test_concatenates_pages_until_empty_token() {
    let mock = MockCollector::new();
    mock.expect_retrieve().return_page(vec![vm(1), vm(2)], Some("t1"));
    mock.expect_continue("t1").return_page(vec![vm(3)], Some("t2"));
    mock.expect_continue("t2").return_page(vec![vm(4), vm(5)], Some(""));

    let objects = retrieve_all_objects(&mock, &pc(), &[spec()], &RetrieveOptions::with_max_objects(2))
        .await
        .unwrap();

    assert_eq!(objects, vec![vm(1), vm(2), vm(3), vm(4), vm(5)]);
    assert_eq!(mock.call_count(), 3);
    assert_eq!(
        mock.calls(),
        vec![
            Call::Retrieve {
                specs: 1,
                options: RetrieveOptions::with_max_objects(2)
            },
            Call::Continue { token: "t1".into() },
            Call::Continue { token: "t2".into() },
        ]
    );
    mock.verify();
}

#[tokio::test]
async fn test_single_page_without_token_makes_one_call() {
    let mock = MockCollector::new();
    mock.expect_retrieve().return_page(vec![vm(1), vm(2)], None);

    let objects = retrieve_all_objects(&mock, &pc(), &[spec()], &RetrieveOptions::default())
        .await
        .unwrap();

    assert_eq!(objects, vec![vm(1), vm(2)]);
    assert_eq!(mock.call_count(), 1);
    mock.verify();
}

#[tokio::test]
async fn test_empty_page_with_token_keeps_paginating() {
    let mock = MockCollector::new();
    mock.expect_retrieve().return_page(vec![], Some("t1"));
    mock.expect_continue("t1").return_page(vec![], Some("t2"));
    mock.expect_continue("t2").return_page(vec![vm(9)], None);

    let objects = retrieve_all_objects(&mock, &pc(), &[spec()], &RetrieveOptions::default())
        .await
        .unwrap();

    assert_eq!(objects, vec![vm(9)]);
    assert_eq!(mock.call_count(), 3);
    mock.verify();
}

#[tokio::test]
async fn test_null_results_end_pagination_quietly() {
    let mock = MockCollector::new();
    mock.expect_retrieve().return_null();

    let objects = retrieve_all_objects(&mock, &pc(), &[spec()], &RetrieveOptions::default())
        .await
        .unwrap();
    assert!(objects.is_empty());
    mock.verify();

    let mock = MockCollector::new();
    mock.expect_retrieve().return_page(vec![vm(1)], Some("t1"));
    mock.expect_continue("t1").return_null();

    let objects = retrieve_all_objects(&mock, &pc(), &[spec()], &RetrieveOptions::default())
        .await
        .unwrap();
    assert_eq!(objects, vec![vm(1)]);
    assert_eq!(mock.call_count(), 2);
    mock.verify();
}

#[tokio::test]
async fn test_initial_fault_propagates_unchanged() {
    let mock = MockCollector::new();
    mock.expect_retrieve()
        .return_err(CollectorError::invalid_property("nmae"));

    let err = retrieve_all_objects(&mock, &pc(), &[spec()], &RetrieveOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.fault, CollectorError::invalid_property("nmae"));
    assert!(err.partial.is_empty());
    assert_eq!(mock.call_count(), 1);
    mock.verify();
}

#[tokio::test]
async fn test_mid_pagination_fault_keeps_partial_result() {
    let mock = MockCollector::new();
    mock.expect_retrieve().return_page(vec![vm(1)], Some("t1"));
    mock.expect_continue("t1").return_page(vec![vm(2)], Some("t2"));
    mock.expect_continue("t2")
        .return_err(CollectorError::runtime("token expired"));

    let err = retrieve_all_objects(&mock, &pc(), &[spec()], &RetrieveOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err.fault, CollectorError::RuntimeFault(ref msg) if msg == "token expired"));
    assert_eq!(err.partial, vec![vm(1), vm(2)]);
    assert_eq!(err.clone().into_fault(), CollectorError::runtime("token expired"));
    mock.verify();
}

#[tokio::test]
async fn test_duplicates_across_pages_are_kept() {
    let mock = MockCollector::new();
    mock.expect_retrieve().return_page(vec![vm(1)], Some("t1"));
    mock.expect_continue("t1").return_page(vec![vm(1)], None);

    let objects = retrieve_all_objects(&mock, &pc(), &[spec()], &RetrieveOptions::default())
        .await
        .unwrap();

    assert_eq!(objects, vec![vm(1), vm(1)]);
}
