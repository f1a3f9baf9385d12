use inventory_browser::config::BrowserConfig;
use inventory_browser::demo::sample_inventory;
use inventory_browser::lifecycle::InventorySession;
use inventory_browser::render::render_text;
use std::collections::HashSet;

/// Full end-to-end run: demo inventory, real collector service, paged walk.
#[tokio::test]
async fn test_lists_whole_demo_inventory() {
    let inventory = sample_inventory().expect("Failed to build inventory");
    let total = inventory.len();
    let config = BrowserConfig {
        page_size: Some(4),
        ..BrowserConfig::default()
    };

    let session = InventorySession::start(inventory, &config)
        .await
        .expect("Failed to start session");
    let objects = session.list_inventory().await.expect("Failed to list inventory");

    assert_eq!(objects.len(), total);
    assert_eq!(objects[0].obj, session.content.root_folder);

    let names: HashSet<_> = objects.iter().filter_map(|o| o.name()).collect();
    for expected in [
        "Datacenter-AMS",
        "Cluster-01",
        "esx-02.ams.local",
        "Databases",
        "pg-primary",
        "backup-appliance",
    ] {
        assert!(names.contains(expected), "missing {expected}");
    }

    let text = render_text(&objects);
    assert!(text.contains("Object Type : VirtualMachine"));
    assert!(text.contains("Property Value : Databases"));

    session.shutdown().await.expect("Failed to shut down");
}

#[tokio::test]
async fn test_page_size_does_not_change_listing() {
    let unpaged = InventorySession::start(sample_inventory().unwrap(), &BrowserConfig::default())
        .await
        .unwrap();
    let paged = InventorySession::start(
        sample_inventory().unwrap(),
        &BrowserConfig {
            page_size: Some(1),
            ..BrowserConfig::default()
        },
    )
    .await
    .unwrap();

    // Independent sessions walk concurrently without sharing cursor state.
    let (a, b) = tokio::join!(unpaged.list_inventory(), paged.list_inventory());
    assert_eq!(a.unwrap(), b.unwrap());

    unpaged.shutdown().await.unwrap();
    paged.shutdown().await.unwrap();
}
