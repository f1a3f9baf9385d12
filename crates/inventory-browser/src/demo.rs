//! A small but representative inventory for the demo binary.

use property_collector::inventory::{Inventory, InventoryError};

/// One datacenter under a regional folder: a two-host cluster with nested
/// resource pools, a standalone host, and a handful of VMs.
pub fn sample_inventory() -> Result<Inventory, InventoryError> {
    let mut inventory = Inventory::new();
    let root = inventory.root().clone();

    let region = inventory.add_folder(&root, "EMEA")?;
    let dc = inventory.add_datacenter(&region, "Datacenter-AMS")?;
    let hosts = inventory.host_folder(&dc).ok_or(InventoryError::UnknownParent(dc.clone()))?;
    let vms = inventory.vm_folder(&dc).ok_or(InventoryError::UnknownParent(dc.clone()))?;

    let cluster = inventory.add_cluster(&hosts, "Cluster-01")?;
    inventory.add_host(&cluster, "esx-01.ams.local")?;
    inventory.add_host(&cluster, "esx-02.ams.local")?;
    let cluster_pool = inventory
        .root_pool(&cluster)
        .ok_or(InventoryError::UnknownParent(cluster.clone()))?;
    let production = inventory.add_resource_pool(&cluster_pool, "Production")?;
    let databases = inventory.add_resource_pool(&production, "Databases")?;
    let testing = inventory.add_resource_pool(&cluster_pool, "Testing")?;

    let standalone = inventory.add_compute_resource(&hosts, "esx-03.ams.local")?;
    inventory.add_host(&standalone, "esx-03.ams.local")?;
    let standalone_pool = inventory
        .root_pool(&standalone)
        .ok_or(InventoryError::UnknownParent(standalone.clone()))?;

    let apps = inventory.add_folder(&vms, "Applications")?;
    inventory.add_vm(&apps, &production, "web-01")?;
    inventory.add_vm(&apps, &production, "web-02")?;
    inventory.add_vm(&apps, &databases, "pg-primary")?;
    inventory.add_vm(&vms, &testing, "ci-runner")?;
    inventory.add_vm(&vms, &standalone_pool, "backup-appliance")?;

    Ok(inventory)
}
