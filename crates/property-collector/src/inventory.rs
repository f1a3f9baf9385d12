//! # In-Memory Inventory
//!
//! A hierarchy of managed entities served by the in-process
//! [`CollectorActor`](crate::CollectorActor). The builder methods mirror how a
//! real inventory is shaped: datacenters own a host folder and a vm folder,
//! compute resources own hosts and a root resource pool, pools nest, and
//! virtual machines live in a folder while belonging to a pool.
//!
//! ```rust
//! use property_collector::inventory::Inventory;
//!
//! let mut inventory = Inventory::new();
//! let root = inventory.root().clone();
//! let dc = inventory.add_datacenter(&root, "dc1").unwrap();
//! let hosts = inventory.host_folder(&dc).unwrap();
//! let cluster = inventory.add_cluster(&hosts, "cluster1").unwrap();
//! inventory.add_host(&cluster, "esx-01").unwrap();
//!
//! assert_eq!(inventory.len(), 7);
//! ```

use crate::model::{DynamicProperty, EntityKind, ManagedObjectReference, PropertyValue, ENTITY_PROPERTIES};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Errors raised while shaping an inventory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    #[error("Unknown parent: {0}")]
    UnknownParent(ManagedObjectReference),

    #[error("{parent} cannot hold a {child:?}")]
    WrongParent {
        parent: ManagedObjectReference,
        child: EntityKind,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryEntity {
    pub reference: ManagedObjectReference,
    pub kind: EntityKind,
    pub name: String,
    pub parent: Option<ManagedObjectReference>,
    relations: BTreeMap<&'static str, Vec<ManagedObjectReference>>,
}

impl InventoryEntity {
    /// Objects reachable through `path`, empty when the path is unset or unknown.
    pub fn related(&self, path: &str) -> &[ManagedObjectReference] {
        self.relations.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Value of a property, `None` when the entity has nothing there.
    pub fn property(&self, path: &str) -> Option<PropertyValue> {
        match path {
            "name" => Some(PropertyValue::Text(self.name.clone())),
            "parent" => self.parent.clone().map(PropertyValue::Reference),
            relation if self.kind.relations().iter().any(|known| *known == relation) => {
                let targets = self.related(relation);
                if single_valued(self.kind, relation) {
                    targets.first().cloned().map(PropertyValue::Reference)
                } else {
                    Some(PropertyValue::Collection(
                        targets.iter().cloned().map(PropertyValue::Reference).collect(),
                    ))
                }
            }
            _ => None,
        }
    }

    /// Every property this entity has a value for.
    pub fn properties(&self) -> Vec<DynamicProperty> {
        ENTITY_PROPERTIES
            .iter()
            .chain(self.kind.relations())
            .filter_map(|path| self.property(path).map(|value| DynamicProperty::new(*path, value)))
            .collect()
    }
}

fn single_valued(kind: EntityKind, path: &str) -> bool {
    matches!(
        (kind, path),
        (EntityKind::Datacenter, "hostFolder" | "vmFolder")
            | (
                EntityKind::ComputeResource
                    | EntityKind::ClusterComputeResource
                    | EntityKind::VirtualMachine,
                "resourcePool"
            )
    )
}

fn id_prefix(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Folder => "group-",
        EntityKind::Datacenter => "datacenter-",
        EntityKind::ComputeResource => "domain-s",
        EntityKind::ClusterComputeResource => "domain-c",
        EntityKind::ResourcePool => "resgroup-",
        EntityKind::HostSystem => "host-",
        EntityKind::VirtualMachine => "vm-",
    }
}

/// The entity store and its builder API.
#[derive(Debug, Clone)]
pub struct Inventory {
    entities: HashMap<ManagedObjectReference, InventoryEntity>,
    root: ManagedObjectReference,
    next_id: u32,
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new()
    }
}

impl Inventory {
    /// Creates an inventory holding only the root folder.
    pub fn new() -> Self {
        let root = ManagedObjectReference::new("Folder", "group-d1");
        let entity = InventoryEntity {
            reference: root.clone(),
            kind: EntityKind::Folder,
            name: "Datacenters".to_string(),
            parent: None,
            relations: BTreeMap::new(),
        };
        Self {
            entities: HashMap::from([(root.clone(), entity)]),
            root,
            next_id: 2,
        }
    }

    pub fn root(&self) -> &ManagedObjectReference {
        &self.root
    }

    pub fn get(&self, reference: &ManagedObjectReference) -> Option<&InventoryEntity> {
        self.entities.get(reference)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Objects reachable from `reference` through `path`.
    pub fn children(&self, reference: &ManagedObjectReference, path: &str) -> Vec<ManagedObjectReference> {
        self.get(reference)
            .map(|entity| entity.related(path).to_vec())
            .unwrap_or_default()
    }

    pub fn add_folder(
        &mut self,
        parent: &ManagedObjectReference,
        name: impl Into<String>,
    ) -> Result<ManagedObjectReference, InventoryError> {
        self.expect_kind(parent, &[EntityKind::Folder], EntityKind::Folder)?;
        let folder = self.insert(EntityKind::Folder, name, Some(parent.clone()));
        self.link(parent, "childEntity", &folder);
        Ok(folder)
    }

    /// Adds a datacenter together with its `host` and `vm` folders.
    pub fn add_datacenter(
        &mut self,
        parent: &ManagedObjectReference,
        name: impl Into<String>,
    ) -> Result<ManagedObjectReference, InventoryError> {
        self.expect_kind(parent, &[EntityKind::Folder], EntityKind::Datacenter)?;
        let datacenter = self.insert(EntityKind::Datacenter, name, Some(parent.clone()));
        self.link(parent, "childEntity", &datacenter);

        let host_folder = self.insert(EntityKind::Folder, "host", Some(datacenter.clone()));
        let vm_folder = self.insert(EntityKind::Folder, "vm", Some(datacenter.clone()));
        self.link(&datacenter, "hostFolder", &host_folder);
        self.link(&datacenter, "vmFolder", &vm_folder);
        Ok(datacenter)
    }

    /// Adds a standalone compute resource with its root resource pool.
    pub fn add_compute_resource(
        &mut self,
        host_folder: &ManagedObjectReference,
        name: impl Into<String>,
    ) -> Result<ManagedObjectReference, InventoryError> {
        self.add_compute(EntityKind::ComputeResource, host_folder, name)
    }

    /// Adds a cluster with its root resource pool.
    pub fn add_cluster(
        &mut self,
        host_folder: &ManagedObjectReference,
        name: impl Into<String>,
    ) -> Result<ManagedObjectReference, InventoryError> {
        self.add_compute(EntityKind::ClusterComputeResource, host_folder, name)
    }

    pub fn add_host(
        &mut self,
        compute: &ManagedObjectReference,
        name: impl Into<String>,
    ) -> Result<ManagedObjectReference, InventoryError> {
        self.expect_kind(
            compute,
            &[EntityKind::ComputeResource, EntityKind::ClusterComputeResource],
            EntityKind::HostSystem,
        )?;
        let host = self.insert(EntityKind::HostSystem, name, Some(compute.clone()));
        self.link(compute, "host", &host);
        Ok(host)
    }

    /// Adds a child pool under an existing resource pool.
    pub fn add_resource_pool(
        &mut self,
        parent: &ManagedObjectReference,
        name: impl Into<String>,
    ) -> Result<ManagedObjectReference, InventoryError> {
        self.expect_kind(parent, &[EntityKind::ResourcePool], EntityKind::ResourcePool)?;
        let pool = self.insert(EntityKind::ResourcePool, name, Some(parent.clone()));
        self.link(parent, "resourcePool", &pool);
        Ok(pool)
    }

    /// Adds a virtual machine placed in `folder` and running in `pool`.
    pub fn add_vm(
        &mut self,
        folder: &ManagedObjectReference,
        pool: &ManagedObjectReference,
        name: impl Into<String>,
    ) -> Result<ManagedObjectReference, InventoryError> {
        self.expect_kind(folder, &[EntityKind::Folder], EntityKind::VirtualMachine)?;
        self.expect_kind(pool, &[EntityKind::ResourcePool], EntityKind::VirtualMachine)?;
        let vm = self.insert(EntityKind::VirtualMachine, name, Some(folder.clone()));
        self.link(folder, "childEntity", &vm);
        self.link(pool, "vm", &vm);
        self.link(&vm, "resourcePool", pool);
        Ok(vm)
    }

    pub fn host_folder(&self, datacenter: &ManagedObjectReference) -> Option<ManagedObjectReference> {
        self.children(datacenter, "hostFolder").into_iter().next()
    }

    pub fn vm_folder(&self, datacenter: &ManagedObjectReference) -> Option<ManagedObjectReference> {
        self.children(datacenter, "vmFolder").into_iter().next()
    }

    pub fn root_pool(&self, compute: &ManagedObjectReference) -> Option<ManagedObjectReference> {
        self.children(compute, "resourcePool").into_iter().next()
    }

    fn add_compute(
        &mut self,
        kind: EntityKind,
        host_folder: &ManagedObjectReference,
        name: impl Into<String>,
    ) -> Result<ManagedObjectReference, InventoryError> {
        self.expect_kind(host_folder, &[EntityKind::Folder], kind)?;
        let compute = self.insert(kind, name, Some(host_folder.clone()));
        self.link(host_folder, "childEntity", &compute);

        let pool = self.insert(EntityKind::ResourcePool, "Resources", Some(compute.clone()));
        self.link(&compute, "resourcePool", &pool);
        Ok(compute)
    }

    fn expect_kind(
        &self,
        parent: &ManagedObjectReference,
        allowed: &[EntityKind],
        child: EntityKind,
    ) -> Result<(), InventoryError> {
        let entity = self
            .get(parent)
            .ok_or_else(|| InventoryError::UnknownParent(parent.clone()))?;
        if allowed.contains(&entity.kind) {
            Ok(())
        } else {
            Err(InventoryError::WrongParent {
                parent: parent.clone(),
                child,
            })
        }
    }

    fn insert(
        &mut self,
        kind: EntityKind,
        name: impl Into<String>,
        parent: Option<ManagedObjectReference>,
    ) -> ManagedObjectReference {
        let reference = ManagedObjectReference::new(
            kind.type_name(),
            format!("{}{}", id_prefix(kind), self.next_id),
        );
        self.next_id += 1;
        self.entities.insert(
            reference.clone(),
            InventoryEntity {
                reference: reference.clone(),
                kind,
                name: name.into(),
                parent,
                relations: BTreeMap::new(),
            },
        );
        reference
    }

    fn link(&mut self, from: &ManagedObjectReference, path: &'static str, to: &ManagedObjectReference) {
        if let Some(entity) = self.entities.get_mut(from) {
            entity.relations.entry(path).or_default().push(to.clone());
        }
    }
}
