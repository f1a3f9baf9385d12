//! # Filter Specifications
//!
//! A [`FilterSpec`] is the complete query sent to a property collector: the root
//! object to start from, the traversal rules to walk with, and the properties to
//! report for the objects reached.
//!
//! [`inventory_filter`] builds the one filter this crate needs in practice: a walk
//! from a root container down to every managed entity beneath it.

use crate::error::CollectorError;
use crate::model::{ManagedObjectReference, MANAGED_ENTITY};
use crate::traversal::{RuleId, RuleSet, WireTraversalSpec};
use serde::{Deserialize, Serialize};

pub const RESOURCE_POOL_RULE: &str = "resourcePoolTraversalSpec";
pub const COMPUTE_RESOURCE_POOL_RULE: &str = "computeResourceRpTraversalSpec";
pub const COMPUTE_RESOURCE_HOST_RULE: &str = "computeResourceHostTraversalSpec";
pub const DATACENTER_HOST_RULE: &str = "datacenterHostTraversalSpec";
pub const DATACENTER_VM_RULE: &str = "datacenterVmTraversalSpec";
pub const FOLDER_RULE: &str = "folderTraversalSpec";

/// Which properties to report for objects of `entity_type` (and its subtypes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySelection {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub path_set: Vec<String>,
    #[serde(rename = "all")]
    pub include_all: bool,
}

impl PropertySelection {
    pub fn new<I, S>(entity_type: impl Into<String>, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entity_type: entity_type.into(),
            path_set: paths.into_iter().map(Into::into).collect(),
            include_all: false,
        }
    }

    /// Selects every property of `entity_type`.
    pub fn all(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            path_set: Vec::new(),
            include_all: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub root: ManagedObjectReference,
    pub skip_root: bool,
    pub root_rules: Vec<RuleId>,
    pub rules: RuleSet,
    pub selections: Vec<PropertySelection>,
}

/// Name-referenced form of a [`FilterSpec`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireFilterSpec {
    pub obj: ManagedObjectReference,
    pub skip: bool,
    pub select_set: Vec<String>,
    pub traversal_specs: Vec<WireTraversalSpec>,
    pub prop_set: Vec<PropertySelection>,
}

impl FilterSpec {
    pub fn new(root: ManagedObjectReference, rules: RuleSet) -> Self {
        Self {
            root,
            skip_root: false,
            root_rules: Vec::new(),
            rules,
            selections: Vec::new(),
        }
    }

    pub fn with_root_rule(mut self, id: RuleId) -> Self {
        self.root_rules.push(id);
        self
    }

    pub fn with_selection(mut self, selection: PropertySelection) -> Self {
        self.selections.push(selection);
        self
    }

    pub fn skip_root(mut self, skip: bool) -> Self {
        self.skip_root = skip;
        self
    }

    pub fn to_wire(&self) -> Result<WireFilterSpec, CollectorError> {
        let traversal_specs = self.rules.to_wire()?;
        let select_set = self
            .root_rules
            .iter()
            .map(|id| {
                self.rules.get(*id).map(|rule| rule.name.clone()).ok_or_else(|| {
                    CollectorError::runtime(format!("filter references undefined rule #{}", id.0))
                })
            })
            .collect::<Result<_, _>>()?;
        Ok(WireFilterSpec {
            obj: self.root.clone(),
            skip: self.skip_root,
            select_set,
            traversal_specs,
            prop_set: self.selections.clone(),
        })
    }
}

/// Builds the traversal graph that reaches every managed entity under `root`:
///
/// - Folder: `childEntity`, recursing with every rule below
/// - Datacenter: `hostFolder` and `vmFolder`, handing off to the folder rule
/// - ComputeResource: `host`, and `resourcePool` into the pool rule
/// - ResourcePool: `resourcePool`, recursing into itself
///
/// Only `name` is requested, against `ManagedEntity` so every kind matches.
pub fn inventory_filter(root: ManagedObjectReference) -> FilterSpec {
    let mut rules = RuleSet::new();

    let resource_pool = rules.rule(RESOURCE_POOL_RULE, "ResourcePool", "resourcePool");
    rules.select(resource_pool, resource_pool);

    let compute_pool = rules.rule(COMPUTE_RESOURCE_POOL_RULE, "ComputeResource", "resourcePool");
    rules.select(compute_pool, resource_pool);

    let compute_host = rules.rule(COMPUTE_RESOURCE_HOST_RULE, "ComputeResource", "host");

    let datacenter_host = rules.rule(DATACENTER_HOST_RULE, "Datacenter", "hostFolder");
    let datacenter_vm = rules.rule(DATACENTER_VM_RULE, "Datacenter", "vmFolder");

    let folder = rules.rule(FOLDER_RULE, "Folder", "childEntity");
    rules.select(datacenter_host, folder);
    rules.select(datacenter_vm, folder);

    for child in [
        folder,
        datacenter_host,
        datacenter_vm,
        compute_pool,
        compute_host,
        resource_pool,
    ] {
        rules.select(folder, child);
    }

    FilterSpec::new(root, rules)
        .with_root_rule(folder)
        .with_selection(PropertySelection::new(MANAGED_ENTITY, ["name"]))
}
