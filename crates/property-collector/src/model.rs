//! # Wire Model
//!
//! Value types exchanged with a property collector: object references, the
//! inventory kind hierarchy, property values, and result pages.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Name of the abstract supertype every inventory kind derives from.
pub const MANAGED_ENTITY: &str = "ManagedEntity";

/// Opaque handle to a server-side object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ManagedObjectReference {
    #[serde(rename = "type")]
    pub type_name: String,
    pub value: String,
}

impl ManagedObjectReference {
    pub fn new(type_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            value: value.into(),
        }
    }
}

impl Display for ManagedObjectReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.type_name, self.value)
    }
}

/// Concrete kinds of managed entity found in an inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Folder,
    Datacenter,
    ComputeResource,
    ClusterComputeResource,
    ResourcePool,
    HostSystem,
    VirtualMachine,
}

impl EntityKind {
    pub const ALL: [EntityKind; 7] = [
        EntityKind::Folder,
        EntityKind::Datacenter,
        EntityKind::ComputeResource,
        EntityKind::ClusterComputeResource,
        EntityKind::ResourcePool,
        EntityKind::HostSystem,
        EntityKind::VirtualMachine,
    ];

    pub fn type_name(self) -> &'static str {
        match self {
            EntityKind::Folder => "Folder",
            EntityKind::Datacenter => "Datacenter",
            EntityKind::ComputeResource => "ComputeResource",
            EntityKind::ClusterComputeResource => "ClusterComputeResource",
            EntityKind::ResourcePool => "ResourcePool",
            EntityKind::HostSystem => "HostSystem",
            EntityKind::VirtualMachine => "VirtualMachine",
        }
    }

    pub fn from_type_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.type_name() == name)
    }

    /// Returns true when an object of this kind is an instance of `type_name`,
    /// following the inheritance chain up to [`MANAGED_ENTITY`].
    pub fn is_a(self, type_name: &str) -> bool {
        if type_name == MANAGED_ENTITY || type_name == self.type_name() {
            return true;
        }
        matches!(
            (self, type_name),
            (EntityKind::ClusterComputeResource, "ComputeResource")
        )
    }

    /// Relation properties that lead from this kind to other entities.
    pub fn relations(self) -> &'static [&'static str] {
        match self {
            EntityKind::Folder => &["childEntity"],
            EntityKind::Datacenter => &["hostFolder", "vmFolder"],
            EntityKind::ComputeResource | EntityKind::ClusterComputeResource => {
                &["host", "resourcePool"]
            }
            EntityKind::ResourcePool => &["resourcePool", "vm"],
            EntityKind::HostSystem => &[],
            EntityKind::VirtualMachine => &["resourcePool"],
        }
    }
}

/// Properties every managed entity carries.
pub const ENTITY_PROPERTIES: [&str; 2] = ["name", "parent"];

/// Returns true when `type_name` names a known kind or the abstract supertype.
pub fn is_known_type(type_name: &str) -> bool {
    type_name == MANAGED_ENTITY || EntityKind::from_type_name(type_name).is_some()
}

/// Returns true when `path` is a property declared on `type_name` (or inherited).
pub fn has_property(type_name: &str, path: &str) -> bool {
    if ENTITY_PROPERTIES.iter().any(|known| *known == path) {
        return is_known_type(type_name);
    }
    match EntityKind::from_type_name(type_name) {
        Some(kind) => kind.relations().iter().any(|known| *known == path),
        None => false,
    }
}

/// A property value as returned by the service.
///
/// Multi-valued properties arrive as [`PropertyValue::Collection`]. Callers choose
/// between [`PropertyValue::iter`] (every element) and [`PropertyValue::first`]
/// (first element only); neither is applied implicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum PropertyValue {
    Text(String),
    Integer(i64),
    Boolean(bool),
    Reference(ManagedObjectReference),
    Collection(Vec<PropertyValue>),
}

impl PropertyValue {
    pub fn is_collection(&self) -> bool {
        matches!(self, PropertyValue::Collection(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<&ManagedObjectReference> {
        match self {
            PropertyValue::Reference(reference) => Some(reference),
            _ => None,
        }
    }

    /// The value itself, or the first element of a collection.
    pub fn first(&self) -> Option<&PropertyValue> {
        match self {
            PropertyValue::Collection(items) => items.first(),
            other => Some(other),
        }
    }

    /// Every element of a collection, or the single value.
    pub fn iter(&self) -> std::slice::Iter<'_, PropertyValue> {
        match self {
            PropertyValue::Collection(items) => items.iter(),
            other => std::slice::from_ref(other).iter(),
        }
    }
}

impl Display for PropertyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyValue::Text(text) => write!(f, "{text}"),
            PropertyValue::Integer(n) => write!(f, "{n}"),
            PropertyValue::Boolean(b) => write!(f, "{b}"),
            PropertyValue::Reference(reference) => write!(f, "{reference}"),
            PropertyValue::Collection(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

/// A single named property of a retrieved object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicProperty {
    pub name: String,
    #[serde(rename = "val")]
    pub value: PropertyValue,
}

impl DynamicProperty {
    pub fn new(name: impl Into<String>, value: PropertyValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// One retrieved object and the properties selected for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectContent {
    pub obj: ManagedObjectReference,
    #[serde(default)]
    pub prop_set: Vec<DynamicProperty>,
}

impl ObjectContent {
    pub fn new(obj: ManagedObjectReference, prop_set: Vec<DynamicProperty>) -> Self {
        Self { obj, prop_set }
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.prop_set
            .iter()
            .find(|prop| prop.name == name)
            .map(|prop| &prop.value)
    }

    /// Shortcut for the `name` property when it is text.
    pub fn name(&self) -> Option<&str> {
        self.property("name").and_then(PropertyValue::as_text)
    }
}

/// One page of a retrieval.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrieveResult {
    #[serde(default)]
    pub objects: Vec<ObjectContent>,
    #[serde(default)]
    pub token: Option<String>,
}

impl RetrieveResult {
    pub fn new(objects: Vec<ObjectContent>, token: Option<String>) -> Self {
        Self { objects, token }
    }

    /// The continuation token, if one is present and non-empty.
    pub fn continuation(&self) -> Option<&str> {
        self.token.as_deref().filter(|token| !token.is_empty())
    }

    pub fn has_more(&self) -> bool {
        self.continuation().is_some()
    }
}

/// Options for the initial retrieval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrieveOptions {
    /// Caps the page size. `None` lets the server choose.
    pub max_objects: Option<u32>,
}

impl RetrieveOptions {
    pub fn with_max_objects(max_objects: u32) -> Self {
        Self {
            max_objects: Some(max_objects),
        }
    }
}

/// Handles a connected session needs: where the inventory starts and which
/// property collector to query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceContent {
    pub root_folder: ManagedObjectReference,
    pub property_collector: ManagedObjectReference,
}
