//! # In-Process Collector Service
//!
//! `CollectorActor` is the server half of an in-process property collector. It
//! owns an [`Inventory`] and the cursors of retrievals still in progress, and
//! processes requests sequentially from its channel, so neither needs a lock.
//!
//! Executing a filter follows the same rules a remote collector applies:
//!
//! 1. The filter is validated: rule names unique and resolvable, type names and
//!    property paths known to the inventory model.
//! 2. Starting at the root object, every rule whose source type matches the
//!    current object (inheritance-aware) is followed along its path, and the
//!    rule's children are applied to each object reached.
//! 3. Each object is reported once, in walk order, unless it was only reached
//!    through skipping rules. A rule is applied to a given object at most once,
//!    which is what bounds the recursion of self-referencing rules.
//! 4. Reported objects carry the properties of every selection their kind matches.
//!
//! Results larger than the page size are parked under a continuation token.

use crate::client::CollectorClient;
use crate::error::CollectorError;
use crate::filter::FilterSpec;
use crate::inventory::Inventory;
use crate::message::CollectorRequest;
use crate::model::{
    has_property, is_known_type, DynamicProperty, ManagedObjectReference, ObjectContent,
    RetrieveOptions, RetrieveResult, ServiceContent,
};
use crate::traversal::RuleId;
use std::collections::{HashMap, HashSet, VecDeque};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Page size used when the caller does not set `max_objects`.
pub const DEFAULT_PAGE_LIMIT: usize = 100;

pub struct CollectorActor {
    receiver: mpsc::Receiver<CollectorRequest>,
    inventory: Inventory,
    content: ServiceContent,
    cursors: HashMap<String, VecDeque<ObjectContent>>,
    page_limit: usize,
    next_token: u64,
}

impl CollectorActor {
    /// Creates the service over `inventory` and a client connected to it.
    ///
    /// `buffer_size` is the request channel capacity; callers wait when it is full.
    pub fn new(inventory: Inventory, buffer_size: usize) -> (Self, CollectorClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let content = ServiceContent {
            root_folder: inventory.root().clone(),
            property_collector: ManagedObjectReference::new("PropertyCollector", "propertyCollector"),
        };
        let actor = Self {
            receiver,
            inventory,
            content,
            cursors: HashMap::new(),
            page_limit: DEFAULT_PAGE_LIMIT,
            next_token: 1,
        };
        (actor, CollectorClient::new(sender))
    }

    /// Overrides the server-chosen page size. Zero is treated as one.
    pub fn with_page_limit(mut self, page_limit: usize) -> Self {
        self.page_limit = page_limit.max(1);
        self
    }

    /// Runs the request loop until every client has been dropped.
    pub async fn run(mut self) {
        info!(entities = self.inventory.len(), "Collector started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                CollectorRequest::ServiceContent { respond_to } => {
                    let _ = respond_to.send(Ok(self.content.clone()));
                }
                CollectorRequest::Retrieve {
                    collector,
                    specs,
                    options,
                    respond_to,
                } => {
                    let result = self.retrieve(&collector, &specs, &options);
                    if let Err(e) = &result {
                        warn!(error = %e, "Retrieve failed");
                    }
                    let _ = respond_to.send(result);
                }
                CollectorRequest::Continue {
                    collector,
                    token,
                    respond_to,
                } => {
                    let result = self.resume(&collector, &token);
                    if let Err(e) = &result {
                        warn!(%token, error = %e, "Continue failed");
                    }
                    let _ = respond_to.send(result);
                }
                CollectorRequest::Cancel {
                    collector,
                    token,
                    respond_to,
                } => {
                    let result = self.cancel(&collector, &token);
                    let _ = respond_to.send(result);
                }
            }
        }

        info!(open_cursors = self.cursors.len(), "Shutdown");
    }

    fn retrieve(
        &mut self,
        collector: &ManagedObjectReference,
        specs: &[FilterSpec],
        options: &RetrieveOptions,
    ) -> Result<Option<RetrieveResult>, CollectorError> {
        self.check_collector(collector)?;

        let mut objects: Vec<ObjectContent> = Vec::new();
        let mut positions: HashMap<ManagedObjectReference, usize> = HashMap::new();
        for spec in specs {
            self.validate(spec)?;
            for content in self.execute(spec) {
                match positions.get(&content.obj) {
                    Some(&at) => merge(&mut objects[at], content),
                    None => {
                        positions.insert(content.obj.clone(), objects.len());
                        objects.push(content);
                    }
                }
            }
        }
        debug!(specs = specs.len(), matched = objects.len(), "Retrieve");

        if objects.is_empty() {
            return Ok(None);
        }
        let page_size = match options.max_objects {
            Some(max) if max > 0 => max as usize,
            _ => self.page_limit,
        };
        Ok(Some(self.page(objects.into(), page_size)))
    }

    fn resume(
        &mut self,
        collector: &ManagedObjectReference,
        token: &str,
    ) -> Result<Option<RetrieveResult>, CollectorError> {
        self.check_collector(collector)?;
        let remaining = self
            .cursors
            .remove(token)
            .ok_or_else(|| CollectorError::runtime(format!("invalid continuation token '{token}'")))?;
        let page_size = self.page_limit_for(token);
        debug!(%token, remaining = remaining.len(), "Continue");
        Ok(Some(self.page(remaining, page_size)))
    }

    fn cancel(&mut self, collector: &ManagedObjectReference, token: &str) -> Result<(), CollectorError> {
        self.check_collector(collector)?;
        match self.cursors.remove(token) {
            Some(dropped) => {
                info!(%token, dropped = dropped.len(), "Cancelled");
                Ok(())
            }
            None => Err(CollectorError::runtime(format!("invalid continuation token '{token}'"))),
        }
    }

    /// Splits off one page and parks the rest under a fresh token.
    fn page(&mut self, mut remaining: VecDeque<ObjectContent>, page_size: usize) -> RetrieveResult {
        let take = page_size.min(remaining.len());
        let objects: Vec<ObjectContent> = remaining.drain(..take).collect();
        if remaining.is_empty() {
            return RetrieveResult::new(objects, None);
        }
        let token = format!("{}-{}", page_size, self.next_token);
        self.next_token += 1;
        self.cursors.insert(token.clone(), remaining);
        RetrieveResult::new(objects, Some(token))
    }

    /// Continuation pages keep the page size of the retrieval they belong to,
    /// which is encoded as the token's prefix.
    fn page_limit_for(&self, token: &str) -> usize {
        token
            .split_once('-')
            .and_then(|(size, _)| size.parse().ok())
            .unwrap_or(self.page_limit)
    }

    fn check_collector(&self, collector: &ManagedObjectReference) -> Result<(), CollectorError> {
        if *collector == self.content.property_collector {
            Ok(())
        } else {
            Err(CollectorError::runtime(format!("managed object not found: {collector}")))
        }
    }

    fn validate(&self, spec: &FilterSpec) -> Result<(), CollectorError> {
        spec.rules.validate()?;
        if let Some(missing) = spec.root_rules.iter().find(|id| spec.rules.get(**id).is_none()) {
            return Err(CollectorError::runtime(format!(
                "filter references undefined rule #{}",
                missing.0
            )));
        }
        for (_, rule) in spec.rules.iter() {
            if !is_known_type(&rule.source_type) {
                return Err(CollectorError::invalid_property(&rule.source_type));
            }
            if !has_property(&rule.source_type, &rule.path) {
                return Err(CollectorError::invalid_property(&rule.path));
            }
        }
        for selection in &spec.selections {
            if !is_known_type(&selection.entity_type) {
                return Err(CollectorError::invalid_property(&selection.entity_type));
            }
            if selection.include_all {
                continue;
            }
            if let Some(path) = selection
                .path_set
                .iter()
                .find(|path| !has_property(&selection.entity_type, path))
            {
                return Err(CollectorError::invalid_property(path));
            }
        }
        if self.inventory.get(&spec.root).is_none() {
            return Err(CollectorError::runtime(format!("managed object not found: {}", spec.root)));
        }
        Ok(())
    }

    fn execute(&self, spec: &FilterSpec) -> Vec<ObjectContent> {
        self.walk(spec)
            .into_iter()
            .filter_map(|obj| self.project(spec, obj))
            .collect()
    }

    /// Depth-first walk from the root, in the order a recursive descent would
    /// report objects. The work stack replaces the call stack so nesting depth
    /// is bounded by memory only.
    fn walk<'a>(&'a self, spec: &'a FilterSpec) -> Vec<ManagedObjectReference> {
        let mut seen: HashSet<ManagedObjectReference> = HashSet::new();
        let mut applied: HashSet<(&'a ManagedObjectReference, RuleId)> = HashSet::new();
        let mut reported = Vec::new();
        let mut stack = vec![Step::Enter {
            obj: &spec.root,
            skip: spec.skip_root,
            rules: spec.root_rules.as_slice(),
        }];

        while let Some(step) = stack.pop() {
            match step {
                Step::Enter { obj, skip, rules } => {
                    if !skip && seen.insert(obj.clone()) {
                        reported.push(obj.clone());
                    }
                    stack.extend(rules.iter().rev().map(|id| Step::Apply { obj, rule: *id }));
                }
                Step::Apply { obj, rule: id } => {
                    let (Some(entity), Some(rule)) = (self.inventory.get(obj), spec.rules.get(id)) else {
                        continue;
                    };
                    if !entity.kind.is_a(&rule.source_type) || !applied.insert((obj, id)) {
                        continue;
                    }
                    stack.extend(entity.related(&rule.path).iter().rev().map(|child| Step::Enter {
                        obj: child,
                        skip: rule.skip,
                        rules: rule.children.as_slice(),
                    }));
                }
            }
        }
        reported
    }

    /// Builds the reported content of `obj`, or `None` when no selection matches it.
    fn project(&self, spec: &FilterSpec, obj: ManagedObjectReference) -> Option<ObjectContent> {
        let entity = self.inventory.get(&obj)?;
        let matching: Vec<_> = spec
            .selections
            .iter()
            .filter(|selection| entity.kind.is_a(&selection.entity_type))
            .collect();
        if matching.is_empty() {
            return None;
        }

        let mut props: Vec<DynamicProperty> = Vec::new();
        for selection in matching {
            let found = if selection.include_all {
                entity.properties()
            } else {
                selection
                    .path_set
                    .iter()
                    .filter_map(|path| {
                        entity
                            .property(path)
                            .map(|value| DynamicProperty::new(path.clone(), value))
                    })
                    .collect()
            };
            for prop in found {
                if !props.iter().any(|existing| existing.name == prop.name) {
                    props.push(prop);
                }
            }
        }
        Some(ObjectContent::new(obj, props))
    }
}

/// Pending work of a walk. A rule is checked against its object only when its
/// `Apply` step is popped, after the subtrees of earlier rules are done.
enum Step<'a> {
    Enter {
        obj: &'a ManagedObjectReference,
        skip: bool,
        rules: &'a [RuleId],
    },
    Apply {
        obj: &'a ManagedObjectReference,
        rule: RuleId,
    },
}

fn merge(existing: &mut ObjectContent, incoming: ObjectContent) {
    for prop in incoming.prop_set {
        if !existing.prop_set.iter().any(|p| p.name == prop.name) {
            existing.prop_set.push(prop);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{inventory_filter, PropertySelection};
    use crate::model::{PropertyValue, MANAGED_ENTITY};
    use crate::traversal::RuleSet;
    use crate::PropertyCollector;

    struct Fixture {
        inventory: Inventory,
        dc: ManagedObjectReference,
        cluster: ManagedObjectReference,
        nested_pool: ManagedObjectReference,
        vm: ManagedObjectReference,
    }

    fn fixture() -> Fixture {
        let mut inventory = Inventory::new();
        let root = inventory.root().clone();
        let dc = inventory.add_datacenter(&root, "dc1").unwrap();
        let hosts = inventory.host_folder(&dc).unwrap();
        let vms = inventory.vm_folder(&dc).unwrap();
        let cluster = inventory.add_cluster(&hosts, "cluster1").unwrap();
        inventory.add_host(&cluster, "esx-01").unwrap();
        let root_pool = inventory.root_pool(&cluster).unwrap();
        let pool = inventory.add_resource_pool(&root_pool, "prod").unwrap();
        let nested_pool = inventory.add_resource_pool(&pool, "prod-db").unwrap();
        let vm = inventory.add_vm(&vms, &nested_pool, "db-01").unwrap();
        Fixture {
            inventory,
            dc,
            cluster,
            nested_pool,
            vm,
        }
    }

    fn start(inventory: Inventory) -> (CollectorClient, ServiceContent, tokio::task::JoinHandle<()>) {
        let content = ServiceContent {
            root_folder: inventory.root().clone(),
            property_collector: ManagedObjectReference::new("PropertyCollector", "propertyCollector"),
        };
        let (actor, client) = CollectorActor::new(inventory, 8);
        let handle = tokio::spawn(actor.run());
        (client, content, handle)
    }

    #[tokio::test]
    async fn inventory_filter_reaches_every_entity() {
        let fx = fixture();
        let total = fx.inventory.len();
        let (client, content, _handle) = start(fx.inventory);

        let page = client
            .retrieve_properties(
                &content.property_collector,
                &[inventory_filter(content.root_folder.clone())],
                &RetrieveOptions::default(),
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(page.objects.len(), total);
        assert!(page.token.is_none());
        let refs: Vec<_> = page.objects.iter().map(|o| o.obj.clone()).collect();
        for expected in [&fx.dc, &fx.cluster, &fx.nested_pool, &fx.vm] {
            assert!(refs.contains(expected), "missing {expected}");
        }
        assert!(page.objects.iter().all(|o| o.prop_set.len() == 1 && o.name().is_some()));
    }

    #[tokio::test]
    async fn pages_follow_max_objects() {
        let fx = fixture();
        let total = fx.inventory.len();
        let (client, content, _handle) = start(fx.inventory);
        let pc = &content.property_collector;

        let first = client
            .retrieve_properties(
                pc,
                &[inventory_filter(content.root_folder.clone())],
                &RetrieveOptions::with_max_objects(3),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.objects.len(), 3);
        let token = first.token.clone().unwrap();

        let second = client.continue_retrieve(pc, &token).await.unwrap().unwrap();
        assert_eq!(second.objects.len(), 3usize.min(total - 3));

        // consumed tokens are gone
        let stale = client.continue_retrieve(pc, &token).await;
        assert!(matches!(stale, Err(CollectorError::RuntimeFault(_))));
    }

    #[tokio::test]
    async fn unknown_property_path_is_rejected() {
        let fx = fixture();
        let (client, content, _handle) = start(fx.inventory);

        let spec = FilterSpec::new(content.root_folder.clone(), RuleSet::new())
            .with_selection(PropertySelection::new(MANAGED_ENTITY, ["name", "bogus"]));
        let result = client
            .retrieve_properties(&content.property_collector, &[spec], &RetrieveOptions::default())
            .await;

        assert_eq!(result, Err(CollectorError::invalid_property("bogus")));
    }

    #[tokio::test]
    async fn unknown_type_is_rejected() {
        let fx = fixture();
        let (client, content, _handle) = start(fx.inventory);

        let spec = FilterSpec::new(content.root_folder.clone(), RuleSet::new())
            .with_selection(PropertySelection::new("Toaster", ["name"]));
        let result = client
            .retrieve_properties(&content.property_collector, &[spec], &RetrieveOptions::default())
            .await;

        assert_eq!(result, Err(CollectorError::invalid_property("Toaster")));
    }

    #[tokio::test]
    async fn wrong_collector_handle_is_a_runtime_fault() {
        let fx = fixture();
        let (client, content, _handle) = start(fx.inventory);
        let bogus = ManagedObjectReference::new("PropertyCollector", "session[1]");

        let result = client
            .retrieve_properties(&bogus, &[inventory_filter(content.root_folder)], &RetrieveOptions::default())
            .await;

        assert!(matches!(result, Err(CollectorError::RuntimeFault(_))));
    }

    #[tokio::test]
    async fn skipped_root_without_rules_yields_null_result() {
        let fx = fixture();
        let (client, content, _handle) = start(fx.inventory);

        let spec = FilterSpec::new(content.root_folder.clone(), RuleSet::new())
            .skip_root(true)
            .with_selection(PropertySelection::new(MANAGED_ENTITY, ["name"]));
        let result = client
            .retrieve_properties(&content.property_collector, &[spec], &RetrieveOptions::default())
            .await
            .unwrap();

        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn include_all_returns_relations_as_collections() {
        let fx = fixture();
        let (client, content, _handle) = start(fx.inventory);

        let spec = FilterSpec::new(fx.cluster.clone(), RuleSet::new())
            .with_selection(PropertySelection::all("ComputeResource"));
        let page = client
            .retrieve_properties(&content.property_collector, &[spec], &RetrieveOptions::default())
            .await
            .unwrap()
            .unwrap();

        let cluster = &page.objects[0];
        assert_eq!(cluster.obj, fx.cluster);
        assert!(matches!(cluster.property("host"), Some(PropertyValue::Collection(hosts)) if hosts.len() == 1));
        assert!(cluster.property("parent").and_then(PropertyValue::as_reference).is_some());
    }

    #[tokio::test]
    async fn cancel_discards_cursor() {
        let fx = fixture();
        let (client, content, _handle) = start(fx.inventory);
        let pc = &content.property_collector;

        let first = client
            .retrieve_properties(
                pc,
                &[inventory_filter(content.root_folder.clone())],
                &RetrieveOptions::with_max_objects(1),
            )
            .await
            .unwrap()
            .unwrap();
        let token = first.token.unwrap();

        client.cancel_retrieve(pc, &token).await.unwrap();
        assert!(client.continue_retrieve(pc, &token).await.is_err());
    }
}
