//! # Traversal Rules
//!
//! A traversal rule says "from an object of `source_type`, follow `path` to its
//! children, then keep going with these other rules". Rules reference each other
//! (and themselves) to express unbounded recursion, so the set is a graph that
//! may contain cycles.
//!
//! Rules live in a [`RuleSet`] arena and refer to each other through [`RuleId`]
//! indices instead of pointers. The graph stays finite no matter how deep the
//! logical recursion goes; the service decides when a walk stops.
//!
//! ```rust
//! use property_collector::traversal::RuleSet;
//!
//! let mut rules = RuleSet::new();
//! let pools = rules.rule("resourcePoolTraversalSpec", "ResourcePool", "resourcePool");
//! rules.select(pools, pools);
//!
//! assert_eq!(rules.len(), 1);
//! assert_eq!(rules.children_of(pools), vec!["resourcePoolTraversalSpec"]);
//! ```

use crate::error::CollectorError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Stable index of a rule inside its [`RuleSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RuleId(pub usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalRule {
    pub name: String,
    pub source_type: String,
    pub path: String,
    pub skip: bool,
    pub children: Vec<RuleId>,
}

/// Name-referenced form of a rule, as sent over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireTraversalSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub source_type: String,
    pub path: String,
    pub skip: bool,
    pub select_set: Vec<String>,
}

/// Arena of traversal rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<TraversalRule>,
    unresolved: Vec<RuleId>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rule with no children and `skip = false`.
    pub fn rule(
        &mut self,
        name: impl Into<String>,
        source_type: impl Into<String>,
        path: impl Into<String>,
    ) -> RuleId {
        let id = RuleId(self.rules.len());
        self.rules.push(TraversalRule {
            name: name.into(),
            source_type: source_type.into(),
            path: path.into(),
            skip: false,
            children: Vec::new(),
        });
        id
    }

    /// Adds `child` to the rules followed after `parent` has been applied.
    ///
    /// Ids from another set are accepted here and rejected by [`RuleSet::validate`],
    /// whether they appear as `parent` or as `child`.
    pub fn select(&mut self, parent: RuleId, child: RuleId) {
        match self.rules.get_mut(parent.0) {
            Some(rule) => rule.children.push(child),
            None => self.unresolved.push(parent),
        }
    }

    /// An unknown `id` is recorded and rejected by [`RuleSet::validate`].
    pub fn set_skip(&mut self, id: RuleId, skip: bool) {
        match self.rules.get_mut(id.0) {
            Some(rule) => rule.skip = skip,
            None => self.unresolved.push(id),
        }
    }

    pub fn get(&self, id: RuleId) -> Option<&TraversalRule> {
        self.rules.get(id.0)
    }

    pub fn find(&self, name: &str) -> Option<RuleId> {
        self.rules.iter().position(|rule| rule.name == name).map(RuleId)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RuleId, &TraversalRule)> {
        self.rules.iter().enumerate().map(|(i, rule)| (RuleId(i), rule))
    }

    /// Names of the rules `id` recurses into, in declaration order.
    pub fn children_of(&self, id: RuleId) -> Vec<&str> {
        self.get(id)
            .map(|rule| {
                rule.children
                    .iter()
                    .filter_map(|child| self.get(*child))
                    .map(|child| child.name.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Checks that names are unique and every rule reference resolves.
    pub fn validate(&self) -> Result<(), CollectorError> {
        if let Some(missing) = self.unresolved.first() {
            return Err(CollectorError::runtime(format!(
                "rule set was edited through undefined rule #{}",
                missing.0
            )));
        }
        let mut seen = HashSet::new();
        for rule in &self.rules {
            if !seen.insert(rule.name.as_str()) {
                return Err(CollectorError::runtime(format!(
                    "duplicate traversal rule '{}'",
                    rule.name
                )));
            }
            if let Some(missing) = rule.children.iter().find(|child| child.0 >= self.rules.len()) {
                return Err(CollectorError::runtime(format!(
                    "traversal rule '{}' references undefined rule #{}",
                    rule.name, missing.0
                )));
            }
        }
        Ok(())
    }

    /// Renders every rule with its children as names.
    ///
    /// Fails like [`RuleSet::validate`], since a dangling reference has no name.
    pub fn to_wire(&self) -> Result<Vec<WireTraversalSpec>, CollectorError> {
        self.validate()?;
        Ok(self
            .iter()
            .map(|(id, rule)| WireTraversalSpec {
                name: rule.name.clone(),
                source_type: rule.source_type.clone(),
                path: rule.path.clone(),
                skip: rule.skip,
                select_set: self.children_of(id).into_iter().map(String::from).collect(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_reference_keeps_graph_finite() {
        let mut rules = RuleSet::new();
        let folder = rules.rule("folder", "Folder", "childEntity");
        rules.select(folder, folder);

        assert_eq!(rules.len(), 1);
        assert_eq!(rules.get(folder).map(|r| r.children.clone()), Some(vec![folder]));
        assert!(rules.validate().is_ok());
    }

    #[test]
    fn validate_rejects_duplicate_names() {
        let mut rules = RuleSet::new();
        rules.rule("folder", "Folder", "childEntity");
        rules.rule("folder", "Datacenter", "vmFolder");

        assert!(matches!(rules.validate(), Err(CollectorError::RuntimeFault(_))));
    }

    #[test]
    fn validate_rejects_dangling_children() {
        let mut rules = RuleSet::new();
        let folder = rules.rule("folder", "Folder", "childEntity");
        rules.select(folder, RuleId(7));

        let err = rules.validate().unwrap_err();
        assert!(err.to_string().contains("#7"));
    }

    #[test]
    fn validate_rejects_unknown_parent() {
        let mut rules = RuleSet::new();
        let folder = rules.rule("folder", "Folder", "childEntity");
        rules.select(RuleId(3), folder);

        let err = rules.validate().unwrap_err();
        assert!(err.to_string().contains("#3"));
        assert_eq!(rules.get(folder).map(|r| r.children.len()), Some(0));
    }

    #[test]
    fn validate_rejects_skip_on_unknown_rule() {
        let mut rules = RuleSet::new();
        rules.rule("folder", "Folder", "childEntity");
        rules.set_skip(RuleId(1), true);

        assert!(matches!(rules.validate(), Err(CollectorError::RuntimeFault(_))));
    }

    #[test]
    fn wire_form_refuses_dangling_children() {
        let mut rules = RuleSet::new();
        let folder = rules.rule("folder", "Folder", "childEntity");
        rules.select(folder, RuleId(7));

        assert!(rules.to_wire().is_err());
    }

    #[test]
    fn find_and_skip() {
        let mut rules = RuleSet::new();
        rules.rule("a", "Folder", "childEntity");
        let b = rules.rule("b", "Datacenter", "hostFolder");
        rules.set_skip(b, true);

        assert_eq!(rules.find("b"), Some(b));
        assert_eq!(rules.find("c"), None);
        assert!(rules.get(b).is_some_and(|rule| rule.skip));
    }
}
