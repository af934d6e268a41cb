//! Signature based structural merge
//!
//! Merge semantics for `target.merge(incoming)`:
//! - signatures differ: `target` is untouched, `incoming` comes back as
//!   [`MergeOutcome::Rejected`]
//! - signatures match: value and attributes of `incoming` replace those of
//!   `target` wholesale, then every incoming child is merged into the first
//!   existing child of the same name. A child that cannot be merged there is
//!   appended next to it; a child with no namesake is appended as is.
//!
//! With [`MergeMode::Compatible`] repeated merges of a tree that holds several
//! same-named siblings keep appending copies of all but the first.
//! [`MergeMode::Strict`] looks for a sibling with the same name and the same
//! signature instead, so nothing is duplicated.

use std::path::Path;

use tracing::{debug, instrument};

use crate::error::Result;
use crate::node::Node;

/// Child matching rule used while merging
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MergeMode {
    /// Merge into the first same-named child, append whatever it rejects
    #[default]
    Compatible,
    /// Merge into the same-named child with an equal signature, append otherwise
    Strict,
}

/// Result of merging one node onto another
#[derive(Clone, Debug, PartialEq)]
#[must_use]
pub enum MergeOutcome {
    /// The incoming node was merged into the target
    Merged,
    /// Signatures differ; the incoming node is handed back unchanged
    Rejected(Node),
}

impl MergeOutcome {
    pub fn is_merged(&self) -> bool {
        matches!(self, Self::Merged)
    }

    /// The rejected node, if any
    pub fn into_rejected(self) -> Option<Node> {
        match self {
            Self::Merged => None,
            Self::Rejected(node) => Some(node),
        }
    }
}

impl Node {
    /// Merge `incoming` onto this node using [`MergeMode::Compatible`]
    pub fn merge(&mut self, incoming: Self) -> MergeOutcome {
        self.merge_with(incoming, MergeMode::default())
    }

    /// Merge `incoming` onto this node with an explicit child matching rule
    #[instrument(level = "debug", skip_all, fields(node = %self.name(), incoming = %incoming.name()))]
    pub fn merge_with(&mut self, incoming: Self, mode: MergeMode) -> MergeOutcome {
        if !self.has_same_signature(&incoming) {
            debug!("signatures differ, merge rejected");
            return MergeOutcome::Rejected(incoming);
        }

        let (value, attributes, children) = incoming.into_parts();
        self.set_value(value);
        self.set_attributes(attributes);

        for child in children {
            let existing = match mode {
                MergeMode::Compatible => self.namesake_index(&child),
                MergeMode::Strict => self.signature_match_index(&child),
            };

            let Some(index) = existing else {
                self.add_child(child);
                continue;
            };

            let rejected = self
                .children_mut()
                .get_mut(index)
                .and_then(|existing| existing.merge_with(child, mode).into_rejected());
            if let Some(rejected) = rejected {
                self.add_child(rejected);
            }
        }

        MergeOutcome::Merged
    }

    /// Parse `xml` and merge it onto this node.
    ///
    /// Returns the freshly parsed tree, not this node and not the merge outcome.
    #[instrument(level = "debug", skip_all, fields(node = %self.name()))]
    pub fn merge_from_str(&mut self, xml: &str) -> Result<Self> {
        let parsed = Self::from_xml_str(xml)?;
        let outcome = self.merge(parsed.clone());
        debug!(merged = outcome.is_merged(), "merged parsed string");
        Ok(parsed)
    }

    /// Load the file at `path` and merge it onto this node.
    ///
    /// Returns the freshly parsed tree, not this node and not the merge outcome.
    #[instrument(level = "debug", skip_all, fields(node = %self.name(), path = %path.as_ref().display()))]
    pub fn merge_from_file(&mut self, path: impl AsRef<Path>) -> Result<Self> {
        let parsed = Self::from_file(path)?;
        let outcome = self.merge(parsed.clone());
        debug!(merged = outcome.is_merged(), "merged parsed file");
        Ok(parsed)
    }

    /// Index of the first child found at `<own name>/<child name>`
    fn namesake_index(&self, child: &Self) -> Option<usize> {
        let path = format!("{}/{}", self.name(), child.name());
        let found = self.get_child(&path)?;
        self.children()
            .iter()
            .position(|candidate| candidate.is_same(found))
    }

    fn signature_match_index(&self, child: &Self) -> Option<usize> {
        let signature = child.signature();
        self.children().iter().position(|candidate| {
            candidate.name() == child.name() && candidate.signature() == signature
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(node: &Node) -> Vec<&str> {
        node.children().iter().map(Node::name).collect()
    }

    #[test]
    fn test_matching_signature_overwrites_value_and_attributes() {
        let mut target = Node::new("item").with_attribute("id", "1").with_value("old");
        let incoming = Node::new("item").with_attribute("id", "1").with_value("new");

        let outcome = target.merge(incoming.clone());

        assert!(outcome.is_merged());
        assert_eq!(target.value(), Some("new"));
        assert_eq!(target.attributes(), incoming.attributes());
    }

    #[test]
    fn test_absent_incoming_value_clears_target_value() {
        let mut target = Node::new("item").with_value("old");
        assert!(target.merge(Node::new("item")).is_merged());
        assert_eq!(target.value(), None);
    }

    #[test]
    fn test_mismatched_signature_rejects() {
        let mut target = Node::new("item").with_attribute("id", "1").with_value("old");
        let before = target.clone();
        let incoming = Node::new("item").with_attribute("id", "2");

        let outcome = target.merge(incoming.clone());

        assert_eq!(outcome, MergeOutcome::Rejected(incoming));
        assert_eq!(target, before);
    }

    #[test]
    fn test_children_merge_or_append() {
        let mut target = Node::new("config")
            .with_child(Node::new("db").with_attribute("host", "a").with_value("x"))
            .with_child(Node::new("cache"));
        let incoming = Node::new("config")
            .with_child(Node::new("db").with_attribute("host", "a").with_value("y"))
            .with_child(Node::new("log").with_value("debug"));

        assert!(target.merge(incoming).is_merged());

        assert_eq!(names(&target), vec!["db", "cache", "log"]);
        assert_eq!(target.get_child("config/db").and_then(Node::value), Some("y"));
    }

    #[test]
    fn test_compatible_mode_accumulates_duplicates() {
        let incoming = Node::new("config")
            .with_child(Node::new("item").with_attribute("id", "1"))
            .with_child(Node::new("item").with_attribute("id", "2"));
        let mut target = incoming.clone();

        assert!(target.merge(incoming.clone()).is_merged());
        assert_eq!(target.children().len(), 3);
        assert!(target.merge(incoming).is_merged());
        assert_eq!(target.children().len(), 4);

        let ids: Vec<Option<&str>> = target.children().iter().map(|c| c.attribute("id")).collect();
        assert_eq!(ids, vec![Some("1"), Some("2"), Some("2"), Some("2")]);
    }

    #[test]
    fn test_strict_mode_merges_by_signature() {
        let incoming = Node::new("config")
            .with_child(Node::new("item").with_attribute("id", "1"))
            .with_child(Node::new("item").with_attribute("id", "2").with_value("v2"));
        let mut target = incoming.clone();

        assert!(target.merge_with(incoming.clone(), MergeMode::Strict).is_merged());
        assert!(target.merge_with(incoming, MergeMode::Strict).is_merged());

        assert_eq!(target.children().len(), 2);
        assert_eq!(target.children().get(1).and_then(Node::value), Some("v2"));
    }

    #[test]
    fn test_merge_recurses_into_grandchildren() {
        let mut target = Node::new("a").with_child(
            Node::new("b").with_child(Node::new("c").with_attribute("k", "v").with_value("1")),
        );
        let incoming = Node::new("a").with_child(
            Node::new("b").with_child(Node::new("c").with_attribute("k", "v").with_value("2")),
        );

        assert!(target.merge(incoming).is_merged());
        assert_eq!(target.first_match("a/b/c").and_then(Node::value), Some("2"));
        assert_eq!(target.resolve("a/b/c").into_vec().len(), 1);
    }

    #[test]
    fn test_merge_from_str_returns_parsed_tree() -> Result<()> {
        let mut target = Node::new("config").with_attribute("id", "1");

        let parsed = target.merge_from_str("<config id=\"1\"><extra/></config>")?;

        assert_eq!(parsed.name(), "config");
        assert_eq!(names(&parsed), vec!["extra"]);
        assert_eq!(names(&target), vec!["extra"]);
        Ok(())
    }

    #[test]
    fn test_merge_from_str_mismatch_still_returns_parsed_tree() -> Result<()> {
        let mut target = Node::new("config").with_attribute("id", "1");

        let parsed = target.merge_from_str("<config id=\"2\"/>")?;

        assert_eq!(parsed.attribute("id"), Some("2"));
        assert_eq!(target.attribute("id"), Some("1"));
        Ok(())
    }
}
