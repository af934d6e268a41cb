//! Configuration node model
//!
//! A [`Node`] exclusively owns its children, so a tree of nodes has no parent
//! links and no cycles. Structural comparison is available through `==`;
//! [`Node::is_same`] answers whether two references point at one instance.

use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

/// Ordered attribute map of a node
pub type Attributes = IndexMap<String, String>;

/// One element of a configuration tree
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    name: String,
    value: Option<String>,
    attributes: Attributes,
    children: Vec<Node>,
    schema_file: Option<PathBuf>,
}

impl Node {
    /// Create an empty node with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builder style value setter
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Builder style attribute setter
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Builder style child appender
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn set_value(&mut self, value: Option<String>) {
        self.value = value;
    }

    /// Attribute stored under `key`
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Store a single attribute, overwriting an existing one in place
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Replace the whole attribute map, dropping every previous attribute
    pub fn set_attributes(&mut self, attributes: Attributes) {
        self.attributes = attributes;
    }

    /// Add attributes; only colliding keys are overwritten
    pub fn append_attributes<I, K, V>(&mut self, attributes: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in attributes {
            self.attributes.insert(key.into(), value.into());
        }
    }

    /// Append a child. Duplicates are allowed.
    pub fn add_child(&mut self, child: Self) -> &mut Self {
        self.children.push(child);
        self
    }

    /// Append a new child built from a name and a value
    pub fn add_child_with_value(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.children.push(Self::new(name).with_value(value));
    }

    pub fn children(&self) -> &[Self] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Self> {
        &mut self.children
    }

    /// Replace all children
    pub fn set_children(&mut self, children: Vec<Self>) {
        self.children = children;
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn schema_file(&self) -> Option<&Path> {
        self.schema_file.as_deref()
    }

    pub fn set_schema_file(&mut self, schema_file: impl Into<PathBuf>) {
        self.schema_file = Some(schema_file.into());
    }

    /// Identity comparison: true only for the very same instance
    pub fn is_same(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }

    pub(crate) fn into_parts(self) -> (Option<String>, Attributes, Vec<Self>) {
        (self.value, self.attributes, self.children)
    }
}

/// Renders the node value, or nothing when the node has none
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value().unwrap_or_default())
    }
}
