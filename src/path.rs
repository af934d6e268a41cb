//! Slash delimited path queries
//!
//! Paths are anchored: the first token has to equal the name of the node the
//! query starts at. `"config/item"` asked of a node named `config` yields its
//! `item` children; a single matching token yields the node itself.
//!
//! Results come in three shapes, see [`Resolved`]. When a recursive step
//! returns a collection it replaces everything accumulated so far at that
//! level; [`Accumulation::Concatenate`] switches to appending instead.

use crate::node::Node;

/// Outcome of resolving a path
#[derive(Clone, Debug, PartialEq)]
pub enum Resolved<'a> {
    /// First token did not match the node name
    NotFound,
    /// Path ended at the node itself
    One(&'a Node),
    /// Matches below the node, possibly none
    Many(Vec<&'a Node>),
}

impl<'a> Resolved<'a> {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// Flatten into a list of nodes
    pub fn into_vec(self) -> Vec<&'a Node> {
        match self {
            Self::NotFound => Vec::new(),
            Self::One(node) => vec![node],
            Self::Many(nodes) => nodes,
        }
    }
}

/// How collection results of deeper levels are combined
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Accumulation {
    /// A collection returned by a child replaces the running result
    #[default]
    LastCollectionWins,
    /// Collections returned by children are appended
    Concatenate,
}

/// Split a path into its first token and the remainder after that token.
///
/// Leading slashes are skipped when looking for the token; the remainder is
/// everything past the token length plus one separator, counted from the
/// start of the raw path.
pub fn split_path(path: &str) -> (&str, &str) {
    let token = path
        .trim_start_matches('/')
        .split('/')
        .next()
        .unwrap_or_default();
    let remainder = path.get(token.len() + 1..).unwrap_or_default();
    (token, remainder)
}

impl Node {
    /// Resolve `path` against this node
    pub fn resolve(&self, path: &str) -> Resolved<'_> {
        self.resolve_with(path, Accumulation::default())
    }

    /// Resolve `path` with an explicit accumulation rule
    pub fn resolve_with(&self, path: &str, accumulation: Accumulation) -> Resolved<'_> {
        let (token, remainder) = split_path(path);
        if token.is_empty() || self.name() != token {
            return Resolved::NotFound;
        }
        if remainder.is_empty() {
            return Resolved::One(self);
        }

        let mut matches = Vec::new();
        for child in self.children() {
            match child.resolve_with(remainder, accumulation) {
                Resolved::NotFound => {}
                Resolved::One(node) => matches.push(node),
                Resolved::Many(nodes) => match accumulation {
                    Accumulation::LastCollectionWins => matches = nodes,
                    Accumulation::Concatenate => matches.extend(nodes),
                },
            }
        }
        Resolved::Many(matches)
    }

    /// First node of a collection result.
    ///
    /// A path that ends at this node itself resolves to a single node, not a
    /// collection, and yields `None` here. Use [`Node::first_match`] to get
    /// that node as well.
    pub fn get_child(&self, path: &str) -> Option<&Self> {
        match self.resolve(path) {
            Resolved::Many(nodes) => nodes.into_iter().next(),
            Resolved::One(_) | Resolved::NotFound => None,
        }
    }

    /// First node of a collection result, or the single node result
    pub fn first_match(&self, path: &str) -> Option<&Self> {
        match self.resolve(path) {
            Resolved::Many(nodes) => nodes.into_iter().next(),
            Resolved::One(node) => Some(node),
            Resolved::NotFound => None,
        }
    }

    /// Drop all children when the first token matches and more tokens follow.
    /// Any other path leaves the node untouched.
    pub fn remove_children(&mut self, path: &str) -> &mut Self {
        let (token, remainder) = split_path(path);
        if !token.is_empty() && self.name() == token && !remainder.is_empty() {
            self.children_mut().clear();
        }
        self
    }
}
