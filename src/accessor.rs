//! Generic accessor
//!
//! `get` looks for a child of the given name first and falls back to the
//! attribute stored under that name; `set` always writes an attribute.
//! [`Node::call`] accepts accessor calls by name (`getPort`, `setHost`) for
//! hosts that dispatch on strings.

use crate::error::{Error, ErrorKind, Result};
use crate::node::Node;

/// What a `get` found
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Accessed<'a> {
    Child(&'a Node),
    Attribute(&'a str),
}

impl<'a> Accessed<'a> {
    pub fn as_child(&self) -> Option<&'a Node> {
        match self {
            Self::Child(node) => Some(node),
            Self::Attribute(_) => None,
        }
    }

    pub fn as_attribute(&self) -> Option<&'a str> {
        match self {
            Self::Child(_) => None,
            Self::Attribute(value) => Some(value),
        }
    }
}

impl Node {
    /// Child at `/<own name>/<key>`, else the attribute `key`
    pub fn get(&self, key: &str) -> Option<Accessed<'_>> {
        let path = format!("/{}/{}", self.name(), key);
        if let Some(child) = self.get_child(&path) {
            return Some(Accessed::Child(child));
        }
        self.attribute(key).map(Accessed::Attribute)
    }

    /// Store `value` as the attribute `key`
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.set_attribute(key, value);
    }

    /// Dispatch a named accessor call.
    ///
    /// `getX` maps to [`Node::get`] and `setX` to [`Node::set`] with the key
    /// `x` (first character lowercased). `setX` takes exactly one argument.
    /// Every other shape fails with [`ErrorKind::InvalidAccessor`].
    pub fn call(&mut self, method: &str, args: &[&str]) -> Result<Option<Accessed<'_>>> {
        let invalid = || {
            Error::detached(ErrorKind::InvalidAccessor {
                call: method.to_string(),
                args: args.iter().map(ToString::to_string).collect(),
            })
        };

        let (verb, member) = match (method.get(..3), method.get(3..)) {
            (Some(verb), Some(member)) if !member.is_empty() => (verb, member),
            _ => return Err(invalid()),
        };
        let key = lowercase_first(member);

        match (verb, args) {
            ("get", []) => Ok(self.get(&key)),
            ("set", [value]) => {
                self.set(&key, *value);
                Ok(None)
            }
            _ => Err(invalid()),
        }
    }
}

fn lowercase_first(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
