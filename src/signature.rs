//! Content signature of a node
//!
//! A signature hashes the node name followed by its attribute values in map
//! order. Attribute keys, the node value and children do not take part.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::node::Node;

/// Hex encoded SHA-256 over name and attribute values
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Signature(String);

impl Signature {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Node {
    /// Signature used to decide whether two nodes can be merged
    pub fn signature(&self) -> Signature {
        let mut hasher = Sha256::new();
        hasher.update(self.name().as_bytes());
        for value in self.attributes().values() {
            hasher.update(value.as_bytes());
        }
        Signature(hex::encode(hasher.finalize()))
    }

    pub fn has_same_signature(&self, other: &Self) -> bool {
        self.signature() == other.signature()
    }
}
