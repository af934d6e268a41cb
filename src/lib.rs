//! zconf - hierarchical XML configuration trees
//!
//! A configuration is a tree of [`Node`]s built from an XML document. Nodes
//! are queried with slash delimited paths anchored at the queried node,
//! merged with other trees when their signatures match, and written back to
//! XML, optionally after validation against an external schema.
//!
//! # Quick Start
//!
//! ```
//! use zconf::Node;
//! # fn main() -> Result<(), zconf::Error> {
//! let mut config = Node::from_xml_str(r#"<config id="1"><item x="a"/><item x="b"/></config>"#)?;
//! let items = config.resolve("config/item").into_vec();
//! assert_eq!(items.len(), 2);
//!
//! let _parsed = config.merge_from_str(r#"<config id="1"><log level="debug"/></config>"#)?;
//! assert!(config.get_child("config/log").is_some());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub use error::{Diagnostic, Error, ErrorKind, Pos, Result, Span};

pub mod input;
pub use input::Input;

pub mod xml;
pub use xml::{
    Content as XmlContent, Document as XmlDocument, Element as XmlElement, ParseConfig,
    Parser as XmlParser, WriteConfig,
};

pub mod node;
pub use node::{Attributes, Node};

pub mod signature;
pub use signature::Signature;

pub mod path;
pub use path::{Accumulation, Resolved};

pub mod merge;
pub use merge::{MergeMode, MergeOutcome};

pub mod convert;
pub use convert::DEFAULT_NAMESPACE;

pub mod validate;
pub use validate::SchemaValidator;

pub mod accessor;
pub use accessor::Accessed;

/// Parse a configuration tree from an XML string
pub fn from_xml_str(s: &str) -> Result<Node> {
    Node::from_xml_str(s)
}

/// Load a configuration tree from an XML file
pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Node> {
    Node::from_file(path)
}

/// Serialize a configuration tree under [`DEFAULT_NAMESPACE`] with the default
/// writer configuration
pub fn to_xml_string(node: &Node) -> String {
    node.to_xml_string(Some(DEFAULT_NAMESPACE), &WriteConfig::default())
}
