//! Conversion between configuration nodes and XML documents

use std::fs;
use std::path::Path;

use tracing::{debug, info, instrument};

use crate::error::{Error, Result};
use crate::input::Input;
use crate::node::Node;
use crate::xml::{writer, Content, Document, Element, ParseConfig, Parser, WriteConfig};

/// Namespace given to the root element by [`Node::save`] and [`Node::validate`]
pub const DEFAULT_NAMESPACE: &str = "http://www.appserver.io/appserver";

impl From<&Element> for Node {
    fn from(element: &Element) -> Self {
        let mut node = Self::new(element.name.as_str());

        let text = element.text();
        let text = text.trim();
        if !text.is_empty() {
            node.set_value(Some(text.to_string()));
        }

        node.append_attributes(
            element
                .attributes
                .iter()
                .map(|(key, value)| (key.as_str(), value.as_str())),
        );

        for child in element.elements() {
            node.add_child(Self::from(child));
        }
        node
    }
}

impl From<&Document> for Node {
    fn from(doc: &Document) -> Self {
        Self::from(&doc.root)
    }
}

impl Node {
    /// Parse a configuration tree from an XML string
    pub fn from_xml_str(xml: &str) -> Result<Self> {
        Self::from_xml_str_with_config(xml, ParseConfig::default())
    }

    /// Parse a configuration tree from an XML string with custom parser limits
    pub fn from_xml_str_with_config(xml: &str, config: ParseConfig) -> Result<Self> {
        let input = Input::from_str(xml);
        let doc = Parser::from_input(&input, config).parse()?;
        Ok(Self::from(&doc))
    }

    /// Build a configuration tree from an already parsed document
    pub fn from_document(doc: &Document) -> Self {
        Self::from(doc)
    }

    /// Load a configuration tree from an XML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_file_with_config(path, ParseConfig::default())
    }

    /// Load a configuration tree from an XML file with custom parser limits.
    ///
    /// Diagnostics of a failed parse name the file as their source.
    #[instrument(level = "debug", skip(path, config), fields(path = %path.as_ref().display()))]
    pub fn from_file_with_config(path: impl AsRef<Path>, config: ParseConfig) -> Result<Self> {
        let path = path.as_ref();
        let name = path.display().to_string();
        debug!("reading configuration file");

        let bytes = fs::read(path).map_err(|err| Error::io(name.as_str(), &err))?;
        let input = Input::from_bytes(&bytes).with_name(&name);
        let doc = Parser::from_input(&input, config).parse()?;

        info!(root = %doc.root.name, "configuration file loaded");
        Ok(Self::from(&doc))
    }

    /// Build the XML element for this node and its subtree.
    ///
    /// `namespace` is applied to this element only; children are always
    /// created without one.
    pub fn to_element(&self, namespace: Option<&str>) -> Element {
        let mut element = Element::new(self.name());
        element.namespace = namespace.map(str::to_string);
        element.attributes = self.attributes().clone();

        if let Some(value) = self.value() {
            element.children.push(Content::Text(value.to_string()));
        }
        for child in self.children() {
            element
                .children
                .push(Content::Element(child.to_element(None)));
        }
        element
    }

    /// Build an XML document rooted at this node
    pub fn to_document(&self, namespace: Option<&str>) -> Document {
        Document {
            root: self.to_element(namespace),
        }
    }

    /// Serialize this node to an XML string
    pub fn to_xml_string(&self, namespace: Option<&str>, config: &WriteConfig) -> String {
        writer::to_string(&self.to_document(namespace), config)
    }

    /// Write this node to `path` under [`DEFAULT_NAMESPACE`] with the default
    /// writer configuration
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.save_with(path, Some(DEFAULT_NAMESPACE), &WriteConfig::default())
    }

    /// Write this node to `path`; pass `None` to leave the root without a namespace
    #[instrument(level = "debug", skip(self, path, config), fields(path = %path.as_ref().display()))]
    pub fn save_with(
        &self,
        path: impl AsRef<Path>,
        namespace: Option<&str>,
        config: &WriteConfig,
    ) -> Result<()> {
        let path = path.as_ref();
        let xml = self.to_xml_string(namespace, config);
        fs::write(path, xml).map_err(|err| Error::io(path.display().to_string(), &err))?;
        info!(root = %self.name(), "configuration saved");
        Ok(())
    }
}
