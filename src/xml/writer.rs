//! XML serialization

use crate::xml::model::{Content, Document, Element};

/// Configuration for the XML writer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Emit the `<?xml version="1.0" encoding="UTF-8"?>` declaration
    pub declaration: bool,
    /// Spaces per nesting level, `None` writes everything on one line
    pub indent: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            declaration: true,
            indent: Some(2),
        }
    }
}

impl Config {
    /// Single line output without declaration
    pub const fn compact() -> Self {
        Self {
            declaration: false,
            indent: None,
        }
    }
}

/// Serialize a document to a string
pub fn to_string(doc: &Document, config: &Config) -> String {
    let mut output = String::new();
    if config.declaration {
        output.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>");
        if config.indent.is_some() {
            output.push('\n');
        }
    }
    write_element(&doc.root, config, 0, &mut output);
    if config.indent.is_some() {
        output.push('\n');
    }
    output
}

fn write_element(element: &Element, config: &Config, level: usize, output: &mut String) {
    output.push('<');
    output.push_str(&element.name);

    if let Some(namespace) = &element.namespace {
        write_attribute("xmlns", namespace, output);
    }
    for (prefix, uri) in &element.namespaces {
        write_attribute(&format!("xmlns:{prefix}"), uri, output);
    }
    for (key, value) in &element.attributes {
        write_attribute(key, value, output);
    }

    if element.children.is_empty() {
        output.push_str("/>");
        return;
    }

    output.push('>');

    let has_elements = element.elements().next().is_some();
    for child in &element.children {
        match child {
            Content::Element(child) => {
                newline(config, level + 1, output);
                write_element(child, config, level + 1, output);
            }
            Content::Text(text) => output.push_str(&escape_xml(text)),
        }
    }

    if has_elements {
        newline(config, level, output);
    }
    output.push_str("</");
    output.push_str(&element.name);
    output.push('>');
}

fn write_attribute(key: &str, value: &str, output: &mut String) {
    output.push(' ');
    output.push_str(key);
    output.push_str("=\"");
    output.push_str(&escape_xml(value));
    output.push('"');
}

fn newline(config: &Config, level: usize, output: &mut String) {
    if let Some(indent) = config.indent {
        output.push('\n');
        output.extend(std::iter::repeat(' ').take(indent * level));
    }
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
