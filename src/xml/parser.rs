//! XML parser implementation
//!
//! Problems the parser can step over (duplicate attributes, unknown entities,
//! mismatched closing tags) are recorded and parsing continues; anything else
//! stops it. Either way a failed parse yields one [`ErrorKind::Malformed`]
//! error listing every recorded diagnostic.

use std::borrow::Cow;

use crate::error::{Diagnostic, Error, ErrorKind, Result, Span};
use crate::input::Input;
use crate::xml::cursor::Cursor;
use crate::xml::model::{Content, Document, Element};

const BOM: &[u8] = b"\xEF\xBB\xBF";

/// Configuration for the XML parser
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Maximum element nesting depth (0 means unlimited)
    pub max_depth: u16,
    /// Maximum input size in bytes (0 means unlimited)
    pub max_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: 128,
            max_size: 10 * 1024 * 1024, // 10 MB default
        }
    }
}

impl Config {
    /// Create a new config with unlimited depth and size
    pub const fn unlimited() -> Self {
        Self {
            max_depth: 0,
            max_size: 0,
        }
    }

    /// Create a new config with specific limits
    pub const fn new(max_depth: u16, max_size: usize) -> Self {
        Self {
            max_depth,
            max_size,
        }
    }
}

/// XML parser
#[derive(Debug)]
pub struct Parser<'a> {
    cursor: Cursor<'a>,
    config: Config,
    source: Option<&'a str>,
    depth: u16,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Parser<'a> {
    /// Create a new XML parser
    pub fn new(input: &'a [u8]) -> Self {
        Self::with_config(input, Config::default())
    }

    /// Create a parser with custom limits
    pub fn with_config(input: &'a [u8], config: Config) -> Self {
        Self {
            cursor: Cursor::new(input),
            config,
            source: None,
            depth: 0,
            diagnostics: Vec::new(),
        }
    }

    /// Create a parser for a named input; the name is attached to diagnostics
    pub fn from_input(input: &Input<'a>, config: Config) -> Self {
        let mut parser = Self::with_config(input.as_bytes(), config);
        parser.source = input.name();
        parser
    }

    /// Parse an XML document
    pub fn parse(&mut self) -> Result<Document> {
        match self.parse_document() {
            Ok(root) if self.diagnostics.is_empty() => Ok(Document { root }),
            Ok(_) => Err(Error::malformed(std::mem::take(&mut self.diagnostics))),
            Err(err) => {
                let diagnostic = Diagnostic::from_error(&err, self.source);
                self.diagnostics.push(diagnostic);
                Err(Error::malformed(std::mem::take(&mut self.diagnostics)))
            }
        }
    }

    fn parse_document(&mut self) -> Result<Element> {
        if self.config.max_size > 0 && self.cursor.len() > self.config.max_size {
            return Err(Error::new(
                ErrorKind::MaxSizeExceeded {
                    max: self.config.max_size,
                },
                Span::empty(),
            ));
        }

        if self.cursor.starts_with(BOM) {
            self.cursor.advance_by(BOM.len());
        }

        self.skip_misc()?;
        if self.cursor.is_eof() {
            return Err(self.error_here(ErrorKind::UnexpectedEof, "missing root element"));
        }
        let root = self.parse_element()?;
        self.skip_misc()?;

        if !self.cursor.is_eof() {
            return Err(self.error_here(
                ErrorKind::TrailingContent,
                "content after the root element",
            ));
        }

        Ok(root)
    }

    /// Skip whitespace, comments, processing instructions and doctype
    fn skip_misc(&mut self) -> Result<()> {
        loop {
            self.skip_whitespace();
            if self.cursor.starts_with(b"<?") {
                self.skip_processing_instruction()?;
            } else if self.cursor.starts_with(b"<!--") {
                self.skip_comment()?;
            } else if self.cursor.starts_with(b"<!") {
                self.skip_declaration()?;
            } else {
                return Ok(());
            }
        }
    }

    fn parse_element(&mut self) -> Result<Element> {
        self.expect_byte(b'<')?;

        if self.cursor.current() == Some(b'/') {
            return Err(self.error_here(ErrorKind::InvalidToken, "unexpected closing tag"));
        }

        let name = self.parse_name()?;
        self.enter_element()?;

        let mut element = Element::new(name);
        self.parse_attributes(&mut element)?;

        if self.cursor.current() == Some(b'/') {
            self.cursor.advance();
            self.expect_byte(b'>')?;
            self.depth -= 1;
            return Ok(element);
        }

        self.expect_byte(b'>')?;

        loop {
            if self.cursor.starts_with(b"</") {
                self.cursor.advance_by(2);
                let close_name = self.parse_name()?;
                if close_name != element.name {
                    self.report(ErrorKind::MismatchedTag {
                        expected: element.name.clone(),
                        found: close_name,
                    });
                }
                self.skip_whitespace();
                self.expect_byte(b'>')?;
                break;
            }

            if self.cursor.starts_with(b"<!--") {
                self.skip_comment()?;
                continue;
            }

            if self.cursor.starts_with(b"<![CDATA[") {
                let text = self.parse_cdata()?;
                element.children.push(Content::Text(text));
                continue;
            }

            if self.cursor.starts_with(b"<?") {
                self.skip_processing_instruction()?;
                continue;
            }

            if self.cursor.current() == Some(b'<') {
                let child = self.parse_element()?;
                element.children.push(Content::Element(child));
                continue;
            }

            if self.cursor.is_eof() {
                return Err(self.error_here(ErrorKind::UnexpectedEof, "unterminated element"));
            }

            if let Some(text) = self.parse_text()? {
                element.children.push(Content::Text(text));
            }
        }

        self.depth -= 1;
        Ok(element)
    }

    fn enter_element(&mut self) -> Result<()> {
        self.depth += 1;
        if self.config.max_depth > 0 && self.depth > self.config.max_depth {
            return Err(self.error_here(
                ErrorKind::MaxDepthExceeded {
                    max: self.config.max_depth,
                },
                "max depth exceeded",
            ));
        }
        Ok(())
    }

    fn parse_attributes(&mut self, element: &mut Element) -> Result<()> {
        loop {
            self.skip_whitespace();
            match self.cursor.current() {
                Some(b'/') | Some(b'>') => break,
                Some(_) => {}
                None => {
                    return Err(self.error_here(ErrorKind::UnexpectedEof, "unexpected end of input"))
                }
            }

            let name = self.parse_name()?;
            self.skip_whitespace();
            self.expect_byte(b'=')?;
            self.skip_whitespace();
            let value = self.parse_attribute_value()?;

            if name == "xmlns" {
                element.namespace = Some(value);
            } else if let Some(prefix) = name.strip_prefix("xmlns:") {
                element.namespaces.insert(prefix.to_string(), value);
            } else if element.attributes.contains_key(&name) {
                self.report(ErrorKind::DuplicateAttribute { name });
            } else {
                element.attributes.insert(name, value);
            }
        }

        Ok(())
    }

    fn parse_attribute_value(&mut self) -> Result<String> {
        let quote = match self.cursor.current() {
            Some(b'"') => b'"',
            Some(b'\'') => b'\'',
            _ => {
                return Err(
                    self.error_here(ErrorKind::InvalidToken, "expected quoted attribute value")
                )
            }
        };
        self.cursor.advance();

        let start = self.cursor.pos();
        while let Some(b) = self.cursor.current() {
            if b == quote {
                let raw = self.cursor.slice_from(start);
                self.cursor.advance();
                let text = self.bytes_to_string(raw)?;
                return Ok(self.decode_entities(&normalize_line_endings(&text)));
            }
            self.cursor.advance();
        }

        Err(self.error_here(ErrorKind::UnexpectedEof, "unterminated attribute value"))
    }

    fn parse_text(&mut self) -> Result<Option<String>> {
        let start = self.cursor.pos();
        while let Some(b) = self.cursor.current() {
            if b == b'<' {
                break;
            }
            self.cursor.advance();
        }

        let raw = self.cursor.slice_from(start);
        let text = self.bytes_to_string(raw)?;
        let text = self.decode_entities(&normalize_line_endings(&text));

        if text.is_empty() {
            Ok(None)
        } else {
            Ok(Some(text))
        }
    }

    fn parse_cdata(&mut self) -> Result<String> {
        self.cursor.advance_by(b"<![CDATA[".len());
        let start = self.cursor.pos();
        while !self.cursor.is_eof() {
            if self.cursor.starts_with(b"]]>") {
                let raw = self.cursor.slice_from(start);
                self.cursor.advance_by(3);
                let text = self.bytes_to_string(raw)?;
                return Ok(normalize_line_endings(&text).into_owned());
            }
            self.cursor.advance();
        }
        Err(self.error_here(ErrorKind::UnexpectedEof, "unterminated cdata section"))
    }

    fn parse_name(&mut self) -> Result<String> {
        let start = self.cursor.pos();

        let Some(first) = self.cursor.current() else {
            return Err(self.error_here(ErrorKind::UnexpectedEof, "expected name"));
        };
        if !is_name_start(first) {
            return Err(self.error_here(ErrorKind::InvalidToken, "expected name"));
        }

        self.cursor.advance();
        while let Some(b) = self.cursor.current() {
            if is_name_char(b) {
                self.cursor.advance();
            } else {
                break;
            }
        }

        let raw = self.cursor.slice_from(start);
        self.bytes_to_string(raw)
    }

    fn skip_comment(&mut self) -> Result<()> {
        self.cursor.advance_by(4);
        self.skip_until(b"-->")
    }

    fn skip_processing_instruction(&mut self) -> Result<()> {
        self.cursor.advance_by(2);
        self.skip_until(b"?>")
    }

    /// Skip a `<!...>` declaration such as DOCTYPE, internal subset included.
    ///
    /// A `>` only closes the declaration outside brackets and quoted literals.
    fn skip_declaration(&mut self) -> Result<()> {
        self.cursor.advance_by(2);
        let mut depth = 0usize;
        let mut quote: Option<u8> = None;

        while let Some(b) = self.cursor.current() {
            if quote.is_none() && self.cursor.starts_with(b"<!--") {
                self.skip_comment()?;
                continue;
            }
            self.cursor.advance();
            match (quote, b) {
                (Some(open), _) if open == b => quote = None,
                (Some(_), _) => {}
                (None, b'"' | b'\'') => quote = Some(b),
                (None, b'[') => depth += 1,
                (None, b']') => depth = depth.saturating_sub(1),
                (None, b'>') if depth == 0 => return Ok(()),
                (None, _) => {}
            }
        }

        Err(self.error_here(ErrorKind::UnexpectedEof, "unterminated declaration"))
    }

    fn skip_until(&mut self, pattern: &[u8]) -> Result<()> {
        while !self.cursor.is_eof() {
            if self.cursor.starts_with(pattern) {
                self.cursor.advance_by(pattern.len());
                return Ok(());
            }
            self.cursor.advance();
        }
        Err(self.error_here(ErrorKind::UnexpectedEof, "unterminated markup"))
    }

    fn expect_byte(&mut self, expected: u8) -> Result<()> {
        match self.cursor.current() {
            Some(b) if b == expected => {
                self.cursor.advance();
                Ok(())
            }
            Some(_) => Err(self.error_here(ErrorKind::InvalidToken, "unexpected token")),
            None => Err(self.error_here(ErrorKind::UnexpectedEof, "unexpected end of input")),
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(b) = self.cursor.current() {
            if matches!(b, b' ' | b'\t' | b'\r' | b'\n') {
                self.cursor.advance();
            } else {
                break;
            }
        }
    }

    fn bytes_to_string(&self, bytes: &[u8]) -> Result<String> {
        std::str::from_utf8(bytes)
            .map(ToString::to_string)
            .map_err(|_| self.error_here(ErrorKind::InvalidUtf8, "invalid utf-8"))
    }

    /// Replace entity references; unknown ones are reported and kept verbatim
    fn decode_entities(&mut self, input: &str) -> String {
        let mut result = String::with_capacity(input.len());
        let mut rest = input;

        while let Some(amp) = rest.find('&') {
            let (head, tail) = rest.split_at(amp);
            result.push_str(head);

            let Some(end) = tail.find(';') else {
                self.report(ErrorKind::InvalidEntity {
                    entity: tail.trim_start_matches('&').to_string(),
                });
                result.push_str(tail);
                return result;
            };

            let entity = tail.get(1..end).unwrap_or_default();
            match decode_entity(entity) {
                Some(ch) => result.push(ch),
                None => {
                    self.report(ErrorKind::InvalidEntity {
                        entity: entity.to_string(),
                    });
                    result.push_str(tail.get(..=end).unwrap_or_default());
                }
            }
            rest = tail.get(end + 1..).unwrap_or_default();
        }

        result.push_str(rest);
        result
    }

    fn report(&mut self, kind: ErrorKind) {
        let pos = self.cursor.position();
        let err = Error::new(kind, Span::at(pos));
        self.diagnostics.push(Diagnostic::from_error(&err, self.source));
    }

    fn error_here(&self, kind: ErrorKind, message: &str) -> Error {
        Error::with_message(kind, Span::at(self.cursor.position()), message)
    }
}

/// Turn `\r\n` and lone `\r` into `\n`
fn normalize_line_endings(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

fn is_name_start(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'_' | b':') || b >= 0x80
}

fn is_name_char(b: u8) -> bool {
    is_name_start(b) || matches!(b, b'0'..=b'9' | b'-' | b'.')
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => decode_numeric_entity(entity),
    }
}

fn decode_numeric_entity(entity: &str) -> Option<char> {
    if let Some(hex) = entity.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok().and_then(char::from_u32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ensure_eq<T: PartialEq + std::fmt::Debug>(left: T, right: T) -> Result<()> {
        if left == right {
            Ok(())
        } else {
            Err(Error::with_message(
                ErrorKind::InvalidToken,
                Span::empty(),
                format!("assertion failed: left={left:?} right={right:?}"),
            ))
        }
    }

    fn parse_err(input: &str) -> Result<Error> {
        match Parser::new(input.as_bytes()).parse() {
            Ok(doc) => Err(Error::with_message(
                ErrorKind::InvalidToken,
                Span::empty(),
                format!("expected failure, parsed {doc:?}"),
            )),
            Err(err) => Ok(err),
        }
    }

    #[test]
    fn test_parse_simple_element() -> Result<()> {
        let doc = Parser::new(b"<root></root>").parse()?;

        ensure_eq(doc.root.name, "root".to_string())?;
        ensure_eq(doc.root.children.len(), 0)?;
        Ok(())
    }

    #[test]
    fn test_parse_with_attributes_in_order() -> Result<()> {
        let doc = Parser::new(b"<root id=\"1\" name='test' alpha=\"z\"></root>").parse()?;

        let keys: Vec<&str> = doc.root.attributes.keys().map(String::as_str).collect();
        ensure_eq(keys, vec!["id", "name", "alpha"])?;
        ensure_eq(doc.root.attributes.get("name"), Some(&"test".to_string()))?;
        Ok(())
    }

    #[test]
    fn test_parse_prolog_comments_and_cdata() -> Result<()> {
        let input = concat!(
            "\u{feff}<?xml version=\"1.0\"?>\n<!DOCTYPE conf>\n<!-- head -->\n",
            "<conf><!-- c --><![CDATA[a<b]]></conf>\n<!-- tail -->",
        );
        let doc = Parser::new(input.as_bytes()).parse()?;

        ensure_eq(doc.root.name.as_str(), "conf")?;
        ensure_eq(doc.root.text(), "a<b".to_string())?;
        Ok(())
    }

    #[test]
    fn test_parse_namespace_declarations_are_not_attributes() -> Result<()> {
        let input = b"<conf xmlns=\"urn:conf\" xmlns:x=\"urn:x\" id=\"1\"/>";
        let doc = Parser::new(input).parse()?;

        ensure_eq(doc.root.namespace.as_deref(), Some("urn:conf"))?;
        ensure_eq(doc.root.namespaces.get("x").map(String::as_str), Some("urn:x"))?;
        ensure_eq(doc.root.attributes.len(), 1)?;
        Ok(())
    }

    #[test]
    fn test_parse_entities() -> Result<()> {
        let doc = Parser::new(b"<a v=\"&lt;&#65;&#x42;\">&amp;&quot;</a>").parse()?;

        ensure_eq(doc.root.attributes.get("v").map(String::as_str), Some("<AB"))?;
        ensure_eq(doc.root.text(), "&\"".to_string())?;
        Ok(())
    }

    #[test]
    fn test_recoverable_problems_are_all_collected() -> Result<()> {
        let err = parse_err("<a id=\"1\" id=\"2\"><b>&bogus;</c></a>")?;

        let codes: Vec<u32> = err.diagnostics().iter().map(|d| d.code).collect();
        ensure_eq(codes, vec![4, 5, 3])?;
        ensure_eq(err.message().lines().count(), 3)?;
        Ok(())
    }

    #[test]
    fn test_fatal_problem_follows_recorded_ones() -> Result<()> {
        let err = parse_err("<a id=\"1\" id=\"2\"><b>")?;

        let kinds: Vec<u32> = err.diagnostics().iter().map(|d| d.code).collect();
        ensure_eq(kinds, vec![4, 2])?;
        Ok(())
    }

    #[test]
    fn test_diagnostics_carry_source_and_line() -> Result<()> {
        let input = Input::from_str("<a>\n<b>\n</a>").with_name("app.xml");
        let err = match Parser::from_input(&input, Config::default()).parse() {
            Ok(_) => return ensure_eq("parsed", "failed"),
            Err(err) => err,
        };

        let first = err.diagnostics().first().cloned();
        ensure_eq(first.as_ref().map(|d| d.line), Some(3))?;
        ensure_eq(first.and_then(|d| d.source), Some("app.xml".to_string()))?;
        Ok(())
    }

    #[test]
    fn test_trailing_content_rejected() -> Result<()> {
        let err = parse_err("<a/><b/>")?;
        ensure_eq(
            err.diagnostics().first().map(|d| d.code),
            Some(ErrorKind::TrailingContent.code()),
        )
    }

    #[test]
    fn test_empty_input_rejected() -> Result<()> {
        let err = parse_err("  ")?;
        ensure_eq(
            err.diagnostics().first().map(|d| d.code),
            Some(ErrorKind::UnexpectedEof.code()),
        )
    }

    #[test]
    fn test_max_depth() -> Result<()> {
        let mut parser = Parser::with_config(b"<a><b><c/></b></a>", Config::new(2, 0));
        let err = match parser.parse() {
            Ok(_) => return ensure_eq("parsed", "failed"),
            Err(err) => err,
        };
        ensure_eq(
            err.diagnostics().first().map(|d| d.code),
            Some(ErrorKind::MaxDepthExceeded { max: 2 }.code()),
        )?;

        let mut unlimited = Parser::with_config(b"<a><b><c/></b></a>", Config::unlimited());
        ensure_eq(unlimited.parse().is_ok(), true)
    }

    #[test]
    fn test_doctype_internal_subset_skipped() -> Result<()> {
        let input = concat!(
            "<!DOCTYPE config [\n  <!ELEMENT config ANY>\n",
            "  <!ATTLIST config id CDATA \"]>\">\n  <!-- it's ] -->\n]>\n",
            "<config id=\"1\"/>",
        );
        let doc = Parser::new(input.as_bytes()).parse()?;

        ensure_eq(doc.root.name.as_str(), "config")?;
        ensure_eq(doc.root.attributes.get("id").map(String::as_str), Some("1"))
    }

    #[test]
    fn test_unterminated_doctype_rejected() -> Result<()> {
        let err = parse_err("<!DOCTYPE config [ <!ELEMENT config ANY> >")?;
        ensure_eq(
            err.diagnostics().first().map(|d| d.code),
            Some(ErrorKind::UnexpectedEof.code()),
        )
    }

    #[test]
    fn test_line_endings_normalized() -> Result<()> {
        let doc = Parser::new(b"<a v=\"x\r\ny\">x\r\ny\rz<![CDATA[\r\n]]>&#13;</a>").parse()?;

        ensure_eq(doc.root.attributes.get("v").map(String::as_str), Some("x\ny"))?;
        ensure_eq(doc.root.text(), "x\ny\nz\n\r".to_string())
    }

    #[test]
    fn test_max_size() -> Result<()> {
        let mut parser = Parser::with_config(b"<configuration/>", Config::new(0, 4));
        ensure_eq(parser.parse().is_err(), true)
    }
}
