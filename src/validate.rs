//! Schema validation of configuration trees
//!
//! The schema language itself is handled by an external engine plugged in
//! through [`SchemaValidator`]. This module checks the preconditions,
//! serializes the tree and reports the first problem the engine finds.

use std::path::Path;

use tracing::{debug, instrument, warn};

use crate::error::{Diagnostic, Error, ErrorKind, Result};
use crate::convert::DEFAULT_NAMESPACE;
use crate::node::Node;
use crate::xml::Document;

/// External schema engine
pub trait SchemaValidator {
    /// Check `document` against the schema stored at `schema`.
    ///
    /// On failure returns the diagnostics in the order the engine found them.
    fn validate(
        &self,
        schema: &Path,
        document: &Document,
    ) -> std::result::Result<(), Vec<Diagnostic>>;
}

impl<F> SchemaValidator for F
where
    F: Fn(&Path, &Document) -> std::result::Result<(), Vec<Diagnostic>>,
{
    fn validate(
        &self,
        schema: &Path,
        document: &Document,
    ) -> std::result::Result<(), Vec<Diagnostic>> {
        self(schema, document)
    }
}

impl Node {
    /// Validate this tree, serialized under [`DEFAULT_NAMESPACE`], against its
    /// schema file, returning the validated document
    pub fn validate<V>(&self, validator: &V) -> Result<Document>
    where
        V: SchemaValidator + ?Sized,
    {
        self.validate_with(validator, Some(DEFAULT_NAMESPACE))
    }

    /// Validate this tree serialized with `namespace` on the root element
    #[instrument(level = "debug", skip_all, fields(root = %self.name()))]
    pub fn validate_with<V>(&self, validator: &V, namespace: Option<&str>) -> Result<Document>
    where
        V: SchemaValidator + ?Sized,
    {
        let Some(schema) = self.schema_file() else {
            return Err(Error::detached(ErrorKind::MissingSchema));
        };
        if !schema.exists() {
            return Err(Error::detached(ErrorKind::SchemaUnavailable {
                path: schema.to_path_buf(),
            }));
        }

        let document = self.to_document(namespace);
        match validator.validate(schema, &document) {
            Ok(()) => {
                debug!(schema = %schema.display(), "configuration is valid");
                Ok(document)
            }
            Err(diagnostics) => {
                warn!(
                    schema = %schema.display(),
                    problems = diagnostics.len(),
                    "configuration does not match schema"
                );
                // only the first problem is reported
                let diagnostic = diagnostics.into_iter().next().unwrap_or_else(|| {
                    Diagnostic::new(0, 0, 0, "document rejected by schema validator")
                });
                Err(Error::detached(ErrorKind::SchemaViolation { diagnostic }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accept_all(_: &Path, _: &Document) -> std::result::Result<(), Vec<Diagnostic>> {
        Ok(())
    }

    #[test]
    fn test_missing_schema() {
        let node = Node::new("config");
        let err = node.validate(&accept_all).err();
        assert_eq!(err.as_ref().map(Error::kind), Some(&ErrorKind::MissingSchema));
    }

    #[test]
    fn test_schema_unavailable() {
        let mut node = Node::new("config");
        node.set_schema_file("/no/such/schema.xsd");
        let err = node.validate(&accept_all).err();
        assert!(matches!(
            err.as_ref().map(Error::kind),
            Some(ErrorKind::SchemaUnavailable { path }) if path == Path::new("/no/such/schema.xsd")
        ));
    }

    #[test]
    fn test_rejection_without_diagnostics_still_fails() -> std::io::Result<()> {
        let schema = tempfile::NamedTempFile::new()?;
        let mut node = Node::new("config");
        node.set_schema_file(schema.path());

        let reject =
            |_: &Path, _: &Document| -> std::result::Result<(), Vec<Diagnostic>> { Err(Vec::new()) };
        let err = node.validate(&reject).err();
        assert!(matches!(
            err.as_ref().map(Error::kind),
            Some(ErrorKind::SchemaViolation { .. })
        ));
        Ok(())
    }
}
