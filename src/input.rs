//! Input abstraction for different sources

/// Input source abstraction
///
/// The source name ends up in every [`Diagnostic`](crate::Diagnostic) produced
/// while parsing this input.
#[derive(Clone, Debug)]
pub struct Input<'a> {
    source: &'a [u8],
    name: Option<&'a str>,
}

impl<'a> Input<'a> {
    /// Create from byte slice
    pub const fn from_bytes(source: &'a [u8]) -> Self {
        Self { source, name: None }
    }

    /// Create from string
    pub const fn from_str(source: &'a str) -> Self {
        Self {
            source: source.as_bytes(),
            name: None,
        }
    }

    /// Set source name for error reporting
    pub const fn with_name(mut self, name: &'a str) -> Self {
        self.name = Some(name);
        self
    }

    /// Get source bytes
    pub const fn as_bytes(&self) -> &'a [u8] {
        self.source
    }

    /// Get source name if set
    pub const fn name(&self) -> Option<&'a str> {
        self.name
    }
}
