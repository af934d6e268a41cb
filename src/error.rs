//! Error types for zconf

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Position in source code
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pos {
    pub offset: usize,
    pub line: u32,
    pub col: u32,
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.offset, self.line, self.col)
    }
}

impl Pos {
    pub const fn new(offset: usize, line: u32, col: u32) -> Self {
        Self { offset, line, col }
    }
}

/// Span representing a range in source code
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    pub start: Pos,
    pub end: Pos,
}

impl Span {
    pub const fn at(pos: Pos) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    pub const fn empty() -> Self {
        Self {
            start: Pos::new(0, 0, 0),
            end: Pos::new(0, 0, 0),
        }
    }

    pub fn is_empty(self) -> bool {
        self == Self::empty()
    }
}

/// A single problem reported while loading or validating a document.
///
/// Parser diagnostics carry a code derived from [`ErrorKind::code`]; schema
/// validators supply their own codes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: u32,
    pub column: u32,
    pub code: u32,
    pub message: String,
    /// File the problem was found in, `None` for in-memory input
    pub source: Option<String>,
}

impl Diagnostic {
    pub fn new(line: u32, column: u32, code: u32, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            code,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Build a diagnostic from a positioned error
    pub fn from_error(err: &Error, source: Option<&str>) -> Self {
        Self {
            line: err.span.start.line,
            column: err.span.start.col,
            code: err.kind.code(),
            message: err.message.clone(),
            source: source.map(str::to_string),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "error on line {} with code {} and message {} in {}",
            self.line,
            self.code,
            self.message,
            self.source.as_deref().unwrap_or("<string>")
        )
    }
}

/// Error kind for detailed categorization
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    #[error("invalid token")]
    InvalidToken,
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("mismatched closing tag: expected </{expected}>, found </{found}>")]
    MismatchedTag { expected: String, found: String },
    #[error("duplicate attribute: {name}")]
    DuplicateAttribute { name: String },
    #[error("invalid xml entity: &{entity};")]
    InvalidEntity { entity: String },
    #[error("invalid utf-8")]
    InvalidUtf8,
    #[error("content after the root element")]
    TrailingContent,
    #[error("max depth exceeded: {max}")]
    MaxDepthExceeded { max: u16 },
    #[error("max size exceeded: {max}")]
    MaxSizeExceeded { max: usize },
    #[error("malformed document ({} problems)", .diagnostics.len())]
    Malformed { diagnostics: Vec<Diagnostic> },
    #[error("io error on {path}: {reason}")]
    Io { path: String, reason: String },
    #[error("missing schema file for validation")]
    MissingSchema,
    #[error("schema file {} for validation not available", .path.display())]
    SchemaUnavailable { path: PathBuf },
    #[error("schema violation: {diagnostic}")]
    SchemaViolation { diagnostic: Diagnostic },
    #[error("invalid accessor call {call}({})", .args.join(", "))]
    InvalidAccessor { call: String, args: Vec<String> },
}

impl ErrorKind {
    /// Stable numeric code used when the error is reported as a [`Diagnostic`]
    pub fn code(&self) -> u32 {
        match self {
            Self::InvalidToken => 1,
            Self::UnexpectedEof => 2,
            Self::MismatchedTag { .. } => 3,
            Self::DuplicateAttribute { .. } => 4,
            Self::InvalidEntity { .. } => 5,
            Self::InvalidUtf8 => 6,
            Self::TrailingContent => 7,
            Self::MaxDepthExceeded { .. } => 8,
            Self::MaxSizeExceeded { .. } => 9,
            Self::Malformed { .. } => 10,
            Self::Io { .. } => 20,
            Self::MissingSchema => 30,
            Self::SchemaUnavailable { .. } => 31,
            Self::SchemaViolation { diagnostic } => diagnostic.code,
            Self::InvalidAccessor { .. } => 40,
        }
    }
}

/// Main error type for zconf
#[derive(Error, Clone, Debug, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    span: Span,
    message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, span: Span) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            span,
            message,
        }
    }

    pub fn with_message(kind: ErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    /// Error that is not tied to a position in any input
    pub fn detached(kind: ErrorKind) -> Self {
        Self::new(kind, Span::empty())
    }

    /// Aggregate parse failure; the message lists every diagnostic on its own line
    pub fn malformed(diagnostics: Vec<Diagnostic>) -> Self {
        let message = diagnostics
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        Self::with_message(ErrorKind::Malformed { diagnostics }, Span::empty(), message)
    }

    pub fn io(path: impl Into<String>, err: &std::io::Error) -> Self {
        Self::detached(ErrorKind::Io {
            path: path.into(),
            reason: err.to_string(),
        })
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Diagnostics collected by a failed parse, empty for every other error
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match &self.kind {
            ErrorKind::Malformed { diagnostics } => diagnostics,
            _ => &[],
        }
    }

    /// Create error at specific position
    pub fn at(kind: ErrorKind, offset: usize, line: u32, col: u32) -> Self {
        Self::new(kind, Span::at(Pos::new(offset, line, col)))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.span.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "error at {}: {}", self.span.start, self.message)
        }
    }
}

/// Result type alias for zconf
pub type Result<T> = std::result::Result<T, Error>;
