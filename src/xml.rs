//! XML parser and writer module

pub mod cursor;
pub mod model;
pub mod parser;
pub mod writer;

pub use cursor::Cursor;
pub use model::{Content, Document, Element};
pub use parser::{Config as ParseConfig, Parser};
pub use writer::Config as WriteConfig;
