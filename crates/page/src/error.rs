//! Error types for selector parsing and page fixtures.

use std::{io, result::Result as StdResult};

use thiserror::Error;

/// Convenient result type for the page crate.
pub type Result<T> = StdResult<T, Error>;

/// A selector the matcher cannot interpret.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unsupported selector {selector:?} at offset {offset}: {reason}")]
pub struct SelectorError {
    /// The full selector text.
    pub selector: String,
    /// Byte offset where parsing stopped.
    pub offset: usize,
    /// What went wrong.
    pub reason: &'static str,
}

/// Errors produced while building a page from a fixture.
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to read the fixture file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Fixture JSON did not match the expected shape.
    #[error("invalid page fixture: {0}")]
    Fixture(#[from] serde_json::Error),

    /// A fixture referenced a node that does not exist.
    #[error("fixture references unknown element id {0:?}")]
    UnknownElement(String),
}
