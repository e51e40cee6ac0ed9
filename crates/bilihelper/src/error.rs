//! Error handling for the bilihelper binary.

use std::{io, result};

use thiserror::Error;

/// Convenient result type for bilihelper operations.
pub type Result<T> = result::Result<T, Error>;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum Error {
    /// Wrapper for standard I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// The page fixture could not be loaded.
    #[error("Page fixture error: {0}")]
    Page(#[from] bilihelper_page::Error),
    /// Settings could not be read or written.
    #[error("Settings error: {0}")]
    Config(#[from] config::Error),
    /// Output could not be rendered.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// A setting name nobody recognizes.
    #[error("Unknown setting {0:?}")]
    UnknownSetting(String),
}
