//! Error types for the settings store.

use std::{io, result::Result as StdResult};

use thiserror::Error;

/// Errors produced while mutating or persisting settings.
///
/// Loading never fails; it degrades to defaults instead.
#[derive(Debug, Error)]
pub enum Error {
    /// The backing storage rejected a read or write.
    #[error("storage error for {key:?}: {source}")]
    Storage {
        /// Storage key involved.
        key: String,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },

    /// The document could not be serialized.
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A `set` named a key the skeleton does not define.
    #[error("unknown setting {0:?}")]
    UnknownKey(String),

    /// A value does not fit the declared type of its key.
    #[error("invalid value for {key:?}: {source}")]
    InvalidValue {
        /// Setting name.
        key: String,
        /// Deserialization failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Convenient result type for the config crate.
pub type Result<T> = StdResult<T, Error>;
