use std::{result::Result as StdResult, time::Duration};

use bilihelper_page::{NodeId, SelectorError};
use thiserror::Error;

/// Why a wait or activation did not produce an element.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WaitError {
    /// The search root matched nothing when the wait started.
    #[error("root element {root:?} does not exist")]
    RootNotFound {
        /// Root selector.
        root: String,
    },

    /// The timeout elapsed before a match appeared; the observer was torn down.
    #[error("stopped waiting for {target:?} under {root:?} after {elapsed:?}")]
    Abandoned {
        /// Target selector.
        target: String,
        /// Root selector.
        root: String,
        /// Time spent waiting.
        elapsed: Duration,
    },

    /// The document went away while waiting.
    #[error("page unloaded while waiting for {target:?}")]
    Detached {
        /// Target selector.
        target: String,
    },

    /// The page could not interpret a selector.
    #[error(transparent)]
    Selector(#[from] SelectorError),

    /// The element was found but refused activation (removed or disabled).
    #[error("element {node} matching {target:?} could not be activated")]
    Inert {
        /// Target selector.
        target: String,
        /// The element that refused.
        node: NodeId,
    },

    /// A race was started without candidates.
    #[error("race started with no candidate selectors")]
    NoCandidates,
}

/// Result alias for waits and activations.
pub type Result<T> = StdResult<T, WaitError>;
