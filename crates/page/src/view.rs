//! The seam between the engine and a concrete document.

use crate::{Element, KeyEvent, Mutation, NodeId, SelectorError, events::EventCursor};

/// Minimal document surface the engine drives.
///
/// Implementations own selector interpretation; the engine passes selectors
/// through untouched. [`crate::Page`] is the in-memory implementation.
pub trait PageView: Send + Sync {
    /// Current document location.
    fn url(&self) -> String;

    /// First element matching `selector` below `scope` (exclusive), or in the
    /// whole document when `scope` is `None`.
    fn query(&self, scope: Option<NodeId>, selector: &str) -> Result<Option<NodeId>, SelectorError>;

    /// Subscribe to child-list and attribute changes at or below `root`.
    /// Dropping the cursor disconnects the observer.
    fn observe(&self, root: NodeId) -> EventCursor<Mutation>;

    /// Subscribe to document keystrokes.
    fn listen_keys(&self) -> EventCursor<KeyEvent>;

    /// Activate `node` as a user click would. Returns `false` when the node is
    /// gone or disabled.
    fn click(&self, node: NodeId) -> bool;

    /// Snapshot of the focused element, if any.
    fn active_element(&self) -> Option<Element>;
}
