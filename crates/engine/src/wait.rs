//! Waiting for an element to appear below a root.
//!
//! A wait first looks for a match synchronously. Only when nothing matches does
//! it install a mutation observer on the root, re-checking after every batch of
//! changes until a match appears, the deadline passes, or the page goes away.
//! The observer lives exactly as long as the pending wait.

use std::{sync::Arc, time::Duration};

use bilihelper_page::{NodeId, PageView};
use tokio::time::Instant as TokioInstant;
use tracing::{debug, trace, warn};

use crate::error::WaitError;

/// Root used when the caller does not name one.
pub const DEFAULT_ROOT: &str = "body";

/// Lifecycle of a [`WaitHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitState {
    /// No match yet.
    Pending,
    /// A match was found; terminal.
    Resolved,
    /// Timed out or detached; terminal.
    Abandoned,
}

/// One pending search for `target` below a root element.
pub struct WaitHandle {
    /// Document being searched.
    page: Arc<dyn PageView>,
    /// Target selector.
    target: String,
    /// Root selector, for diagnostics.
    root_selector: String,
    /// Resolved root element.
    root: NodeId,
    /// Give up at this instant; `None` waits indefinitely.
    deadline: Option<TokioInstant>,
    /// When the wait began.
    started: TokioInstant,
    /// Current lifecycle state.
    state: WaitState,
    /// The match, once resolved.
    found: Option<NodeId>,
}

impl WaitHandle {
    /// Start a wait, checking for an existing match before anything else.
    ///
    /// Fails with [`WaitError::RootNotFound`] when `root` (default
    /// [`DEFAULT_ROOT`]) matches nothing; no observer is installed in that case.
    pub fn begin(
        page: Arc<dyn PageView>,
        target: &str,
        root: Option<&str>,
        timeout: Option<Duration>,
    ) -> Result<Self, WaitError> {
        let root_selector = root.unwrap_or(DEFAULT_ROOT).to_string();
        let Some(root_node) = page.query(None, &root_selector)? else {
            warn!(root = %root_selector, selector = target, "wait root not found");
            return Err(WaitError::RootNotFound {
                root: root_selector,
            });
        };
        let found = page.query(Some(root_node), target)?;
        let started = TokioInstant::now();
        let state = if found.is_some() {
            trace!(selector = target, "resolved without observing");
            WaitState::Resolved
        } else {
            WaitState::Pending
        };
        Ok(Self {
            page,
            target: target.to_string(),
            root_selector,
            root: root_node,
            deadline: timeout.map(|t| started + t),
            started,
            state,
            found,
        })
    }

    /// Current state.
    pub fn state(&self) -> WaitState {
        self.state
    }

    /// Drive the wait to a terminal state.
    pub async fn wait(&mut self) -> Result<NodeId, WaitError> {
        match (self.state, self.found) {
            (WaitState::Resolved, Some(node)) => return Ok(node),
            (WaitState::Abandoned, _) => return Err(self.abandoned()),
            _ => {}
        }

        let mut cursor = self.page.observe(self.root);
        debug!(selector = %self.target, root = %self.root_selector, "observing for element");
        loop {
            // Re-check before blocking: the tree may have changed between the
            // eager check and the observer taking effect.
            if let Some(node) = self.page.query(Some(self.root), &self.target)? {
                self.state = WaitState::Resolved;
                self.found = Some(node);
                trace!(selector = %self.target, %node, "element appeared");
                return Ok(node);
            }
            let next = match self.deadline {
                Some(deadline) => cursor.next_until(deadline).await,
                None => cursor.next().await,
            };
            if next.is_some() {
                continue;
            }
            self.state = WaitState::Abandoned;
            if cursor.is_closed() {
                debug!(selector = %self.target, "page closed while waiting");
                return Err(WaitError::Detached {
                    target: self.target.clone(),
                });
            }
            debug!(selector = %self.target, elapsed = ?self.started.elapsed(), "wait timed out");
            return Err(self.abandoned());
        }
    }

    /// Error describing a timed-out wait.
    fn abandoned(&self) -> WaitError {
        WaitError::Abandoned {
            target: self.target.clone(),
            root: self.root_selector.clone(),
            elapsed: self.started.elapsed(),
        }
    }
}

/// Resolve with the first element matching `target` below `root`.
///
/// Already-present elements resolve without installing an observer. With a
/// timeout the observer is removed once it elapses and the wait fails with
/// [`WaitError::Abandoned`].
pub async fn wait_for_element(
    page: &Arc<dyn PageView>,
    target: &str,
    root: Option<&str>,
    timeout: Option<Duration>,
) -> Result<NodeId, WaitError> {
    WaitHandle::begin(Arc::clone(page), target, root, timeout)?
        .wait()
        .await
}
