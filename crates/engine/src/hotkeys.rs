//! Keystroke to page-action dispatch.

use std::sync::Arc;

use bilihelper_page::{KeyEvent, NodeId};
use config::{ConfigStore, HotkeyAction};
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::{error::WaitError, invoke::ActionInvoker, selectors};

/// What a single keystroke led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Focus was in a text-entry element; the key belongs to the user.
    FocusedInput,
    /// No binding lists this key.
    Unbound,
    /// Bound to an action with no behavior (reserved or unrecognized).
    NoOp(HotkeyAction),
    /// A dialog was open; it was closed instead of running the action.
    ClosedDialog(HotkeyAction),
    /// The action clicked `node`.
    Triggered {
        /// Action that ran.
        action: HotkeyAction,
        /// Element that was activated.
        node: NodeId,
    },
    /// The action could not be completed.
    Failed {
        /// Action that ran.
        action: HotkeyAction,
        /// Why it failed.
        error: WaitError,
    },
}

/// Maps keystrokes to actions using the current hotkey bindings.
#[derive(Clone)]
pub struct HotkeyDispatcher {
    /// Performs the clicks.
    invoker: ActionInvoker,
    /// Source of the bindings, read on every keystroke.
    store: Arc<ConfigStore>,
}

impl HotkeyDispatcher {
    /// Dispatcher for `invoker`'s page using bindings from `store`.
    pub fn new(invoker: ActionInvoker, store: Arc<ConfigStore>) -> Self {
        Self { invoker, store }
    }

    /// Resolve `key` to a binding and run it, reading focus from the page now.
    ///
    /// Keys typed into text fields are ignored, and so are keys no binding
    /// lists. Matching is exact and case-sensitive.
    pub async fn handle_key(&self, key: &str) -> Dispatch {
        let typing = self
            .invoker
            .page()
            .active_element()
            .is_some_and(|el| el.is_text_entry());
        self.dispatch(key, typing).await
    }

    /// Handle a delivered keystroke using the focus it was pressed with.
    pub async fn handle_event(&self, event: &KeyEvent) -> Dispatch {
        self.dispatch(&event.key, event.in_text_entry).await
    }

    /// Shared path for [`Self::handle_key`] and [`Self::handle_event`].
    async fn dispatch(&self, key: &str, typing: bool) -> Dispatch {
        if typing {
            trace!(key, "ignoring key typed into text field");
            return Dispatch::FocusedInput;
        }
        let action = match self.store.config().binding_for(key) {
            Some(binding) => binding.action.clone(),
            None => {
                trace!(key, "unbound key");
                return Dispatch::Unbound;
            }
        };
        debug!(key, %action, "hotkey");
        self.run(action).await
    }

    /// Execute `action` against the page.
    pub async fn run(&self, action: HotkeyAction) -> Dispatch {
        let result = match &action {
            HotkeyAction::ToggleDanmaku => self
                .invoker
                .race(selectors::DANMAKU_SWITCH)
                .await
                .map(|win| win.node),
            HotkeyAction::ToggleWidescreen => self
                .invoker
                .race(selectors::WIDESCREEN_TOGGLE)
                .await
                .map(|win| win.node),
            HotkeyAction::ToggleFullscreen => self
                .invoker
                .race(selectors::FULLSCREEN_TOGGLE)
                .await
                .map(|win| win.node),
            HotkeyAction::AddCollection | HotkeyAction::GiveCoin => {
                match self.invoker.click_now(selectors::DIALOG_CLOSE, None) {
                    Ok(Some(_)) => {
                        debug!(%action, "closed open dialog");
                        return Dispatch::ClosedDialog(action);
                    }
                    Ok(None) => {}
                    Err(error) => return Dispatch::Failed { action, error },
                }
                let button = if action == HotkeyAction::AddCollection {
                    selectors::COLLECT_BUTTON
                } else {
                    selectors::COIN_BUTTON
                };
                self.invoker.click_when_ready(button, None).await
            }
            HotkeyAction::Next
            | HotkeyAction::Prev
            | HotkeyAction::ToggleSubtitle
            | HotkeyAction::Other(_) => {
                if action.is_reserved() {
                    debug!(%action, "reserved action");
                } else {
                    debug!(%action, "unknown action");
                }
                return Dispatch::NoOp(action);
            }
        };
        match result {
            Ok(node) => Dispatch::Triggered { action, node },
            Err(error) => {
                warn!(%action, error = %error, "hotkey action failed");
                Dispatch::Failed { action, error }
            }
        }
    }

    /// Start handling keystrokes from the page in the background.
    ///
    /// Each keystroke is handled on its own task so a slow action never
    /// delays the next key.
    pub fn install(&self) -> HotkeyListener {
        let mut keys = self.invoker.page().listen_keys();
        let token = CancellationToken::new();
        let cancel = token.clone();
        let dispatcher = self.clone();
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    event = keys.next() => {
                        let Some(event) = event else { break };
                        let dispatcher = dispatcher.clone();
                        let tx = tx.clone();
                        tokio::spawn(async move {
                            let outcome = dispatcher.handle_event(&event).await;
                            trace!(key = %event.key, ?outcome, "key handled");
                            tx.send((event.key, outcome)).ok();
                        });
                    }
                }
            }
            debug!("hotkey listener stopped");
        });
        HotkeyListener {
            token,
            task: Some(task),
            outcomes: rx,
        }
    }
}

/// Background keystroke listener. Dropping it stops listening.
pub struct HotkeyListener {
    /// Cancels the listen loop.
    token: CancellationToken,
    /// The listen loop.
    task: Option<JoinHandle<()>>,
    /// Outcome of every handled key, in completion order.
    outcomes: mpsc::UnboundedReceiver<(String, Dispatch)>,
}

impl HotkeyListener {
    /// Stop listening. Actions already started run to completion.
    pub fn stop(&self) {
        self.token.cancel();
    }

    /// True once stopped or once the page's key stream ended.
    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled() || self.task.as_ref().is_none_or(|t| t.is_finished())
    }

    /// Next handled key and its outcome.
    pub async fn next_outcome(&mut self) -> Option<(String, Dispatch)> {
        self.outcomes.recv().await
    }

    /// Stop and wait for the listen loop to exit.
    pub async fn shutdown(mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            warn!(error = %e, "hotkey listener task failed");
        }
    }
}

impl Drop for HotkeyListener {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
