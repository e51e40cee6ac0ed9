//! Clicking controls that may not be on the page yet.

use std::{sync::Arc, time::Duration};

use bilihelper_page::{NodeId, PageView};
use futures::future::{BoxFuture, FutureExt, select_all};
use tracing::{debug, trace};

use crate::{error::WaitError, wait::wait_for_element};

/// The candidate that won a [`ActionInvoker::race`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceWin {
    /// Position of the winning selector in the candidate list.
    pub index: usize,
    /// The winning selector.
    pub selector: String,
    /// The matched element; clicked unless found with [`ActionInvoker::first_present`].
    pub node: NodeId,
}

/// Triggers activation on page elements.
#[derive(Clone)]
pub struct ActionInvoker {
    /// Document the invoker acts on.
    page: Arc<dyn PageView>,
}

impl ActionInvoker {
    /// Invoker acting on `page`.
    pub fn new(page: Arc<dyn PageView>) -> Self {
        Self { page }
    }

    /// The document this invoker acts on.
    pub fn page(&self) -> &Arc<dyn PageView> {
        &self.page
    }

    /// Click `target` if it is present right now.
    ///
    /// Returns the clicked element, or `None` when `root` or `target` matches
    /// nothing or the element refused the click. Never waits.
    pub fn click_now(&self, target: &str, root: Option<&str>) -> Result<Option<NodeId>, WaitError> {
        let scope = match root {
            None => None,
            Some(sel) => match self.page.query(None, sel)? {
                Some(node) => Some(node),
                None => {
                    trace!(root = sel, "click_now root absent");
                    return Ok(None);
                }
            },
        };
        let Some(node) = self.page.query(scope, target)? else {
            trace!(selector = target, "click_now target absent");
            return Ok(None);
        };
        if self.page.click(node) {
            debug!(selector = target, %node, "clicked");
            Ok(Some(node))
        } else {
            Ok(None)
        }
    }

    /// Wait for `target` without clicking it.
    pub async fn wait_for(
        &self,
        target: &str,
        root: Option<&str>,
        timeout: Option<Duration>,
    ) -> Result<NodeId, WaitError> {
        wait_for_element(&self.page, target, root, timeout).await
    }

    /// Wait until `target` exists below `root`, then click it exactly once.
    pub async fn click_when_ready(
        &self,
        target: &str,
        root: Option<&str>,
    ) -> Result<NodeId, WaitError> {
        let node = self.wait_for(target, root, None).await?;
        if !self.page.click(node) {
            return Err(WaitError::Inert {
                target: target.to_string(),
                node,
            });
        }
        debug!(selector = target, %node, "clicked when ready");
        Ok(node)
    }

    /// Wait on every selector at once and click whichever appears first.
    ///
    /// Candidates already present win in list order. Once one candidate is
    /// clicked the others are dropped and their observers removed, so at most
    /// one element is activated. A failing candidate does not end the race;
    /// when all of them fail the last error is returned.
    pub async fn race(&self, selectors: &[&str]) -> Result<RaceWin, WaitError> {
        self.first_of(selectors, true).await
    }

    /// Like [`Self::race`], but only reports which candidate appeared first.
    pub async fn first_present(&self, selectors: &[&str]) -> Result<RaceWin, WaitError> {
        self.first_of(selectors, false).await
    }

    /// Wait on all candidates, optionally clicking the winner.
    async fn first_of(&self, selectors: &[&str], click: bool) -> Result<RaceWin, WaitError> {
        if selectors.is_empty() {
            return Err(WaitError::NoCandidates);
        }
        let mut pending: Vec<BoxFuture<'static, (usize, Result<NodeId, WaitError>)>> = selectors
            .iter()
            .enumerate()
            .map(|(index, selector)| {
                let invoker = self.clone();
                let selector = (*selector).to_string();
                async move {
                    let result = if click {
                        invoker.click_when_ready(&selector, None).await
                    } else {
                        invoker.wait_for(&selector, None, None).await
                    };
                    (index, result)
                }
                .boxed()
            })
            .collect();

        let mut last_error = WaitError::NoCandidates;
        while !pending.is_empty() {
            let ((index, result), _, rest) = select_all(pending).await;
            match result {
                Ok(node) => {
                    let selector = selectors[index].to_string();
                    debug!(%selector, %node, click, dropped = rest.len(), "race won");
                    return Ok(RaceWin {
                        index,
                        selector,
                        node,
                    });
                }
                Err(e) => {
                    debug!(candidate = selectors[index], error = %e, "race candidate failed");
                    last_error = e;
                    pending = rest;
                }
            }
        }
        Err(last_error)
    }
}
