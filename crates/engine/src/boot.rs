//! Page-load sequence: default danmaku state, default screen mode, hotkeys.

use std::{sync::Arc, time::Duration};

use bilihelper_page::{NodeId, PageView};
use config::{ConfigStore, DanmakuStatus, ScreenStatus};
use tokio::{task::JoinHandle, time};
use tracing::{debug, info, warn};

use crate::{
    activation::should_activate,
    error::WaitError,
    hotkeys::{HotkeyDispatcher, HotkeyListener},
    invoke::ActionInvoker,
    selectors,
};

/// Pause between the danmaku switch appearing and reading its state; the
/// player restores its own saved state during this window.
pub const SETTLE_DELAY: Duration = Duration::from_secs(1);

/// Result of one startup step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupOutcome {
    /// The preference is `default`; the page was not touched.
    Skipped,
    /// The control was clicked.
    Applied {
        /// Element that was activated.
        node: NodeId,
    },
    /// The page was already in the preferred state.
    AlreadyInState,
    /// The step could not complete.
    Failed(WaitError),
    /// The step's task ended without reporting, e.g. on shutdown.
    Aborted,
}

/// Outcomes of both startup steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupReport {
    /// Danmaku step.
    pub danmaku: StartupOutcome,
    /// Screen-mode step.
    pub screen: StartupOutcome,
}

/// Runs the load sequence against one page.
pub struct Bootstrapper {
    /// Performs the clicks.
    invoker: ActionInvoker,
    /// Preferences.
    store: Arc<ConfigStore>,
    /// See [`SETTLE_DELAY`].
    settle: Duration,
}

impl Bootstrapper {
    /// Bootstrapper for `page` with preferences from `store`.
    pub fn new(page: Arc<dyn PageView>, store: Arc<ConfigStore>) -> Self {
        Self {
            invoker: ActionInvoker::new(page),
            store,
            settle: SETTLE_DELAY,
        }
    }

    /// Override the danmaku settle delay.
    #[must_use]
    pub fn with_settle_delay(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// Start the sequence and return immediately.
    ///
    /// On a page outside the activation patterns nothing is started. Otherwise
    /// both startup steps run as independent tasks, and the hotkey listener is
    /// installed unless hotkeys are switched off.
    pub fn run(&self) -> Session {
        let url = self.invoker.page().url();
        if !should_activate(&url) {
            info!(%url, "page not handled, staying inactive");
            return Session::inactive();
        }
        let config = self.store.config();
        info!(
            %url,
            danmaku = ?config.default_danmaku_status,
            screen = ?config.default_screen_status,
            hotkeys = config.register_hot_keys.is_on(),
            "starting"
        );
        let danmaku = tokio::spawn(apply_danmaku(
            self.invoker.clone(),
            config.default_danmaku_status,
            self.settle,
        ));
        let screen = tokio::spawn(apply_screen(
            self.invoker.clone(),
            config.default_screen_status,
        ));
        let hotkeys = config.register_hot_keys.is_on().then(|| {
            HotkeyDispatcher::new(self.invoker.clone(), Arc::clone(&self.store)).install()
        });
        Session {
            active: true,
            danmaku: Some(danmaku),
            screen: Some(screen),
            hotkeys,
        }
    }
}

/// Bring the danmaku overlay to `status`.
///
/// Waits for whichever switch variant renders, lets the player settle, then
/// clicks that variant only if it is in the opposite state.
pub async fn apply_danmaku(
    invoker: ActionInvoker,
    status: DanmakuStatus,
    settle: Duration,
) -> StartupOutcome {
    let opposite = match status {
        DanmakuStatus::Default => return StartupOutcome::Skipped,
        DanmakuStatus::On => selectors::DANMAKU_SWITCH_UNCHECKED,
        DanmakuStatus::Off => selectors::DANMAKU_SWITCH_CHECKED,
    };
    let variant = match invoker.first_present(selectors::DANMAKU_SWITCH).await {
        Ok(win) => win.index,
        Err(e) => {
            warn!(error = %e, "danmaku switch never appeared");
            return StartupOutcome::Failed(e);
        }
    };
    time::sleep(settle).await;
    match invoker.click_now(opposite[variant], None) {
        Ok(Some(node)) => {
            debug!(?status, %node, "danmaku switched");
            StartupOutcome::Applied { node }
        }
        Ok(None) => {
            debug!(?status, "danmaku already in preferred state");
            StartupOutcome::AlreadyInState
        }
        Err(e) => StartupOutcome::Failed(e),
    }
}

/// Enter the preferred screen mode, on whichever player markup shows up.
pub async fn apply_screen(invoker: ActionInvoker, status: ScreenStatus) -> StartupOutcome {
    let candidates = match status {
        ScreenStatus::Default => return StartupOutcome::Skipped,
        ScreenStatus::Widescreen => selectors::WIDESCREEN_ENTER,
        ScreenStatus::Fullscreen => selectors::FULLSCREEN_ENTER,
    };
    match invoker.race(candidates).await {
        Ok(win) => {
            debug!(?status, selector = %win.selector, "screen mode applied");
            StartupOutcome::Applied { node: win.node }
        }
        Err(e) => {
            warn!(?status, error = %e, "screen mode not applied");
            StartupOutcome::Failed(e)
        }
    }
}

/// Everything started for one page.
pub struct Session {
    /// False when the page was outside the activation patterns.
    active: bool,
    /// Danmaku step task.
    danmaku: Option<JoinHandle<StartupOutcome>>,
    /// Screen step task.
    screen: Option<JoinHandle<StartupOutcome>>,
    /// Installed hotkey listener.
    hotkeys: Option<HotkeyListener>,
}

impl Session {
    /// A session that started nothing.
    pub fn inactive() -> Self {
        Self {
            active: false,
            danmaku: None,
            screen: None,
            hotkeys: None,
        }
    }

    /// True when the page was handled.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The hotkey listener, when installed.
    pub fn hotkeys(&mut self) -> Option<&mut HotkeyListener> {
        self.hotkeys.as_mut()
    }

    /// Wait for both startup steps. Each step reports once; later calls see
    /// [`StartupOutcome::Aborted`]. Inactive sessions report both as skipped.
    pub async fn startup(&mut self) -> StartupReport {
        if !self.active {
            return StartupReport {
                danmaku: StartupOutcome::Skipped,
                screen: StartupOutcome::Skipped,
            };
        }
        StartupReport {
            danmaku: join_step(self.danmaku.take()).await,
            screen: join_step(self.screen.take()).await,
        }
    }

    /// Abort pending startup steps and stop the hotkey listener.
    pub async fn shutdown(mut self) {
        for task in [self.danmaku.take(), self.screen.take()].into_iter().flatten() {
            task.abort();
        }
        if let Some(listener) = self.hotkeys.take() {
            listener.shutdown().await;
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        for task in [&self.danmaku, &self.screen].into_iter().flatten() {
            task.abort();
        }
    }
}

/// Await one step task.
async fn join_step(task: Option<JoinHandle<StartupOutcome>>) -> StartupOutcome {
    let Some(task) = task else {
        return StartupOutcome::Aborted;
    };
    match task.await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(error = %e, "startup step did not finish");
            StartupOutcome::Aborted
        }
    }
}
