//! Bilihelper Engine
//!
//! Drives a video page towards the user's preferences:
//! - [`wait_for_element`] and [`WaitHandle`] resolve once a selector matches,
//!   observing the page only while something is missing
//! - [`ActionInvoker`] clicks controls now, when they appear, or whichever of
//!   several variants appears first
//! - [`HotkeyDispatcher`] maps keystrokes to player actions
//! - [`Bootstrapper`] runs the page-load sequence and returns a [`Session`]
//!
//! The engine talks to the document only through [`bilihelper_page::PageView`]
//! and never interprets selectors itself.

mod activation;
mod boot;
mod error;
mod hotkeys;
mod invoke;
pub mod selectors;
pub mod test_support;
mod wait;

#[cfg(test)]
mod test_invoke;
#[cfg(test)]
mod test_wait;

pub use activation::{MATCH_PATTERNS, should_activate};
pub use boot::{
    Bootstrapper, SETTLE_DELAY, Session, StartupOutcome, StartupReport, apply_danmaku,
    apply_screen,
};
pub use error::{Result, WaitError};
pub use hotkeys::{Dispatch, HotkeyDispatcher, HotkeyListener};
pub use invoke::{ActionInvoker, RaceWin};
pub use wait::{DEFAULT_ROOT, WaitHandle, WaitState, wait_for_element};
