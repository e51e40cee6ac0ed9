//! Persisted user settings for the bilibili helper.
//!
//! [`ConfigStore`] owns the settings document: it loads with default-merge
//! semantics and writes through to a [`Storage`] on every mutation.

mod defaults;
mod error;
mod storage;
mod store;
mod types;

#[cfg(test)]
mod test_merge;
#[cfg(test)]
mod test_store;

use std::{env, path::PathBuf};

pub use defaults::{KNOWN_KEYS, STORAGE_KEY};
pub use error::{Error, Result};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use store::ConfigStore;
pub use types::{Config, DanmakuStatus, HotKey, HotkeyAction, ScreenStatus, Switch};

/// Preferred settings directory (`~/.bilihelper`).
pub fn default_config_dir() -> PathBuf {
    let mut p = PathBuf::from(env::var_os("HOME").unwrap_or_default());
    p.push(".bilihelper");
    p
}
