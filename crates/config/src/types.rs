//! Typed view of the persisted settings document.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Danmaku overlay state applied at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DanmakuStatus {
    /// Force the overlay on.
    On,
    /// Force the overlay off.
    Off,
    /// Leave the page's own choice alone.
    Default,
}

/// Player layout applied at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenStatus {
    /// Widescreen (theater) layout.
    Widescreen,
    /// Fullscreen.
    Fullscreen,
    /// Leave the page's own layout alone.
    Default,
}

/// A plain on/off preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Switch {
    /// Enabled.
    On,
    /// Disabled.
    Off,
}

impl Switch {
    /// True for [`Switch::On`].
    pub fn is_on(self) -> bool {
        self == Self::On
    }
}

/// Logical action a hotkey triggers.
///
/// Unknown identifiers are kept verbatim in [`HotkeyAction::Other`] so a
/// document written by a newer version survives a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HotkeyAction {
    /// Flip the danmaku switch.
    ToggleDanmaku,
    /// Flip widescreen layout.
    ToggleWidescreen,
    /// Flip fullscreen.
    ToggleFullscreen,
    /// Open (or close) the add-to-collection dialog.
    AddCollection,
    /// Open (or close) the coin dialog.
    GiveCoin,
    /// Next episode. Reserved.
    Next,
    /// Previous episode. Reserved.
    Prev,
    /// Flip subtitles. Reserved.
    ToggleSubtitle,
    /// An identifier this version does not know.
    Other(String),
}

impl HotkeyAction {
    /// Wire identifier.
    pub fn as_str(&self) -> &str {
        match self {
            Self::ToggleDanmaku => "toggleDanmaku",
            Self::ToggleWidescreen => "toggleWidescreen",
            Self::ToggleFullscreen => "toggleFullscreen",
            Self::AddCollection => "addCollection",
            Self::GiveCoin => "giveCoin",
            Self::Next => "next",
            Self::Prev => "prev",
            Self::ToggleSubtitle => "toggleSubtitle",
            Self::Other(s) => s,
        }
    }

    /// Declared in the schema but without behavior.
    pub fn is_reserved(&self) -> bool {
        matches!(self, Self::Next | Self::Prev | Self::ToggleSubtitle)
    }
}

impl From<String> for HotkeyAction {
    fn from(s: String) -> Self {
        match s.as_str() {
            "toggleDanmaku" => Self::ToggleDanmaku,
            "toggleWidescreen" => Self::ToggleWidescreen,
            "toggleFullscreen" => Self::ToggleFullscreen,
            "addCollection" => Self::AddCollection,
            "giveCoin" => Self::GiveCoin,
            "next" => Self::Next,
            "prev" => Self::Prev,
            "toggleSubtitle" => Self::ToggleSubtitle,
            _ => Self::Other(s),
        }
    }
}

impl From<HotkeyAction> for String {
    fn from(action: HotkeyAction) -> Self {
        match action {
            HotkeyAction::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for HotkeyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One binding: an action and the key strings that trigger it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotKey {
    /// Action to run.
    #[serde(rename = "type")]
    pub action: HotkeyAction,
    /// Key strings, compared exactly against the event's key.
    pub keys: Vec<String>,
}

impl HotKey {
    /// Build a binding.
    pub fn new(action: HotkeyAction, keys: &[&str]) -> Self {
        Self {
            action,
            keys: keys.iter().map(|k| (*k).to_string()).collect(),
        }
    }

    /// True when `key` triggers this binding.
    pub fn matches(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }
}

/// The full settings document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Danmaku state at startup.
    pub default_danmaku_status: DanmakuStatus,
    /// Layout at startup.
    pub default_screen_status: ScreenStatus,
    /// Keep the episode list visible in widescreen (styling preference).
    pub show_episodes_when_widescreen: Switch,
    /// Install the hotkey listener.
    pub register_hot_keys: Switch,
    /// Stop auto-advancing to the next part (page-script preference).
    pub fix_auto_jump_pv: Switch,
    /// Binding table, scanned in order.
    pub hot_keys: Vec<HotKey>,
    /// Keys this version does not recognize, preserved as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Config {
    /// First binding whose key set contains `key`.
    pub fn binding_for(&self, key: &str) -> Option<&HotKey> {
        self.hot_keys.iter().find(|b| b.matches(key))
    }
}
