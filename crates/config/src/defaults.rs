//! Default skeleton and storage constants.

use serde_json::Map;

use crate::{Config, DanmakuStatus, HotKey, HotkeyAction, ScreenStatus, Switch};

/// Fixed storage key of the settings document.
pub const STORAGE_KEY: &str = "bilibili-helper-config";

/// Every key the skeleton defines, in document order.
pub const KNOWN_KEYS: &[&str] = &[
    "defaultDanmakuStatus",
    "defaultScreenStatus",
    "showEpisodesWhenWidescreen",
    "registerHotKeys",
    "fixAutoJumpPv",
    "hotKeys",
];

/// Default binding table.
pub(crate) fn default_hot_keys() -> Vec<HotKey> {
    vec![
        HotKey::new(HotkeyAction::ToggleFullscreen, &["Enter"]),
        HotKey::new(HotkeyAction::ToggleDanmaku, &["d", "D"]),
        HotKey::new(HotkeyAction::ToggleWidescreen, &["w", "W"]),
        HotKey::new(HotkeyAction::AddCollection, &["s", "S"]),
        HotKey::new(HotkeyAction::GiveCoin, &["c", "C"]),
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_danmaku_status: DanmakuStatus::Off,
            default_screen_status: ScreenStatus::Widescreen,
            show_episodes_when_widescreen: Switch::On,
            register_hot_keys: Switch::On,
            fix_auto_jump_pv: Switch::Off,
            hot_keys: default_hot_keys(),
            extra: Map::new(),
        }
    }
}
