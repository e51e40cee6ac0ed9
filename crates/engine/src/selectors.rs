//! Host page contract: selectors for the player controls.
//!
//! These follow the site's markup and change when it does. Lists cover the
//! legacy `bilibili-player-*` player and the current `bpx-player-*` one.

/// Danmaku on/off checkbox.
pub const DANMAKU_SWITCH: &[&str] = &["input.bui-checkbox", "input.bui-danmaku-switch-input"];
/// The danmaku checkbox while the overlay is on, index-aligned with [`DANMAKU_SWITCH`].
pub const DANMAKU_SWITCH_CHECKED: &[&str] = &[
    "input.bui-checkbox:checked",
    "input.bui-danmaku-switch-input:checked",
];
/// The danmaku checkbox while the overlay is off, index-aligned with [`DANMAKU_SWITCH`].
pub const DANMAKU_SWITCH_UNCHECKED: &[&str] = &[
    "input.bui-checkbox:not(:checked)",
    "input.bui-danmaku-switch-input:not(:checked)",
];

/// Widescreen button in a state where clicking it enters widescreen.
pub const WIDESCREEN_ENTER: &[&str] = &[
    r#"button[data-text="宽屏模式"]"#,
    ".bpx-player-ctrl-wide:not(.bpx-state-entered)",
];
/// Widescreen button in either state.
pub const WIDESCREEN_TOGGLE: &[&str] = &[
    r#"button[data-text="宽屏模式"], button[data-text="退出宽屏"]"#,
    ".bpx-player-ctrl-wide",
];

/// Fullscreen button in a state where clicking it enters fullscreen.
pub const FULLSCREEN_ENTER: &[&str] = &[
    r#".bilibili-player-video-btn-fullscreen button[data-text="进入全屏"]"#,
    ".bpx-player-ctrl-full:not(.bpx-state-entered)",
];
/// Fullscreen button in either state.
pub const FULLSCREEN_TOGGLE: &[&str] = &[
    r#".bilibili-player-video-btn-fullscreen button[data-text*="全屏"]"#,
    ".bpx-player-ctrl-full",
];

/// Close button of an open collection or coin dialog.
pub const DIALOG_CLOSE: &str = r#"[class*="bili-dialog"] .close"#;
/// "Add to collection" button.
pub const COLLECT_BUTTON: &str = r#".collect[title*="收藏"]"#;
/// "Give coins" button.
pub const COIN_BUTTON: &str = r#".coin[title*="硬币"]"#;
