#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use crate::{
        Config, ConfigStore, DanmakuStatus, HotkeyAction, KNOWN_KEYS, MemoryStorage,
        STORAGE_KEY, ScreenStatus, Switch, store::merge_persisted,
    };

    fn load_raw(text: &str) -> Config {
        let storage = MemoryStorage::with_value(STORAGE_KEY, text);
        ConfigStore::load(Arc::new(storage)).config()
    }

    #[test]
    fn missing_document_yields_defaults() {
        let store = ConfigStore::load(Arc::new(MemoryStorage::new()));
        assert_eq!(store.config(), Config::default());
    }

    #[test]
    fn malformed_payloads_yield_exact_defaults() {
        for text in ["", "not json", "{", "[1, 2]", "[]", "42", "\"on\"", "null", "true"] {
            assert_eq!(load_raw(text), Config::default(), "{text:?}");
        }
    }

    #[test]
    fn partial_document_is_default_filled() {
        let cfg = load_raw(r#"{"defaultDanmakuStatus": "on"}"#);
        assert_eq!(cfg.default_danmaku_status, DanmakuStatus::On);
        let defaults = Config::default();
        assert_eq!(cfg.default_screen_status, defaults.default_screen_status);
        assert_eq!(cfg.hot_keys, defaults.hot_keys);
        assert_eq!(cfg.register_hot_keys, Switch::On);
    }

    #[test]
    fn every_known_key_present_after_load() {
        let store = ConfigStore::load(Arc::new(MemoryStorage::with_value(
            STORAGE_KEY,
            r#"{"fixAutoJumpPv": "on"}"#,
        )));
        for key in KNOWN_KEYS {
            assert!(store.get(key).is_some(), "{key}");
        }
        assert_eq!(store.get("fixAutoJumpPv"), Some(json!("on")));
    }

    #[test]
    fn unknown_keys_are_preserved() {
        let cfg = merge_persisted(r#"{"panelTheme": {"dark": true}, "defaultScreenStatus": "default"}"#);
        assert_eq!(cfg.default_screen_status, ScreenStatus::Default);
        assert_eq!(cfg.extra.get("panelTheme"), Some(&json!({"dark": true})));
        let round = serde_json::to_value(&cfg).unwrap();
        assert_eq!(round["panelTheme"], json!({"dark": true}));
    }

    #[test]
    fn invalid_known_value_keeps_default_only_for_that_key() {
        let cfg = merge_persisted(
            r#"{"defaultDanmakuStatus": "sometimes", "registerHotKeys": "off", "hotKeys": null}"#,
        );
        assert_eq!(cfg.default_danmaku_status, DanmakuStatus::Off);
        assert_eq!(cfg.register_hot_keys, Switch::Off);
        assert_eq!(cfg.hot_keys, Config::default().hot_keys);
    }

    #[test]
    fn unknown_action_round_trips() {
        let cfg = merge_persisted(
            r#"{"hotKeys": [{"type": "screenshot", "keys": ["p"]}, {"type": "next", "keys": ["n"]}]}"#,
        );
        assert_eq!(cfg.hot_keys[0].action, HotkeyAction::Other("screenshot".into()));
        assert_eq!(cfg.hot_keys[1].action, HotkeyAction::Next);
        assert!(cfg.hot_keys[1].action.is_reserved());
        let text = serde_json::to_string(&cfg).unwrap();
        assert_eq!(merge_persisted(&text), cfg);
    }

    #[test]
    fn binding_lookup_first_match_wins() {
        let cfg = merge_persisted(
            r#"{"hotKeys": [
                {"type": "toggleDanmaku", "keys": ["d"]},
                {"type": "toggleWidescreen", "keys": ["d", "w"]}
            ]}"#,
        );
        assert_eq!(cfg.binding_for("d").unwrap().action, HotkeyAction::ToggleDanmaku);
        assert_eq!(cfg.binding_for("w").unwrap().action, HotkeyAction::ToggleWidescreen);
        assert!(cfg.binding_for("D").is_none());
    }
}
