#[cfg(test)]
mod tests {
    use std::{
        env, fs,
        path::PathBuf,
        process,
        sync::Arc,
        time::{SystemTime, UNIX_EPOCH},
    };

    use serde_json::{Map, Value, json};

    use crate::{
        Config, ConfigStore, DanmakuStatus, Error, FileStorage, HotKey, HotkeyAction,
        MemoryStorage, STORAGE_KEY, ScreenStatus, Storage, Switch,
    };

    fn unique_tmp_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time")
            .as_nanos();
        let mut dir = env::temp_dir();
        dir.push(format!("bilihelper-{name}-{}-{nanos}", process::id()));
        dir
    }

    fn persisted(storage: &MemoryStorage) -> Value {
        serde_json::from_str(&storage.raw(STORAGE_KEY).expect("persisted")).expect("json")
    }

    #[test]
    fn set_is_visible_in_memory_and_storage() {
        let storage = MemoryStorage::new();
        let store = ConfigStore::load(Arc::new(storage.clone()));
        store.set("defaultScreenStatus", json!("fullscreen")).unwrap();
        assert_eq!(store.get("defaultScreenStatus"), Some(json!("fullscreen")));
        assert_eq!(store.config().default_screen_status, ScreenStatus::Fullscreen);
        assert_eq!(persisted(&storage)["defaultScreenStatus"], json!("fullscreen"));
        // The whole document is written, not a delta.
        assert_eq!(persisted(&storage)["registerHotKeys"], json!("on"));
    }

    #[test]
    fn set_rejects_unknown_keys_and_bad_values() {
        let storage = MemoryStorage::new();
        let store = ConfigStore::load(Arc::new(storage.clone()));
        assert!(matches!(
            store.set("colour", json!("red")),
            Err(Error::UnknownKey(k)) if k == "colour"
        ));
        assert!(matches!(
            store.set("registerHotKeys", json!(true)),
            Err(Error::InvalidValue { key, .. }) if key == "registerHotKeys"
        ));
        assert_eq!(store.config(), Config::default());
        assert_eq!(storage.write_count(), 0);
    }

    #[test]
    fn failed_write_leaves_document_unchanged() {
        let storage = MemoryStorage::new();
        let store = ConfigStore::load(Arc::new(storage.clone()));
        storage.reject_writes(true);
        let err = store.set("defaultDanmakuStatus", json!("on")).unwrap_err();
        assert!(matches!(err, Error::Storage { .. }));
        assert_eq!(store.config().default_danmaku_status, DanmakuStatus::Off);
        assert!(storage.raw(STORAGE_KEY).is_none());
    }

    #[test]
    fn assign_validates_batch_and_writes_once() {
        let storage = MemoryStorage::new();
        let store = ConfigStore::load(Arc::new(storage.clone()));

        let mut bad = Map::new();
        bad.insert("defaultDanmakuStatus".into(), json!("on"));
        bad.insert("fixAutoJumpPv".into(), json!(1));
        assert!(store.assign(bad).is_err());
        assert_eq!(store.config().default_danmaku_status, DanmakuStatus::Off);

        let mut good = Map::new();
        good.insert("defaultDanmakuStatus".into(), json!("on"));
        good.insert("fixAutoJumpPv".into(), json!("on"));
        store.assign(good).unwrap();
        assert_eq!(storage.write_count(), 1);
        let cfg = store.config();
        assert_eq!(cfg.default_danmaku_status, DanmakuStatus::On);
        assert_eq!(cfg.fix_auto_jump_pv, Switch::On);
    }

    #[test]
    fn update_and_reset() {
        let storage = MemoryStorage::new();
        let store = ConfigStore::load(Arc::new(storage.clone()));
        store
            .update(|cfg| {
                cfg.hot_keys = vec![HotKey::new(HotkeyAction::ToggleDanmaku, &["x"])];
            })
            .unwrap();
        assert_eq!(persisted(&storage)["hotKeys"], json!([{"type": "toggleDanmaku", "keys": ["x"]}]));
        store.reset().unwrap();
        assert_eq!(store.config(), Config::default());
        assert_eq!(storage.write_count(), 2);
    }

    #[test]
    fn reload_sees_previous_writes() {
        let storage = MemoryStorage::new();
        ConfigStore::load(Arc::new(storage.clone()))
            .set("defaultDanmakuStatus", json!("default"))
            .unwrap();
        let again = ConfigStore::load(Arc::new(storage));
        assert_eq!(again.config().default_danmaku_status, DanmakuStatus::Default);
    }

    #[test]
    fn file_storage_round_trip() {
        let dir = unique_tmp_dir("store");
        let storage = FileStorage::new(&dir);
        assert!(storage.read(STORAGE_KEY).unwrap().is_none());

        let store = ConfigStore::load(Arc::new(storage.clone()));
        store.set("defaultScreenStatus", json!("default")).unwrap();
        let path = storage.path_for(STORAGE_KEY);
        assert!(path.exists());
        // No temp files left behind.
        let names: Vec<_> = fs::read_dir(&dir)
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 1);

        let again = ConfigStore::load(Arc::new(FileStorage::new(&dir)));
        assert_eq!(again.config().default_screen_status, ScreenStatus::Default);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn file_storage_flattens_separators() {
        let storage = FileStorage::new("/tmp/x");
        assert_eq!(storage.path_for("a/b"), PathBuf::from("/tmp/x/a_b.json"));
    }
}
