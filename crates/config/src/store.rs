//! Write-through settings store with default-merge loading.

use std::{fmt, sync::Arc};

use parking_lot::Mutex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::{Config, Error, KNOWN_KEYS, Result, STORAGE_KEY, Storage};

/// The settings document plus the storage it is persisted to.
///
/// Reads are served from memory. Every mutation serializes the whole document
/// and writes it before returning; when the write fails the in-memory document
/// is left unchanged.
pub struct ConfigStore {
    /// Persistence backend.
    storage: Arc<dyn Storage>,
    /// Current merged document.
    doc: Mutex<Config>,
}

impl fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigStore")
            .field("doc", &*self.doc.lock())
            .finish_non_exhaustive()
    }
}

impl ConfigStore {
    /// Load the persisted document, falling back to defaults on any problem.
    pub fn load(storage: Arc<dyn Storage>) -> Self {
        let doc = match storage.read(STORAGE_KEY) {
            Ok(Some(text)) => merge_persisted(&text),
            Ok(None) => {
                debug!("no persisted settings, using defaults");
                Config::default()
            }
            Err(e) => {
                warn!(error = %e, "failed to read settings, using defaults");
                Config::default()
            }
        };
        Self {
            storage,
            doc: Mutex::new(doc),
        }
    }

    /// Copy of the current document.
    pub fn config(&self) -> Config {
        self.doc.lock().clone()
    }

    /// Current value of one key, including preserved unknown keys.
    pub fn get(&self, key: &str) -> Option<Value> {
        let doc = self.doc.lock();
        to_map(&doc).ok()?.remove(key)
    }

    /// Set one recognized key and persist the document.
    pub fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut partial = Map::new();
        partial.insert(key.to_string(), value);
        self.assign(partial)
    }

    /// Apply several keys at once and persist the result in a single write.
    ///
    /// The whole batch is validated first; one bad key rejects all of them.
    pub fn assign(&self, partial: Map<String, Value>) -> Result<()> {
        let mut doc = self.doc.lock();
        let mut map = to_map(&doc)?;
        for (key, value) in partial {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                return Err(Error::UnknownKey(key));
            }
            let mut candidate = map.clone();
            candidate.insert(key.clone(), value);
            serde_json::from_value::<Config>(Value::Object(candidate.clone()))
                .map_err(|source| Error::InvalidValue { key, source })?;
            map = candidate;
        }
        let next: Config = serde_json::from_value(Value::Object(map))?;
        self.commit(&mut doc, next)
    }

    /// Typed read-modify-write.
    pub fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Config),
    {
        let mut doc = self.doc.lock();
        let mut next = doc.clone();
        f(&mut next);
        self.commit(&mut doc, next)
    }

    /// Replace the document wholesale, e.g. from a settings form.
    pub fn replace(&self, next: Config) -> Result<()> {
        let mut doc = self.doc.lock();
        self.commit(&mut doc, next)
    }

    /// Restore and persist the default skeleton.
    pub fn reset(&self) -> Result<()> {
        self.replace(Config::default())
    }

    /// Persist `next`, then make it current.
    fn commit(&self, doc: &mut Config, next: Config) -> Result<()> {
        let text = serde_json::to_string(&next)?;
        self.storage
            .write(STORAGE_KEY, &text)
            .map_err(|source| Error::Storage {
                key: STORAGE_KEY.to_string(),
                source,
            })?;
        debug!(bytes = text.len(), "settings persisted");
        *doc = next;
        Ok(())
    }
}

/// Serialize a document into its top-level JSON object.
fn to_map(config: &Config) -> Result<Map<String, Value>> {
    match serde_json::to_value(config)? {
        Value::Object(map) => Ok(map),
        _ => Ok(Map::new()),
    }
}

/// Overlay persisted JSON on the default skeleton.
///
/// Non-JSON or non-object text yields the defaults. Within an object each
/// key is taken on its own: unknown keys are kept, and a recognized key whose
/// value does not fit keeps its default.
pub(crate) fn merge_persisted(text: &str) -> Config {
    let persisted = match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            warn!(kind = json_kind(&other), "persisted settings are not an object, using defaults");
            return Config::default();
        }
        Err(e) => {
            warn!(error = %e, "persisted settings are not valid JSON, using defaults");
            return Config::default();
        }
    };
    let Ok(mut merged) = to_map(&Config::default()) else {
        return Config::default();
    };
    for (key, value) in persisted {
        let mut candidate = merged.clone();
        candidate.insert(key.clone(), value);
        match serde_json::from_value::<Config>(Value::Object(candidate.clone())) {
            Ok(_) => merged = candidate,
            Err(e) => warn!(key = %key, error = %e, "ignoring invalid persisted setting"),
        }
    }
    serde_json::from_value(Value::Object(merged)).unwrap_or_default()
}

/// Short name of a JSON value's type, for logs.
fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
