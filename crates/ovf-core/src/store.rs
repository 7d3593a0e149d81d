//! Durable per-document persistence of captured field values.
//!
//! The store is the one piece of mutable shared state in the engine. It is
//! passed explicitly to whoever needs it — never an ambient singleton —
//! and exposes exactly three operations: `load`, `upsert`, `read_all`.
//! Every mutation is a full read-modify-write of the whole mapping, so
//! per-field writes are applied in emission order within a session.
//!
//! Failure policy: reads soft-fail to an empty set and writes are
//! swallowed (logged). A failed write means the value survives only in
//! the live rendering, not across reloads — the accepted trade-off is
//! "never block the user", not "never lose data".

use crate::id::FieldId;
use crate::model::{FieldValue, ValueSet};
use std::fmt;
use std::path::{Path, PathBuf};

/// Opaque autosave scope supplied by the host's key resolver.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The conventional key shape for a carrier/brand document variant.
    pub fn compose(carrier: &str, brand: &str, doc_kind: &str, age_band: &str) -> Self {
        Self(format!("overlay_autosave_{carrier}_{brand}_{doc_kind}_{age_band}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The persistence contract consumed by the fill session and the
/// validation gate.
pub trait ValueStore {
    /// Read the full value set. Missing or corrupt backing data is an
    /// empty set, never an error.
    fn load(&self) -> ValueSet;

    /// Read-modify-write one field. Failures are swallowed.
    fn upsert(&mut self, id: FieldId, value: FieldValue);

    /// Snapshot for validation.
    fn read_all(&self) -> ValueSet;
}

// ─── JSON file store ─────────────────────────────────────────────────────

/// One JSON object file per storage key — the durable analog of the
/// original per-key browser storage.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store backed by `<dir>/<key>.json`.
    pub fn open(dir: &Path, key: &StorageKey) -> Self {
        Self {
            path: dir.join(format!("{key}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, values: &ValueSet) {
        let payload = match serde_json::to_vec(values) {
            Ok(p) => p,
            Err(e) => {
                log::warn!("autosave serialize failed for {}: {e}", self.path.display());
                return;
            }
        };
        if let Err(e) = std::fs::write(&self.path, payload) {
            log::warn!("autosave write failed for {}: {e}", self.path.display());
        }
    }
}

impl ValueStore for JsonFileStore {
    fn load(&self) -> ValueSet {
        let raw = match std::fs::read(&self.path) {
            Ok(raw) => raw,
            Err(_) => return ValueSet::new(), // first visit: nothing saved yet
        };
        match serde_json::from_slice(&raw) {
            Ok(values) => values,
            Err(e) => {
                log::warn!(
                    "autosave at {} is corrupt, starting empty: {e}",
                    self.path.display()
                );
                ValueSet::new()
            }
        }
    }

    fn upsert(&mut self, id: FieldId, value: FieldValue) {
        let mut all = self.load();
        all.insert(id, value);
        self.save(&all);
    }

    fn read_all(&self) -> ValueSet {
        self.load()
    }
}

// ─── In-memory store ─────────────────────────────────────────────────────

/// Volatile store for tests and hosts that own their own durability.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: ValueSet,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start pre-populated, as if a prior session had saved these values.
    pub fn with_values(values: ValueSet) -> Self {
        Self { values }
    }
}

impl ValueStore for MemoryStore {
    fn load(&self) -> ValueSet {
        self.values.clone()
    }

    fn upsert(&mut self, id: FieldId, value: FieldValue) {
        self.values.insert(id, value);
    }

    fn read_all(&self) -> ValueSet {
        self.values.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn temp_dir(label: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "ovf_store_{label}_{}_{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn key_composition() {
        let key = StorageKey::compose("kt", "mmobile", "join", "adult");
        assert_eq!(key.as_str(), "overlay_autosave_kt_mmobile_join_adult");
    }

    #[test]
    fn upsert_then_read_roundtrip() {
        let dir = temp_dir("roundtrip");
        let mut store = JsonFileStore::open(&dir, &StorageKey::new("k"));

        store.upsert(FieldId::intern("name"), FieldValue::Text("Kim".into()));
        store.upsert(FieldId::intern("agree"), FieldValue::Bool(true));
        store.upsert(
            FieldId::intern("sign"),
            FieldValue::Text("data:image/png;base64,AAAA".into()),
        );

        // Re-open to prove durability, not just the in-process map.
        let store2 = JsonFileStore::open(&dir, &StorageKey::new("k"));
        let all = store2.read_all();
        assert_eq!(
            all.get(&FieldId::intern("name")),
            Some(&FieldValue::Text("Kim".into()))
        );
        assert_eq!(
            all.get(&FieldId::intern("agree")),
            Some(&FieldValue::Bool(true))
        );
        assert_eq!(
            all.get(&FieldId::intern("sign")),
            Some(&FieldValue::Text("data:image/png;base64,AAAA".into()))
        );
    }

    #[test]
    fn missing_file_reads_empty() {
        let dir = temp_dir("missing");
        let store = JsonFileStore::open(&dir, &StorageKey::new("never_written"));
        assert!(store.load().is_empty());
    }

    #[test]
    fn corrupt_file_reads_empty() {
        let dir = temp_dir("corrupt");
        let key = StorageKey::new("k");
        let store = JsonFileStore::open(&dir, &key);
        std::fs::write(store.path(), b"{not json").unwrap();
        assert!(store.load().is_empty());
    }

    #[test]
    fn write_failure_does_not_panic() {
        // Point at a directory that does not exist; the write is dropped.
        let mut store = JsonFileStore::open(
            Path::new("/nonexistent/ovf"),
            &StorageKey::new("k"),
        );
        store.upsert(FieldId::intern("name"), FieldValue::Text("x".into()));
        assert!(store.load().is_empty());
    }

    #[test]
    fn later_write_wins_per_field() {
        let mut store = MemoryStore::new();
        let id = FieldId::intern("plan");
        store.upsert(id, FieldValue::Text("5G basic".into()));
        store.upsert(id, FieldValue::Text("5G premium".into()));
        assert_eq!(
            store.read_all().get(&id),
            Some(&FieldValue::Text("5G premium".into()))
        );
    }
}
