//! # Presets
//!
//! Named snapshots of theory results, newest first.
//!
//! The whole list lives in one slot of a key-value store as a JSON array. It is read
//! once when the library is loaded and written back in full after every save or
//! delete. Absent or unreadable data loads as an empty list: a broken store must never
//! stop the keyboard from starting.

use crate::error::KeyglowError;
use crate::theory::TheoryResult;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Storage slot holding the serialized preset list
pub const PRESETS_KEY: &str = "keyglow.presets";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    pub id: String,
    pub name: String,
    pub result: TheoryResult,
    /// Milliseconds since the Unix epoch
    pub created_at: u64,
}

/// String slots, like a browser's `localStorage`
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, KeyglowError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), KeyglowError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, KeyglowError> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), KeyglowError> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One file per slot inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, KeyglowError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| KeyglowError::Storage(format!("{}: {}", path.display(), e)))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), KeyglowError> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| KeyglowError::Storage(format!("{}: {}", self.dir.display(), e)))?;
        let path = self.path_for(key);
        fs::write(&path, value)
            .map_err(|e| KeyglowError::Storage(format!("{}: {}", path.display(), e)))
    }
}

/// The preset list and the store it is persisted to
#[derive(Debug)]
pub struct PresetLibrary<S: KeyValueStore> {
    store: S,
    presets: Vec<Preset>,
}

impl<S: KeyValueStore> PresetLibrary<S> {
    /// Read the stored list, falling back to an empty one
    pub fn load(store: S) -> Self {
        let presets = match store.get(PRESETS_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Preset>>(&raw) {
                Ok(presets) => presets,
                Err(e) => {
                    log::warn!(target: "presets", "ignoring corrupt preset list: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!(target: "presets", "could not read presets: {}", e);
                Vec::new()
            }
        };
        Self { store, presets }
    }

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    pub fn get(&self, id: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Insert a snapshot at the front and persist the list. Nothing changes unless the
    /// write succeeds.
    ///
    /// A blank `name` becomes the result's title. The id is derived from `created_at`
    /// and made unique within the list.
    pub fn save(
        &mut self,
        name: &str,
        result: TheoryResult,
        created_at: u64,
    ) -> Result<&Preset, KeyglowError> {
        let name = match name.trim() {
            "" => result.title(),
            trimmed => trimmed.to_string(),
        };

        let mut id = created_at.to_string();
        let mut suffix = 1;
        while self.get(&id).is_some() {
            id = format!("{}-{}", created_at, suffix);
            suffix += 1;
        }

        log::debug!(target: "presets", "saving preset {} ({})", id, name);
        let mut presets = Vec::with_capacity(self.presets.len() + 1);
        presets.push(Preset {
            id,
            name,
            result,
            created_at,
        });
        presets.extend(self.presets.iter().cloned());
        self.commit(presets)?;
        Ok(&self.presets[0])
    }

    /// Remove a preset. Unknown ids leave the list and the store untouched.
    pub fn delete(&mut self, id: &str) -> Result<bool, KeyglowError> {
        if self.get(id).is_none() {
            return Ok(false);
        }
        let presets: Vec<Preset> = self.presets.iter().filter(|p| p.id != id).cloned().collect();
        self.commit(presets)?;
        log::debug!(target: "presets", "deleted preset {}", id);
        Ok(true)
    }

    /// Write `presets` to the store, then adopt them. A failed write keeps the old list.
    fn commit(&mut self, presets: Vec<Preset>) -> Result<(), KeyglowError> {
        let raw = serde_json::to_string(&presets)
            .map_err(|e| KeyglowError::Serialization(e.to_string()))?;
        self.store.set(PRESETS_KEY, &raw)?;
        self.presets = presets;
        Ok(())
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(root: &str, kind: &str, notes: &[&str]) -> TheoryResult {
        TheoryResult {
            root: root.to_string(),
            kind: kind.to_string(),
            category: "chord".to_string(),
            notes: notes.iter().map(|n| n.to_string()).collect(),
            intervals: None,
            description: String::new(),
            key_signature: None,
        }
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, KeyglowError> {
            Err(KeyglowError::Storage("disk on fire".to_string()))
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), KeyglowError> {
            Err(KeyglowError::Storage("disk on fire".to_string()))
        }
    }

    #[test]
    fn test_save_inserts_at_front_and_survives_reload() {
        let mut library = PresetLibrary::load(MemoryStore::new());
        library.save("first", result("C", "Major", &["C", "E", "G"]), 1_000).unwrap();
        library.save("second", result("A", "Minor", &["A", "C", "E"]), 2_000).unwrap();

        let names: Vec<&str> = library.presets().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["second", "first"]);

        let reloaded = PresetLibrary::load(library.into_store());
        let names: Vec<&str> = reloaded.presets().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["second", "first"]);
        assert_eq!(reloaded.presets()[1].result.notes, vec!["C", "E", "G"]);
    }

    #[test]
    fn test_delete_missing_preset_leaves_list_unchanged() {
        let mut library = PresetLibrary::load(MemoryStore::new());
        library.save("only", result("C", "Major", &["C", "E", "G"]), 1_000).unwrap();
        let before = library.presets().to_vec();

        assert!(!library.delete("nope").unwrap());
        assert_eq!(library.presets(), before.as_slice());
    }

    #[test]
    fn test_delete_rewrites_store() {
        let mut library = PresetLibrary::load(MemoryStore::new());
        let id = library.save("a", result("C", "Major", &["C"]), 1).unwrap().id.clone();
        library.save("b", result("D", "Major", &["D"]), 2).unwrap();

        assert!(library.delete(&id).unwrap());
        let reloaded = PresetLibrary::load(library.into_store());
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.presets()[0].name, "b");
    }

    #[test]
    fn test_ids_are_unique() {
        let mut library = PresetLibrary::load(MemoryStore::new());
        let a = library.save("a", result("C", "Major", &["C"]), 5).unwrap().id.clone();
        let b = library.save("b", result("C", "Major", &["C"]), 5).unwrap().id.clone();
        let c = library.save("c", result("C", "Major", &["C"]), 5).unwrap().id.clone();
        assert_eq!(a, "5");
        assert_eq!(b, "5-1");
        assert_eq!(c, "5-2");
    }

    #[test]
    fn test_blank_name_uses_title() {
        let mut library = PresetLibrary::load(MemoryStore::new());
        let preset = library.save("  ", result("F#", "Dominant 7th", &["F#"]), 1).unwrap();
        assert_eq!(preset.name, "F# Dominant 7th");
    }

    #[test]
    fn test_corrupt_or_unreadable_store_loads_empty() {
        let mut store = MemoryStore::new();
        store.set(PRESETS_KEY, "{not a list").unwrap();
        assert!(PresetLibrary::load(store).is_empty());

        assert!(PresetLibrary::load(BrokenStore).is_empty());
    }

    /// Accepts writes until `read_only` is set
    #[derive(Default)]
    struct LockableStore {
        inner: MemoryStore,
        read_only: bool,
    }

    impl KeyValueStore for LockableStore {
        fn get(&self, key: &str) -> Result<Option<String>, KeyglowError> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), KeyglowError> {
            if self.read_only {
                return Err(KeyglowError::Storage("quota exceeded".to_string()));
            }
            self.inner.set(key, value)
        }
    }

    #[test]
    fn test_write_failure_is_reported() {
        let mut library = PresetLibrary::load(BrokenStore);
        let err = library.save("x", result("C", "Major", &["C"]), 1).unwrap_err();
        assert!(matches!(err, KeyglowError::Storage(_)));
        assert!(library.is_empty());
    }

    #[test]
    fn test_failed_writes_leave_list_as_stored() {
        let mut library = PresetLibrary::load(LockableStore::default());
        let id = library.save("kept", result("C", "Major", &["C"]), 1).unwrap().id.clone();

        library.store.read_only = true;
        assert!(library.save("lost", result("D", "Major", &["D"]), 2).is_err());
        assert!(library.delete(&id).is_err());

        let names: Vec<&str> = library.presets().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["kept"]);
        let reloaded = PresetLibrary::load(library.into_store());
        assert_eq!(reloaded.presets()[0].id, id);
    }

    #[test]
    fn test_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("state"));
        assert_eq!(store.get(PRESETS_KEY).unwrap(), None);

        store.set(PRESETS_KEY, "[]").unwrap();
        assert_eq!(store.get(PRESETS_KEY).unwrap().as_deref(), Some("[]"));

        let mut library = PresetLibrary::load(store);
        library.save("c", result("C", "Major", &["C", "E", "G"]), 7).unwrap();
        let reloaded = PresetLibrary::load(FileStore::new(dir.path().join("state")));
        assert_eq!(reloaded.presets()[0].name, "c");
    }
}
