//! Persistence of unlocks and objective progress.
//!
//! [`ProgressStore`] serializes state as JSON into an injected
//! [`KeyValueStore`]. Loads never fail: absent or unreadable records yield
//! defaults. Saves are best effort: failures are logged and dropped so that
//! play continues without persistence.

pub mod kv;

pub use kv::{FileStore, KeyValueStore, MemoryStore, StoreError};

use reaction_lab_core::catalog::Catalog;
use reaction_lab_core::id::ElementId;
use reaction_lab_core::unlock::UnlockSet;
use reaction_lab_objectives::{OBJECTIVES_PER_TIER, Progress};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Key of the unlocked-id list (a JSON array of strings).
pub const UNLOCKED_KEY: &str = "reaction-lab-unlocked";

/// Key of the objective progress record.
pub const PROGRESS_KEY: &str = "reaction-lab-objective-progress";

/// Typed access to the persisted sandbox state.
#[derive(Debug, Clone)]
pub struct ProgressStore<S> {
    store: S,
    per_tier: u32,
}

impl<S: KeyValueStore> ProgressStore<S> {
    pub fn new(store: S) -> Self {
        Self::with_per_tier(store, OBJECTIVES_PER_TIER)
    }

    /// `per_tier` sizes the default progress record.
    pub fn with_per_tier(store: S, per_tier: u32) -> Self {
        Self { store, per_tier }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // -- Objective progress --

    /// The saved progress, or fresh progress if none is saved or the record
    /// cannot be read.
    pub fn load(&self) -> Progress {
        self.read(PROGRESS_KEY)
            .unwrap_or_else(|| Progress::initial(self.per_tier))
    }

    pub fn save(&mut self, progress: &Progress) {
        self.write(PROGRESS_KEY, progress);
    }

    /// Delete the saved progress and return fresh progress.
    pub fn reset(&mut self) -> Progress {
        self.delete(PROGRESS_KEY);
        Progress::initial(self.per_tier)
    }

    // -- Unlocks --

    /// Catalog defaults plus the saved ids the catalog still knows.
    pub fn load_unlocked(&self, catalog: &Catalog) -> UnlockSet {
        match self.read::<Vec<ElementId>>(UNLOCKED_KEY) {
            Some(ids) => UnlockSet::restore(catalog, ids),
            None => UnlockSet::from_catalog(catalog),
        }
    }

    pub fn save_unlocked(&mut self, unlocks: &UnlockSet) {
        self.write(UNLOCKED_KEY, &unlocks.to_vec());
    }

    /// Delete the saved unlocks and return the catalog defaults.
    pub fn reset_unlocked(&mut self, catalog: &Catalog) -> UnlockSet {
        self.delete(UNLOCKED_KEY);
        UnlockSet::from_catalog(catalog)
    }

    // -- Internal helpers --

    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let text = match self.store.get(key) {
            Ok(Some(text)) => text,
            Ok(None) => {
                tracing::debug!(target: "lab.store", key, "no saved record");
                return None;
            }
            Err(e) => {
                tracing::warn!(target: "lab.store", key, error = %e, "failed to read saved record");
                return None;
            }
        };
        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(target: "lab.store", key, error = %e, "discarding corrupt record");
                None
            }
        }
    }

    fn write<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        let result = serde_json::to_string(value)
            .map_err(|e| StoreError::Encode {
                key: key.to_string(),
                detail: e.to_string(),
            })
            .and_then(|text| self.store.set(key, text));
        if let Err(e) = result {
            tracing::warn!(target: "lab.store", key, error = %e, "failed to save record");
        }
    }

    fn delete(&mut self, key: &str) {
        if let Err(e) = self.store.remove(key) {
            tracing::warn!(target: "lab.store", key, error = %e, "failed to delete record");
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use reaction_lab_core::test_utils::small_catalog;
    use reaction_lab_objectives::ObjectiveId;

    /// A backend whose writes always fail.
    #[derive(Default)]
    struct ReadOnly(MemoryStore);

    impl KeyValueStore for ReadOnly {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.0.get(key)
        }

        fn set(&mut self, key: &str, _value: String) -> Result<(), StoreError> {
            Err(StoreError::InvalidKey(key.to_string()))
        }

        fn remove(&mut self, key: &str) -> Result<(), StoreError> {
            Err(StoreError::InvalidKey(key.to_string()))
        }
    }

    // -----------------------------------------------------------------------
    // Progress
    // -----------------------------------------------------------------------

    #[test]
    fn missing_progress_loads_defaults() {
        let store = ProgressStore::new(MemoryStore::new());
        assert_eq!(store.load(), Progress::default());

        let small = ProgressStore::with_per_tier(MemoryStore::new(), 3);
        assert_eq!(small.load().tier(1).total, 3);
    }

    #[test]
    fn progress_round_trips() {
        let mut store = ProgressStore::new(MemoryStore::new());
        let mut progress = Progress::default();
        progress.completed_objective_ids.push(ObjectiveId::from("t1_obj1"));
        progress.current_objective_id = Some(ObjectiveId::from("t1_obj2"));
        progress.tier_progress.get_mut(&1).unwrap().completed = 1;

        store.save(&progress);
        assert_eq!(store.load(), progress);

        let raw = store.store().get(PROGRESS_KEY).unwrap().unwrap();
        assert!(raw.contains("\"currentObjectiveId\":\"t1_obj2\""));
    }

    #[test]
    fn corrupt_progress_falls_back_to_defaults() {
        let mut backend = MemoryStore::new();
        backend.set(PROGRESS_KEY, "{not json".to_string()).unwrap();
        let store = ProgressStore::new(backend);
        assert_eq!(store.load(), Progress::default());
    }

    #[test]
    fn reset_removes_saved_progress() {
        let mut store = ProgressStore::new(MemoryStore::new());
        let mut progress = Progress::default();
        progress.current_tier = 4;
        store.save(&progress);

        assert_eq!(store.reset(), Progress::default());
        assert_eq!(store.store().get(PROGRESS_KEY).unwrap(), None);
        assert_eq!(store.load().current_tier, 1);
    }

    #[test]
    fn failed_save_is_swallowed() {
        let mut store = ProgressStore::new(ReadOnly::default());
        store.save(&Progress::default());
        assert_eq!(store.reset(), Progress::default());
    }

    // -----------------------------------------------------------------------
    // Unlocks
    // -----------------------------------------------------------------------

    #[test]
    fn unlocks_merge_defaults_and_drop_unknown() {
        let catalog = small_catalog();
        let mut backend = MemoryStore::new();
        backend
            .set(UNLOCKED_KEY, r#"["H2O", "Unobtainium"]"#.to_string())
            .unwrap();
        let store = ProgressStore::new(backend);

        let unlocks = store.load_unlocked(&catalog);
        assert!(unlocks.is_unlocked(&ElementId::from("H2O")));
        assert!(unlocks.is_unlocked(&ElementId::from("H")));
        assert!(!unlocks.is_unlocked(&ElementId::from("Unobtainium")));
    }

    #[test]
    fn unlocks_round_trip_and_reset() {
        let catalog = small_catalog();
        let mut store = ProgressStore::new(MemoryStore::new());
        let mut unlocks = store.load_unlocked(&catalog);
        assert_eq!(unlocks, UnlockSet::from_catalog(&catalog));

        unlocks.unlock(ElementId::from("H2O"));
        store.save_unlocked(&unlocks);
        assert_eq!(store.load_unlocked(&catalog), unlocks);

        let raw = store.store().get(UNLOCKED_KEY).unwrap().unwrap();
        let ids: Vec<String> = serde_json::from_str(&raw).unwrap();
        assert!(ids.contains(&"H2O".to_string()));

        assert_eq!(
            store.reset_unlocked(&catalog),
            UnlockSet::from_catalog(&catalog)
        );
        assert_eq!(store.load_unlocked(&catalog), UnlockSet::from_catalog(&catalog));
    }

    #[test]
    fn corrupt_unlocks_fall_back_to_defaults() {
        let catalog = small_catalog();
        let mut backend = MemoryStore::new();
        backend.set(UNLOCKED_KEY, "42".to_string()).unwrap();
        let store = ProgressStore::new(backend);
        assert_eq!(
            store.load_unlocked(&catalog),
            UnlockSet::from_catalog(&catalog)
        );
    }
}
