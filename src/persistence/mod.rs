//! Save/load of player progress
//!
//! Features:
//! - Versionless JSON record under a single storage key
//! - Every operation is a full load → mutate → store cycle
//! - Storage failures and corrupt data never reach gameplay: corrupt data
//!   reads as the default record, and after any failed read or write the
//!   session carries on with an in-memory copy that never overwrites the
//!   stored save

pub mod record;

pub use record::{BestScore, FIRST_LEVEL, LevelId, SaveRecord};

use std::cell::RefCell;

use crate::platform::storage::{BlobStore, StorageError};

/// Progress operations the game controllers rely on
pub trait ProgressStore {
    /// Current record; the default record if nothing usable is stored
    fn load(&self) -> SaveRecord;
    fn save(&mut self, record: &SaveRecord);

    fn unlock_level(&mut self, level: LevelId) {
        let mut record = self.load();
        if record.unlock(level) {
            log::info!("Unlocked island {}", level);
            self.save(&record);
        }
    }

    fn is_unlocked(&self, level: LevelId) -> bool {
        self.load().is_unlocked(level)
    }

    /// Keep the result if its score strictly beats the stored best
    fn record_score_if_better(&mut self, level: LevelId, caught: u32, time_remaining: u32, score: u32) -> bool {
        let mut record = self.load();
        let improved = record.record_if_better(level, caught, time_remaining, score);
        if improved {
            self.save(&record);
        }
        improved
    }

    fn best(&self, level: LevelId) -> Option<BestScore> {
        self.load().best(level)
    }

    fn reset(&mut self) {
        self.save(&SaveRecord::default());
    }
}

/// Progress kept in a [`BlobStore`]
#[derive(Debug, Clone)]
pub struct SaveStore<B: BlobStore> {
    backend: B,
    /// Used instead of the backend once it has failed. Reads can fail too,
    /// so this is set through `&self`.
    fallback: RefCell<Option<SaveRecord>>,
}

impl<B: BlobStore> SaveStore<B> {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "lizards_journey_save";

    pub fn new(backend: B) -> Self {
        Self {
            backend,
            fallback: RefCell::new(None),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// True once a storage failure has switched this session to memory
    pub fn is_degraded(&self) -> bool {
        self.fallback.borrow().is_some()
    }

    fn degrade(&self, record: SaveRecord) {
        *self.fallback.borrow_mut() = Some(record);
    }

    fn try_load(&self) -> Result<Option<SaveRecord>, StorageError> {
        let Some(json) = self.backend.read(Self::STORAGE_KEY)? else {
            return Ok(None);
        };
        match SaveRecord::from_json(&json) {
            Some(record) => Ok(Some(record)),
            None => {
                log::warn!("Save data is unreadable, starting fresh");
                Ok(None)
            }
        }
    }

    fn try_save(&mut self, record: &SaveRecord) -> Result<(), StorageError> {
        let json = record.to_json()?;
        self.backend.write(Self::STORAGE_KEY, &json)
    }
}

impl<B: BlobStore> ProgressStore for SaveStore<B> {
    fn load(&self) -> SaveRecord {
        if let Some(record) = self.fallback.borrow().clone() {
            return record;
        }
        match self.try_load() {
            Ok(Some(record)) => record,
            Ok(None) => SaveRecord::default(),
            Err(e) => {
                // Writing the default back would clobber whatever is stored
                log::warn!("Failed to load game save, progress kept in memory only: {}", e);
                let record = SaveRecord::default();
                self.degrade(record.clone());
                record
            }
        }
    }

    fn save(&mut self, record: &SaveRecord) {
        if self.is_degraded() {
            self.degrade(record.clone());
            return;
        }
        if let Err(e) = self.try_save(record) {
            log::warn!("Failed to save game, progress kept in memory only: {}", e);
            self.degrade(record.clone());
        }
    }

    fn reset(&mut self) {
        if self.is_degraded() {
            self.degrade(SaveRecord::default());
            return;
        }
        match self.backend.remove(Self::STORAGE_KEY) {
            Ok(()) => log::info!("Save data cleared"),
            Err(e) => {
                log::warn!("Failed to clear game save: {}", e);
                self.degrade(SaveRecord::default());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::storage::MemoryStore;
    use std::cell::Cell;

    /// Backend that refuses every operation
    struct BrokenStore;

    impl BlobStore for BrokenStore {
        fn read(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("disk on fire".into()))
        }
        fn write(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disk on fire".into()))
        }
        fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disk on fire".into()))
        }
    }

    /// Backend whose first reads fail; writes always succeed
    #[derive(Default)]
    struct FlakyReads {
        blobs: MemoryStore,
        failing_reads: Cell<u32>,
    }

    impl BlobStore for FlakyReads {
        fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
            let left = self.failing_reads.get();
            if left > 0 {
                self.failing_reads.set(left - 1);
                return Err(StorageError::Unavailable("busy".into()));
            }
            self.blobs.read(key)
        }
        fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            self.blobs.write(key, value)
        }
        fn remove(&mut self, key: &str) -> Result<(), StorageError> {
            self.blobs.remove(key)
        }
    }

    #[test]
    fn test_fresh_store_has_defaults() {
        let store = SaveStore::new(MemoryStore::new());
        assert!(store.is_unlocked(1));
        assert!(!store.is_unlocked(2));
        assert!(store.best(1).is_none());
    }

    #[test]
    fn test_unlock_and_best_persist() {
        let mut store = SaveStore::new(MemoryStore::new());
        store.unlock_level(2);
        assert!(store.record_score_if_better(1, 10, 15, 170));
        assert!(!store.record_score_if_better(1, 10, 15, 170));

        // A second store over the same blobs sees the same progress
        let reopened = SaveStore::new(store.backend().clone());
        assert!(reopened.is_unlocked(2));
        assert_eq!(reopened.best(1).map(|b| b.score), Some(170));
    }

    #[test]
    fn test_corrupt_blob_reads_as_default() {
        let mut blobs = MemoryStore::new();
        blobs
            .write(SaveStore::<MemoryStore>::STORAGE_KEY, "{{{ nope")
            .unwrap();
        let mut store = SaveStore::new(blobs);
        assert_eq!(store.load(), SaveRecord::default());

        // Writing over it repairs the save
        store.unlock_level(3);
        assert!(store.is_unlocked(3));
    }

    #[test]
    fn test_broken_backend_falls_back_to_memory() {
        let mut store = SaveStore::new(BrokenStore);
        assert_eq!(store.load(), SaveRecord::default());
        assert!(store.is_degraded());

        store.unlock_level(2);
        assert!(store.is_unlocked(2));
        assert!(store.record_score_if_better(2, 3, 0, 40));
        assert_eq!(store.best(2).map(|b| b.caught), Some(3));
    }

    #[test]
    fn test_failed_read_never_overwrites_stored_progress() {
        let mut saved = SaveRecord::default();
        saved.unlock(2);
        saved.unlock(3);
        saved.record_if_better(1, 20, 30, 500);
        let json = saved.to_json().unwrap();

        let mut backend = FlakyReads::default();
        backend.write(SaveStore::<FlakyReads>::STORAGE_KEY, &json).unwrap();
        backend.failing_reads.set(1);

        let mut store = SaveStore::new(backend);
        store.unlock_level(2);
        store.record_score_if_better(2, 5, 10, 60);
        assert!(store.is_degraded());
        assert!(store.is_unlocked(2));

        // The stored save is untouched and readable again next session
        let blob = store.backend().read(SaveStore::<FlakyReads>::STORAGE_KEY).unwrap();
        assert_eq!(blob.as_deref(), Some(json.as_str()));
        let reopened = SaveStore::new(store.backend().blobs.clone());
        assert!(reopened.is_unlocked(3));
        assert_eq!(reopened.best(1).map(|b| b.score), Some(500));
    }

    #[test]
    fn test_reset() {
        let mut store = SaveStore::new(MemoryStore::new());
        store.unlock_level(2);
        store.reset();
        assert_eq!(store.load(), SaveRecord::default());
        assert_eq!(store.backend().read(SaveStore::<MemoryStore>::STORAGE_KEY).unwrap(), None);
    }
}
