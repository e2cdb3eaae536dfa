use alloc::string::{String, ToString};
use hashbrown::HashMap;

use crate::*;

/// Keyed text storage for persisted documents.
///
/// A missing key is `Ok(None)`, not an error.
pub trait SnapshotStore {
    fn read(&self, key: &str) -> core::result::Result<Option<String>, StorageError>;
    fn write(&mut self, key: &str, contents: &str) -> core::result::Result<(), StorageError>;
}

/// Where a persisted type lives inside a [`SnapshotStore`].
pub trait StorageKey {
    const KEY: &'static str;
}

/// A type with a document representation.
pub trait Snapshot: StorageKey + Sized {
    fn decode(text: &str) -> core::result::Result<Self, DocumentError>;
    fn encode(&self) -> core::result::Result<String, DocumentError>;
}

pub trait SnapshotStoreExt: SnapshotStore {
    fn load<T: Snapshot>(&self) -> core::result::Result<Option<T>, StorageError> {
        match self.read(T::KEY)? {
            Some(text) => Ok(Some(T::decode(&text)?)),
            None => Ok(None),
        }
    }

    fn save<T: Snapshot>(&mut self, value: &T) -> core::result::Result<(), StorageError> {
        let text = value.encode()?;
        self.write(T::KEY, &text)
    }
}

impl<S: SnapshotStore + ?Sized> SnapshotStoreExt for S {}

/// Store that keeps everything in memory, for embedding and tests.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }
}

impl SnapshotStore for MemoryStore {
    fn read(&self, key: &str) -> core::result::Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, contents: &str) -> core::result::Result<(), StorageError> {
        self.entries.insert(key.to_string(), contents.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trips_text() {
        let mut store = MemoryStore::default();

        assert_eq!(store.read("a").unwrap(), None);
        store.write("a", "1").unwrap();
        store.write("a", "2").unwrap();

        assert_eq!(store.read("a").unwrap().as_deref(), Some("2"));
        assert!(store.contains("a"));
    }

    #[test]
    fn load_reports_decode_failures() {
        let mut store = MemoryStore::default();
        store.write(Leaderboard::KEY, "[]").unwrap();

        let err = store.load::<Leaderboard>().unwrap_err();

        assert_eq!(
            err,
            StorageError::Document(DocumentError::WrongType {
                path: "$".into(),
                expected: "an object"
            })
        );
    }
}
