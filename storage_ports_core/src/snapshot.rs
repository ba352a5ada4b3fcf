use crate::storage::StorageService;
use derive_more::{Deref, From, Into, IntoIterator};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::instrument;

/// Every persisted key with its raw stored text, read at startup.
///
/// Handed to the application unfiltered as its initial configuration.
#[derive(
    Debug, Default, Clone, PartialEq, Eq, Deref, From, Into, IntoIterator, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Snapshot(#[into_iterator(owned, ref)] HashMap<String, String>);

impl Snapshot {
    /// Enumerate `storage` and collect each entry as stored.
    #[instrument(skip_all, fields(area = %storage.area()))]
    pub fn read<S: StorageService>(storage: &S) -> Result<Self, S::Error> {
        let len = storage.len()?;
        let mut entries = HashMap::with_capacity(len as usize);

        for index in 0..len {
            let Some(key) = storage.key(index)? else {
                continue;
            };

            if let Some(value) = storage.get_item(&key)? {
                entries.insert(key, value);
            }
        }

        tracing::debug!(entries = entries.len(), "read storage snapshot");
        Ok(Self(entries))
    }

    pub fn into_inner(self) -> HashMap<String, String> {
        self.0
    }
}

impl FromIterator<(String, String)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{memory::MemoryStorage, StorageArea};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_empty_storage() {
        let storage = MemoryStorage::new(StorageArea::Local);
        assert_eq!(Snapshot::read(&storage).unwrap(), Snapshot::default());
    }

    #[test]
    fn test_raw_text_is_kept() {
        let storage = MemoryStorage::with_entries(
            StorageArea::Local,
            [("session", r#"{"token":"abc"}"#), ("theme", "\"dark\""), ("not-json", "{oops")],
        );
        let snapshot = Snapshot::read(&storage).unwrap();

        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.get("session").map(String::as_str), Some(r#"{"token":"abc"}"#));
        assert_eq!(snapshot.get("theme").map(String::as_str), Some("\"dark\""));
        assert_eq!(snapshot.get("not-json").map(String::as_str), Some("{oops"));
    }

    proptest! {
        #[test]
        fn prop_snapshot_is_exactly_the_stored_set(
            entries in proptest::collection::hash_map(".*", ".*", 0..32)
        ) {
            let storage = MemoryStorage::with_entries(StorageArea::Local, entries.clone());
            let snapshot = Snapshot::read(&storage).unwrap();
            prop_assert_eq!(snapshot.into_inner(), entries);
        }
    }
}
