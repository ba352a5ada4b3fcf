//! Notifications delivered to the application.

use serde::{Deserialize, Serialize};

/// A change the application is told about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreChange<V> {
    /// A write made by this tab has been applied to storage.
    ///
    /// Carries the value exactly as the application wrote it.
    Committed { key: String, value: Option<V> },

    /// Another tab changed the storage area.
    ///
    /// `key` is `None` when the other tab cleared the whole area. The new value
    /// is the raw stored text.
    External {
        key: Option<String>,
        new_value: Option<String>,
    },
}

impl<V> StoreChange<V> {
    pub fn key(&self) -> Option<&str> {
        match self {
            StoreChange::Committed { key, .. } => Some(key.as_str()),
            StoreChange::External { key, .. } => key.as_deref(),
        }
    }

    pub fn is_committed(&self) -> bool {
        matches!(self, StoreChange::Committed { .. })
    }
}
