//! The key-value storage area the relay reads from and writes to.
//!
//! The browser's storage object is global state. Here it is an injected
//! [`StorageService`], so relay logic can run against [`MemoryStorage`].
//!
//! [`MemoryStorage`]: self::memory::MemoryStorage

pub mod memory;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which storage instance a service or an event belongs to.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StorageArea {
    /// Persists across sessions and is shared by every same-origin tab.
    #[default]
    Local,

    /// Scoped to a single top-level browsing session.
    Session,
}

impl fmt::Display for StorageArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageArea::Local => f.write_str("local"),
            StorageArea::Session => f.write_str("session"),
        }
    }
}

/// A change raised by the platform after another tab mutated a storage area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageEvent {
    /// `None` when the area was cleared.
    pub key: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,

    /// `None` when the event's storage object is not one of the known areas.
    pub area: Option<StorageArea>,
}

impl StorageEvent {
    pub fn cleared(area: StorageArea) -> Self {
        Self {
            key: None,
            old_value: None,
            new_value: None,
            area: Some(area),
        }
    }
}

pub type StorageHandler = Box<dyn FnMut(StorageEvent) + 'static>;

/// A text key-value storage area with change notifications.
///
/// Mirrors the capabilities of Web Storage: enumerate (via [`len`] and
/// [`key`]), get, set, remove, and subscribe to changes made elsewhere.
///
/// [`len`]: StorageService::len
/// [`key`]: StorageService::key
pub trait StorageService {
    type Error: std::error::Error + 'static;

    /// Dropping the subscription detaches the handler.
    type Subscription;

    fn area(&self) -> StorageArea;

    fn len(&self) -> Result<u32, Self::Error>;

    fn is_empty(&self) -> Result<bool, Self::Error> {
        Ok(self.len()? == 0)
    }

    /// The key at `index` in the area's enumeration order, if any.
    fn key(&self, index: u32) -> Result<Option<String>, Self::Error>;

    fn get_item(&self, key: &str) -> Result<Option<String>, Self::Error>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), Self::Error>;

    fn remove_item(&self, key: &str) -> Result<(), Self::Error>;

    /// Register `handler` for changes made to this area from elsewhere.
    ///
    /// Changes made through `self` are not reported back to it.
    fn subscribe(&self, handler: StorageHandler) -> Result<Self::Subscription, Self::Error>;
}
