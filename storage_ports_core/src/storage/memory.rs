//! In-memory storage area shared by any number of simulated tabs.

use super::{StorageArea, StorageEvent, StorageHandler, StorageService};
use dupe::Dupe;
use std::{
    cell::RefCell,
    collections::BTreeMap,
    fmt,
    rc::{Rc, Weak},
};
use thiserror::Error;
use tracing::warn;

/// One tab's handle on an in-memory storage area.
///
/// Handles created with [`MemoryStorage::open_tab`] share the same entries.
/// Like the browser, a write through one handle raises a [`StorageEvent`] on
/// the subscribers of every *other* handle, never on its own.
#[derive(Clone, Dupe)]
pub struct MemoryStorage {
    shared: Rc<RefCell<Shared>>,
    tab: u64,
}

struct Shared {
    area: StorageArea,
    entries: BTreeMap<String, String>,
    quota: Option<usize>,
    subscribers: Vec<Subscriber>,
    next_tab: u64,
    next_subscriber: u64,
}

struct Subscriber {
    id: u64,
    tab: u64,
    handler: Rc<RefCell<StorageHandler>>,
}

impl Shared {
    fn used_bytes(&self) -> usize {
        self.entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    fn handlers(&self, except_tab: Option<u64>) -> Vec<Rc<RefCell<StorageHandler>>> {
        self.subscribers
            .iter()
            .filter(|sub| Some(sub.tab) != except_tab)
            .map(|sub| sub.handler.dupe())
            .collect()
    }
}

impl MemoryStorage {
    pub fn new(area: StorageArea) -> Self {
        Self {
            shared: Rc::new(RefCell::new(Shared {
                area,
                entries: BTreeMap::new(),
                quota: None,
                subscribers: Vec::new(),
                next_tab: 1,
                next_subscriber: 0,
            })),
            tab: 0,
        }
    }

    /// An area that rejects writes once keys plus values exceed `quota` bytes.
    pub fn with_quota(area: StorageArea, quota: usize) -> Self {
        let storage = Self::new(area);
        storage.shared.borrow_mut().quota = Some(quota);
        storage
    }

    /// Seed entries without raising events, as if left over from an earlier session.
    pub fn with_entries<K, V, I>(area: StorageArea, entries: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let storage = Self::new(area);
        storage
            .shared
            .borrow_mut()
            .entries
            .extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
        storage
    }

    /// Another handle on the same area, acting as a different tab.
    pub fn open_tab(&self) -> Self {
        let mut shared = self.shared.borrow_mut();
        let tab = shared.next_tab;
        shared.next_tab += 1;
        Self {
            shared: self.shared.dupe(),
            tab,
        }
    }

    /// Remove every entry. Other tabs see a single event with no key.
    pub fn clear(&self) {
        let area = {
            let mut shared = self.shared.borrow_mut();
            if shared.entries.is_empty() {
                return;
            }
            shared.entries.clear();
            shared.area
        };
        self.notify_others(StorageEvent::cleared(area));
    }

    /// Deliver `event` to every subscriber on every tab, this one included.
    ///
    /// Stands in for the platform raising an arbitrary event, e.g. one about a
    /// different storage area.
    pub fn dispatch(&self, event: StorageEvent) {
        let handlers = self.shared.borrow().handlers(None);
        deliver(handlers, event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.shared.borrow().subscribers.len()
    }

    fn notify_others(&self, event: StorageEvent) {
        // Collected first so handlers run with no borrow held.
        let handlers = self.shared.borrow().handlers(Some(self.tab));
        deliver(handlers, event);
    }
}

fn deliver(handlers: Vec<Rc<RefCell<StorageHandler>>>, event: StorageEvent) {
    for handler in handlers {
        match handler.try_borrow_mut() {
            Ok(mut handler) => (*handler)(event.clone()),
            Err(_) => warn!(key = ?event.key, "storage handler re-entered; event dropped"),
        }
    }
}

impl StorageService for MemoryStorage {
    type Error = MemoryStorageError;
    type Subscription = MemorySubscription;

    fn area(&self) -> StorageArea {
        self.shared.borrow().area
    }

    fn len(&self) -> Result<u32, Self::Error> {
        Ok(self.shared.borrow().entries.len() as u32)
    }

    fn key(&self, index: u32) -> Result<Option<String>, Self::Error> {
        Ok(self
            .shared
            .borrow()
            .entries
            .keys()
            .nth(index as usize)
            .cloned())
    }

    fn get_item(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.shared.borrow().entries.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        let (old_value, area) = {
            let mut shared = self.shared.borrow_mut();

            if let Some(quota) = shared.quota {
                let replaced = shared.entries.get(key).map_or(0, |old| key.len() + old.len());
                let needed = shared.used_bytes() - replaced + key.len() + value.len();
                if needed > quota {
                    return Err(MemoryStorageError::QuotaExceeded {
                        key: key.to_string(),
                        quota,
                    });
                }
            }

            let old_value = shared.entries.insert(key.to_string(), value.to_string());
            (old_value, shared.area)
        };

        // The platform stays quiet when nothing changed.
        if old_value.as_deref() == Some(value) {
            return Ok(());
        }

        self.notify_others(StorageEvent {
            key: Some(key.to_string()),
            old_value,
            new_value: Some(value.to_string()),
            area: Some(area),
        });
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), Self::Error> {
        let (old_value, area) = {
            let mut shared = self.shared.borrow_mut();
            let old_value = shared.entries.remove(key);
            (old_value, shared.area)
        };

        if old_value.is_some() {
            self.notify_others(StorageEvent {
                key: Some(key.to_string()),
                old_value,
                new_value: None,
                area: Some(area),
            });
        }
        Ok(())
    }

    fn subscribe(&self, handler: StorageHandler) -> Result<Self::Subscription, Self::Error> {
        let mut shared = self.shared.borrow_mut();
        let id = shared.next_subscriber;
        shared.next_subscriber += 1;
        shared.subscribers.push(Subscriber {
            id,
            tab: self.tab,
            handler: Rc::new(RefCell::new(handler)),
        });

        Ok(MemorySubscription {
            shared: Rc::downgrade(&self.shared),
            id,
        })
    }
}

impl fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shared = self.shared.borrow();
        f.debug_struct("MemoryStorage")
            .field("area", &shared.area)
            .field("tab", &self.tab)
            .field("entries", &shared.entries)
            .field("quota", &shared.quota)
            .field("subscribers", &shared.subscribers.len())
            .finish()
    }
}

/// Detaches its handler from the area when dropped.
#[must_use = "the handler is detached as soon as the subscription is dropped"]
pub struct MemorySubscription {
    shared: Weak<RefCell<Shared>>,
    id: u64,
}

impl Drop for MemorySubscription {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.upgrade() {
            // May be dropped from inside a handler while the area is borrowed.
            if let Ok(mut shared) = shared.try_borrow_mut() {
                shared.subscribers.retain(|sub| sub.id != self.id);
            }
        }
    }
}

impl fmt::Debug for MemorySubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySubscription")
            .field("id", &self.id)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryStorageError {
    #[error("Storage quota of {quota} bytes exceeded while setting {key:?}")]
    QuotaExceeded { key: String, quota: usize },
}
