//! Forwarding between the application and its storage area.
//!
//! Two stateless rules:
//!
//! * outbound: a [`WriteRequest`] from the application is applied to storage,
//!   then a [`StoreChange::Committed`] is sent back on a later turn;
//! * inbound: a [`StorageEvent`] raised by another tab for the same area is
//!   forwarded as [`StoreChange::External`].

use crate::{
    change::StoreChange,
    defer::Defer,
    error::WriteError,
    listener::ChangeListener,
    snapshot::Snapshot,
    storage::{StorageArea, StorageEvent, StorageService},
    value::{StoreValue, WriteRequest},
};
use derive_where::derive_where;
use dupe::Dupe;
use std::marker::PhantomData;
use tracing::{debug, instrument};

#[derive_where(Clone; S, L, D)]
#[derive_where(Debug; S, L, D)]
pub struct Relay<S, L, D, V = serde_json::Value> {
    storage: S,
    listener: L,
    defer: D,
    _value: PhantomData<fn() -> V>,
}

impl<S, L, D, V> Relay<S, L, D, V>
where
    S: StorageService,
    L: ChangeListener<V>,
    D: Defer,
    V: StoreValue,
{
    pub fn new(storage: S, listener: L, defer: D) -> Self {
        Self {
            storage,
            listener,
            defer,
            _value: PhantomData,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn area(&self) -> StorageArea {
        self.storage.area()
    }

    pub fn snapshot(&self) -> Result<Snapshot, S::Error> {
        Snapshot::read(&self.storage)
    }

    /// Apply a write from the application, then schedule its commit notice.
    ///
    /// The notice is never delivered from inside this call. On error nothing
    /// is scheduled.
    #[instrument(skip_all, fields(key = %request.key, remove = request.is_removal()))]
    pub fn write(
        &self,
        request: WriteRequest<V>,
    ) -> Result<(), WriteError<S::Error, V::EncodeError>> {
        let WriteRequest { key, value } = request;

        match &value {
            None => {
                self.storage
                    .remove_item(&key)
                    .map_err(|source| WriteError::Storage {
                        key: key.clone(),
                        source,
                    })?;
                debug!("removed");
            }
            Some(value) => {
                let stored = value.to_stored().map_err(|source| WriteError::Encode {
                    key: key.clone(),
                    source,
                })?;
                self.storage
                    .set_item(&key, &stored)
                    .map_err(|source| WriteError::Storage {
                        key: key.clone(),
                        source,
                    })?;
                debug!(bytes = stored.len(), "stored");
            }
        }

        let listener = self.listener.clone();
        self.defer.defer(Box::new(move || {
            listener.on_store_change(StoreChange::Committed { key, value });
        }));

        Ok(())
    }

    /// Forward a change made by another tab. Returns whether it was forwarded.
    #[instrument(skip_all, fields(key = ?event.key))]
    pub fn receive(&self, event: &StorageEvent) -> bool {
        let area = self.storage.area();
        if event.area != Some(area) {
            debug!(%area, event_area = ?event.area, "event for another storage area dropped");
            return false;
        }

        self.listener.on_store_change(StoreChange::External {
            key: event.key.clone(),
            new_value: event.new_value.clone(),
        });
        debug!("forwarded");
        true
    }
}

impl<S, L, D, V> Relay<S, L, D, V>
where
    S: StorageService + Clone + 'static,
    L: ChangeListener<V>,
    D: Defer + Clone + 'static,
    V: StoreValue,
{
    /// Forward every change the storage service reports until the returned
    /// subscription is dropped.
    pub fn listen(&self) -> Result<S::Subscription, S::Error> {
        let relay = self.clone();
        self.storage.subscribe(Box::new(move |event| {
            relay.receive(&event);
        }))
    }
}

impl<S: Dupe, L: Dupe, D: Dupe, V> Dupe for Relay<S, L, D, V> {
    fn dupe(&self) -> Self {
        self.clone()
    }
}
