use super::js_error::JsBridgeError;
use dupe::Dupe;
use storage_ports_core::storage::{StorageArea, StorageEvent, StorageHandler, StorageService};
use thiserror::Error;
use wasm_bindgen::{prelude::*, JsCast};
use web_sys::{Storage, Window};

const STORAGE_EVENT: &str = "storage";

/// A Web Storage area (`localStorage` or `sessionStorage`) and the window that
/// raises its `storage` events.
#[derive(Debug, Clone)]
pub struct JsWebStorage {
    window: Window,
    storage: Storage,
    area: StorageArea,
}

impl JsWebStorage {
    pub fn new(window: &Window, area: StorageArea) -> Result<Self, JsBridgeError> {
        let storage = area_storage(window, area)
            .map_err(JsStorageError)?
            .ok_or(JsBridgeError::StorageUnavailable(area))?;

        Ok(Self {
            window: window.clone(),
            storage,
            area,
        })
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }
}

impl Dupe for JsWebStorage {
    fn dupe(&self) -> Self {
        self.clone()
    }
}

fn area_storage(window: &Window, area: StorageArea) -> Result<Option<Storage>, JsValue> {
    match area {
        StorageArea::Local => window.local_storage(),
        StorageArea::Session => window.session_storage(),
    }
}

/// Identify the event's storage object by identity with the window's areas.
fn area_of(window: &Window, storage: Option<Storage>) -> Option<StorageArea> {
    let storage: JsValue = storage?.into();
    [StorageArea::Local, StorageArea::Session]
        .into_iter()
        .find(|area| match area_storage(window, *area) {
            Ok(Some(s)) => JsValue::from(s) == storage,
            _ => false,
        })
}

impl StorageService for JsWebStorage {
    type Error = JsStorageError;
    type Subscription = JsStorageSubscription;

    fn area(&self) -> StorageArea {
        self.area
    }

    fn len(&self) -> Result<u32, Self::Error> {
        self.storage.length().map_err(JsStorageError)
    }

    fn key(&self, index: u32) -> Result<Option<String>, Self::Error> {
        self.storage.key(index).map_err(JsStorageError)
    }

    fn get_item(&self, key: &str) -> Result<Option<String>, Self::Error> {
        self.storage.get_item(key).map_err(JsStorageError)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.storage.set_item(key, value).map_err(JsStorageError)
    }

    fn remove_item(&self, key: &str) -> Result<(), Self::Error> {
        self.storage.remove_item(key).map_err(JsStorageError)
    }

    fn subscribe(&self, mut handler: StorageHandler) -> Result<Self::Subscription, Self::Error> {
        let window = self.window.clone();
        let closure = Closure::<dyn FnMut(web_sys::StorageEvent)>::new(
            move |event: web_sys::StorageEvent| {
                handler(StorageEvent {
                    key: event.key(),
                    old_value: event.old_value(),
                    new_value: event.new_value(),
                    area: area_of(&window, event.storage_area()),
                })
            },
        );

        self.window
            .add_event_listener_with_callback(STORAGE_EVENT, closure.as_ref().unchecked_ref())
            .map_err(JsStorageError)?;

        Ok(JsStorageSubscription {
            window: self.window.clone(),
            closure,
        })
    }
}

/// The window `storage` listener. Removed when dropped.
#[derive(Debug)]
pub struct JsStorageSubscription {
    window: Window,
    closure: Closure<dyn FnMut(web_sys::StorageEvent)>,
}

impl Drop for JsStorageSubscription {
    fn drop(&mut self) {
        if let Err(err) = self
            .window
            .remove_event_listener_with_callback(STORAGE_EVENT, self.closure.as_ref().unchecked_ref())
        {
            tracing::warn!(?err, "failed to remove storage listener");
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Web Storage call failed: {0:?}")]
pub struct JsStorageError(pub JsValue);
