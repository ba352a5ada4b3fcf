use super::{
    config::BridgeConfig,
    elm::{parse_write, ElmApp, ElmModule, JsElmPort, JsElmStorePort},
    js_error::JsBridgeError,
    set_timeout::SetTimeout,
    store_value::JsStoreValue,
    web_storage::{JsStorageSubscription, JsWebStorage},
};
use crate::{macros::entry_span, set_panic_hook};
use dupe::Dupe;
use js_sys::Object;
use serde::Serialize;
use storage_ports_core::{relay::Relay, snapshot::Snapshot, storage::StorageArea};
use wasm_bindgen::{prelude::*, JsCast};
use web_sys::Window;

type BridgeRelay = Relay<JsWebStorage, JsElmPort, SetTimeout, JsStoreValue>;

/// Connects a running Elm application to Web Storage.
///
/// Writes arriving on the store port are applied to storage and acknowledged
/// on the change port on a later turn. Changes made by other tabs are
/// forwarded to the change port as they arrive.
#[wasm_bindgen]
#[derive(Debug)]
pub struct StorageBridge {
    app: ElmApp,
    relay: BridgeRelay,
    store_port: JsElmStorePort,
    on_write: Option<Closure<dyn FnMut(JsValue)>>,
    storage_subscription: Option<JsStorageSubscription>,
}

#[wasm_bindgen]
impl StorageBridge {
    /// Read the stored entries, start `elmModule` with them as flags, and
    /// connect its ports.
    pub fn start(
        #[wasm_bindgen(js_name = elmModule)] elm_module: &ElmModule,
        #[wasm_bindgen(unchecked_param_type = "BridgeConfig | undefined")] config: Option<Object>,
    ) -> Result<StorageBridge, JsBridgeError> {
        set_panic_hook();
        entry_span!("StorageBridge::start");

        let config = BridgeConfig::from_js(config)?;
        let window = web_sys::window().ok_or(JsBridgeError::NoWindow)?;
        let storage = JsWebStorage::new(&window, config.area)?;

        let flags = snapshot_object(Snapshot::read(&storage)?)?;
        // Programs that own the whole document take no node, so `null` is passed
        // through and left to the runtime.
        let node: JsValue = match window
            .document()
            .ok_or(JsBridgeError::NoDocument)?
            .get_element_by_id(&config.node)
        {
            Some(node) => node.into(),
            None => {
                tracing::warn!(node = %config.node, "mount node not found, passing null");
                JsValue::NULL
            }
        };

        let app = elm_module.start(&node, &flags)?;
        tracing::info!(area = %config.area, "application started");

        Self::connect(app, window, storage, &config)
    }

    /// Connect the ports of an application that is already running.
    pub fn attach(
        app: ElmApp,
        #[wasm_bindgen(unchecked_param_type = "BridgeConfig | undefined")] config: Option<Object>,
    ) -> Result<StorageBridge, JsBridgeError> {
        set_panic_hook();
        entry_span!("StorageBridge::attach");

        let config = BridgeConfig::from_js(config)?;
        let window = web_sys::window().ok_or(JsBridgeError::NoWindow)?;
        let storage = JsWebStorage::new(&window, config.area)?;

        Self::connect(app, window, storage, &config)
    }

    #[wasm_bindgen(getter)]
    pub fn app(&self) -> ElmApp {
        self.app.clone()
    }

    #[wasm_bindgen(getter, unchecked_return_type = "StorageAreaName")]
    pub fn area(&self) -> String {
        self.relay.area().to_string()
    }

    /// Every stored entry as a plain object of raw strings.
    #[wasm_bindgen(unchecked_return_type = "Record<string, string>")]
    pub fn snapshot(&self) -> Result<Object, JsBridgeError> {
        entry_span!("StorageBridge::snapshot");
        snapshot_object(self.relay.snapshot()?)
    }

    #[wasm_bindgen(getter, js_name = isConnected)]
    pub fn is_connected(&self) -> bool {
        self.on_write.is_some() || self.storage_subscription.is_some()
    }

    /// Unsubscribe from the store port and stop listening for changes from
    /// other tabs. Calling it again does nothing.
    pub fn stop(&mut self) -> Result<(), JsBridgeError> {
        entry_span!("StorageBridge::stop");
        self.storage_subscription.take();

        if let Some(on_write) = self.on_write.take() {
            self.store_port.unsubscribe(on_write.as_ref().unchecked_ref())?;
        }
        Ok(())
    }
}

impl StorageBridge {
    fn connect(
        app: ElmApp,
        window: Window,
        storage: JsWebStorage,
        config: &BridgeConfig,
    ) -> Result<Self, JsBridgeError> {
        let change_port = JsElmPort::find(&app, &config.change_port)?;
        let store_port = JsElmStorePort::find(&app, &config.store_port)?;
        let relay: BridgeRelay = Relay::new(storage, change_port, SetTimeout::new(window));

        let on_write = Closure::<dyn FnMut(JsValue)>::new({
            let relay = relay.dupe();
            move |message: JsValue| {
                if let Err(err) = relay_write(&relay, message) {
                    tracing::error!(%err, "storage write failed");
                    web_sys::console::error_1(&err.into());
                }
            }
        });
        store_port.subscribe(on_write.as_ref().unchecked_ref())?;

        let storage_subscription = relay.listen()?;
        tracing::debug!(
            store_port = %config.store_port,
            change_port = %config.change_port,
            "ports connected"
        );

        Ok(Self {
            app,
            relay,
            store_port,
            on_write: Some(on_write),
            storage_subscription: Some(storage_subscription),
        })
    }
}

impl Drop for StorageBridge {
    fn drop(&mut self) {
        // The Elm runtime would otherwise call into a freed closure.
        if let Err(err) = self.stop() {
            tracing::warn!(%err, "failed to disconnect storage bridge");
        }
    }
}

fn relay_write(relay: &BridgeRelay, message: JsValue) -> Result<(), JsBridgeError> {
    let request = parse_write(message)?;
    relay.write(request)?;
    Ok(())
}

fn snapshot_object(snapshot: Snapshot) -> Result<Object, JsBridgeError> {
    let serializer = serde_wasm_bindgen::Serializer::new().serialize_maps_as_objects(true);
    Ok(snapshot.serialize(&serializer)?.unchecked_into())
}

/// Every entry in `localStorage`, as a plain object of raw strings.
#[wasm_bindgen(js_name = allState, unchecked_return_type = "Record<string, string>")]
pub fn all_state() -> Result<Object, JsBridgeError> {
    entry_span!("allState");
    let window = web_sys::window().ok_or(JsBridgeError::NoWindow)?;
    let storage = JsWebStorage::new(&window, StorageArea::Local)?;
    snapshot_object(Snapshot::read(&storage)?)
}
