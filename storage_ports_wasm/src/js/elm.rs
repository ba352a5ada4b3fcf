//! Duck-typed bindings to a compiled Elm program and its ports.
//!
//! An outgoing port (Elm → JS) has `subscribe`/`unsubscribe`; an incoming
//! port (JS → Elm) has `send`. Both are looked up by name on `app.ports`.

use super::{js_error::JsBridgeError, store_value::JsStoreValue};
use dupe::Dupe;
use js_sys::{Array, Function, Reflect};
use storage_ports_core::{change::StoreChange, listener::ChangeListener, value::WriteRequest};
use wasm_bindgen::{prelude::*, JsCast};

#[wasm_bindgen]
extern "C" {
    /// A compiled Elm module such as `Elm.Main`.
    #[wasm_bindgen(typescript_type = "ElmModule")]
    #[derive(Debug, Clone)]
    pub type ElmModule;

    #[wasm_bindgen(method, catch)]
    fn init(this: &ElmModule, options: &JsValue) -> Result<ElmApp, JsValue>;

    /// A running Elm application, as returned by `init`.
    #[wasm_bindgen(typescript_type = "ElmApp")]
    #[derive(Debug, Clone)]
    pub type ElmApp;

    #[wasm_bindgen(method, getter)]
    fn ports(this: &ElmApp) -> JsValue;

    #[derive(Debug, Clone)]
    type IncomingPort;

    #[wasm_bindgen(method, catch)]
    fn send(this: &IncomingPort, message: &JsValue) -> Result<(), JsValue>;

    #[derive(Debug, Clone)]
    type OutgoingPort;

    #[wasm_bindgen(method, catch)]
    fn subscribe(this: &OutgoingPort, callback: &Function) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch)]
    fn unsubscribe(this: &OutgoingPort, callback: &Function) -> Result<(), JsValue>;
}

impl ElmModule {
    /// `init({ node, flags })`.
    pub fn start(&self, node: &JsValue, flags: &JsValue) -> Result<ElmApp, JsBridgeError> {
        let options = js_sys::Object::new();
        Reflect::set(&options, &"node".into(), node).map_err(JsBridgeError::Init)?;
        Reflect::set(&options, &"flags".into(), flags).map_err(JsBridgeError::Init)?;
        self.init(&options).map_err(JsBridgeError::Init)
    }
}

/// Look up `app.ports[name]` and check it has a `method` function.
fn find_port(app: &ElmApp, name: &str, method: &'static str) -> Result<JsValue, JsBridgeError> {
    let ports = app.ports();
    if !ports.is_object() {
        return Err(JsBridgeError::NoPorts);
    }

    let missing = || JsBridgeError::MissingPort {
        name: name.to_string(),
        method,
    };
    let port = Reflect::get(&ports, &name.into()).map_err(|_| missing())?;
    if !port.is_object() {
        return Err(missing());
    }
    let has_method = Reflect::get(&port, &method.into())
        .map(|f| f.is_function())
        .unwrap_or(false);
    if !has_method {
        return Err(missing());
    }

    Ok(port)
}

/// The incoming port the application hears storage changes on.
#[derive(Debug, Clone)]
pub struct JsElmPort {
    name: String,
    port: IncomingPort,
}

impl JsElmPort {
    pub fn find(app: &ElmApp, name: &str) -> Result<Self, JsBridgeError> {
        Ok(Self {
            name: name.to_string(),
            port: find_port(app, name, "send")?.unchecked_into(),
        })
    }

    pub fn send(&self, message: &JsValue) -> Result<(), JsBridgeError> {
        self.port.send(message).map_err(|error| JsBridgeError::Port {
            name: self.name.clone(),
            error,
        })
    }
}

impl Dupe for JsElmPort {
    fn dupe(&self) -> Self {
        self.clone()
    }
}

impl ChangeListener<JsStoreValue> for JsElmPort {
    fn on_store_change(&self, change: StoreChange<JsStoreValue>) {
        if let Err(err) = self.send(&change_message(change).into()) {
            tracing::error!(%err, "failed to deliver storage change");
            web_sys::console::error_1(&err.into());
        }
    }
}

/// The `[key, value]` pair an incoming port receives. Absent parts are `null`.
pub fn change_message(change: StoreChange<JsStoreValue>) -> Array {
    let (key, value) = match change {
        StoreChange::Committed { key, value } => (
            JsValue::from(key),
            value.map_or(JsValue::NULL, JsValue::from),
        ),
        StoreChange::External { key, new_value } => (
            key.map_or(JsValue::NULL, JsValue::from),
            new_value.map_or(JsValue::NULL, JsValue::from),
        ),
    };
    Array::of2(&key, &value)
}

/// Parse the `[key, value]` pair an outgoing port emits. A `null` or missing
/// value means "remove the key".
pub fn parse_write(message: JsValue) -> Result<WriteRequest<JsStoreValue>, JsBridgeError> {
    if !Array::is_array(&message) {
        return Err(JsBridgeError::MalformedMessage(message));
    }
    let pair: Array = message.unchecked_into();

    let Some(key) = pair.get(0).as_string() else {
        return Err(JsBridgeError::MalformedMessage(pair.into()));
    };
    let value = pair.get(1);

    if value.is_null() || value.is_undefined() {
        Ok(WriteRequest::remove(key))
    } else {
        Ok(WriteRequest::store(key, JsStoreValue(value)))
    }
}

/// The outgoing port the application writes through.
#[derive(Debug, Clone)]
pub struct JsElmStorePort {
    name: String,
    port: OutgoingPort,
}

impl JsElmStorePort {
    pub fn find(app: &ElmApp, name: &str) -> Result<Self, JsBridgeError> {
        Ok(Self {
            name: name.to_string(),
            port: find_port(app, name, "subscribe")?.unchecked_into(),
        })
    }

    pub fn subscribe(&self, callback: &Function) -> Result<(), JsBridgeError> {
        self.port.subscribe(callback).map_err(|error| JsBridgeError::Port {
            name: self.name.clone(),
            error,
        })
    }

    pub fn unsubscribe(&self, callback: &Function) -> Result<(), JsBridgeError> {
        self.port.unsubscribe(callback).map_err(|error| JsBridgeError::Port {
            name: self.name.clone(),
            error,
        })
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    #[cfg(feature = "browser_test")]
    wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

    mod parse_write {
        use super::*;

        #[wasm_bindgen_test]
        fn test_value_is_stored() {
            let msg = Array::of2(&"theme".into(), &"dark".into());
            let req = parse_write(msg.into()).unwrap();
            assert_eq!(req.key, "theme");
            assert_eq!(req.value, Some(JsStoreValue("dark".into())));
        }

        #[wasm_bindgen_test]
        fn test_null_removes() {
            let msg = Array::of2(&"theme".into(), &JsValue::NULL);
            assert!(parse_write(msg.into()).unwrap().is_removal());

            let short = Array::of1(&"theme".into());
            assert!(parse_write(short.into()).unwrap().is_removal());
        }

        #[wasm_bindgen_test]
        fn test_non_string_key_is_rejected() {
            let msg = Array::of2(&JsValue::from(7), &"dark".into());
            assert!(matches!(
                parse_write(msg.into()),
                Err(JsBridgeError::MalformedMessage(_))
            ));
            assert!(matches!(
                parse_write("theme".into()),
                Err(JsBridgeError::MalformedMessage(_))
            ));
        }
    }

    mod change_message {
        use super::*;

        #[wasm_bindgen_test]
        fn test_committed_carries_original_value() {
            let msg = change_message(StoreChange::Committed {
                key: "theme".into(),
                value: Some(JsStoreValue(JsValue::from(true))),
            });
            assert_eq!(msg.length(), 2);
            assert_eq!(msg.get(0).as_string().as_deref(), Some("theme"));
            assert_eq!(msg.get(1).as_bool(), Some(true));
        }

        #[wasm_bindgen_test]
        fn test_external_clear_is_all_null() {
            let msg = change_message(StoreChange::External {
                key: None,
                new_value: None,
            });
            assert!(msg.get(0).is_null());
            assert!(msg.get(1).is_null());
        }
    }
}
