use derive_more::{From, Into};
use dupe::Dupe;
use storage_ports_core::value::StoreValue;
use thiserror::Error;
use wasm_bindgen::prelude::*;

/// A value sent out of the application through its storage port.
///
/// Stored as `JSON.stringify(value)` and handed back unchanged in the commit
/// notification.
#[derive(Debug, Clone, PartialEq, From, Into)]
pub struct JsStoreValue(pub JsValue);

impl Dupe for JsStoreValue {
    fn dupe(&self) -> Self {
        self.clone()
    }
}

impl StoreValue for JsStoreValue {
    type EncodeError = JsEncodeError;

    fn to_stored(&self) -> Result<String, Self::EncodeError> {
        let json = js_sys::JSON::stringify(&self.0).map_err(JsEncodeError::Thrown)?;
        // `JSON.stringify` yields `undefined` for functions, symbols and `undefined`
        json.as_string().ok_or(JsEncodeError::NotSerializable)
    }
}

#[derive(Debug, Clone, Error)]
pub enum JsEncodeError {
    #[error("JSON.stringify threw: {0:?}")]
    Thrown(JsValue),

    #[error("Value has no JSON representation")]
    NotSerializable,
}
