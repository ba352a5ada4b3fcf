use super::{store_value::JsEncodeError, web_storage::JsStorageError};
use storage_ports_core::{error::WriteError, storage::StorageArea};
use thiserror::Error;
use wasm_bindgen::prelude::*;

pub type JsWriteError = WriteError<JsStorageError, JsEncodeError>;

#[derive(Debug, Error)]
pub enum JsBridgeError {
    #[error("No global `window` object")]
    NoWindow,

    #[error("No `document` on the window")]
    NoDocument,

    #[error("{0} storage is not available")]
    StorageUnavailable(StorageArea),

    #[error(transparent)]
    Storage(#[from] JsStorageError),

    #[error("Invalid bridge config: {0}")]
    Config(serde_wasm_bindgen::Error),

    #[error("Cannot convert value for JavaScript: {0}")]
    Serde(#[from] serde_wasm_bindgen::Error),

    #[error("Application has no `ports` object")]
    NoPorts,

    #[error("Port {name:?} is missing or has no `{method}` function")]
    MissingPort { name: String, method: &'static str },

    #[error("Port {name:?} rejected the call: {error:?}")]
    Port { name: String, error: JsValue },

    #[error("Application init failed: {0:?}")]
    Init(JsValue),

    #[error("Malformed port message, expected [key, value]: {0:?}")]
    MalformedMessage(JsValue),

    #[error(transparent)]
    Write(#[from] JsWriteError),
}

impl JsBridgeError {
    fn name(&self) -> &'static str {
        match self {
            JsBridgeError::NoWindow | JsBridgeError::NoDocument => "EnvironmentError",
            JsBridgeError::StorageUnavailable(_) | JsBridgeError::Storage(_) => "StorageError",
            JsBridgeError::Config(_) => "ConfigError",
            JsBridgeError::Serde(_) => "SerializationError",
            JsBridgeError::NoPorts
            | JsBridgeError::MissingPort { .. }
            | JsBridgeError::Port { .. }
            | JsBridgeError::MalformedMessage(_) => "PortError",
            JsBridgeError::Init(_) => "InitError",
            JsBridgeError::Write(_) => "WriteError",
        }
    }
}

impl From<JsBridgeError> for JsValue {
    fn from(err: JsBridgeError) -> Self {
        let js_err = js_sys::Error::new(&err.to_string());
        js_err.set_name(err.name());
        js_err.into()
    }
}
