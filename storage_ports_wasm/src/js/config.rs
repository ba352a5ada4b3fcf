use super::js_error::JsBridgeError;
use serde::{Deserialize, Serialize};
use storage_ports_core::storage::StorageArea;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(typescript_custom_section)]
const TS: &'static str = r#"
export type StorageAreaName = "local" | "session"

export type BridgeConfig = {
    node?: string,
    storePort?: string,
    changePort?: string,
    area?: StorageAreaName,
}

export interface ElmApp {
    ports: Record<string, {
        subscribe?(callback: (message: [string, unknown]) => void): void
        unsubscribe?(callback: (message: [string, unknown]) => void): void
        send?(message: [string | null, unknown]): void
    }>
}

export interface ElmModule {
    init(options: { node: Element, flags: Record<string, string> }): ElmApp
}
"#;

pub const DEFAULT_NODE: &str = "myapp";
pub const DEFAULT_STORE_PORT: &str = "storeCache";
pub const DEFAULT_CHANGE_PORT: &str = "onStoreChange";

/// Where to mount the application and which ports carry storage traffic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct BridgeConfig {
    /// Element id the application is mounted at.
    pub node: String,

    /// Outgoing port carrying `[key, value]` writes from the application.
    pub store_port: String,

    /// Incoming port the application receives `[key, value]` changes on.
    pub change_port: String,

    pub area: StorageArea,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            node: DEFAULT_NODE.to_string(),
            store_port: DEFAULT_STORE_PORT.to_string(),
            change_port: DEFAULT_CHANGE_PORT.to_string(),
            area: StorageArea::Local,
        }
    }
}

impl BridgeConfig {
    /// Read a config object from JavaScript. `undefined` and `null` give the
    /// defaults.
    pub fn from_js(value: Option<js_sys::Object>) -> Result<Self, JsBridgeError> {
        match value {
            None => Ok(Self::default()),
            Some(obj) => serde_wasm_bindgen::from_value(obj.into()).map_err(JsBridgeError::Config),
        }
    }
}
