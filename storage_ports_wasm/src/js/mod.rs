pub mod config;
pub mod elm;
pub mod js_error;
pub mod set_timeout;
pub mod storage_bridge;
pub mod store_value;
pub mod web_storage;
