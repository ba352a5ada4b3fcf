pub mod js;
mod macros;

pub use js::storage_bridge::StorageBridge;

use wasm_bindgen::prelude::*;

/// Panic hook lets us get better error messages if our Rust code ever panics.
///
/// Called by [`StorageBridge::start`] and [`StorageBridge::attach`]; exported
/// for callers that only use [`js::storage_bridge::all_state`].
#[wasm_bindgen(js_name = "setPanicHook")]
pub fn set_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}
