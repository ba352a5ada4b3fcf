use dupe::Dupe;
use storage_ports_core::defer::{Defer, Task};
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::Window;

/// Defers tasks with `setTimeout(task, 0)`, i.e. to a later macrotask.
#[derive(Debug, Clone)]
pub struct SetTimeout {
    window: Window,
}

impl SetTimeout {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl Dupe for SetTimeout {
    fn dupe(&self) -> Self {
        self.clone()
    }
}

impl Defer for SetTimeout {
    fn defer(&self, task: Task) {
        let callback = Closure::once_into_js(move || task());
        if let Err(err) = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), 0)
        {
            tracing::error!(?err, "setTimeout failed; deferred task dropped");
            web_sys::console::error_2(&"setTimeout failed; deferred task dropped".into(), &err);
        }
    }
}
