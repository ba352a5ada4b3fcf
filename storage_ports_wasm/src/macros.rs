/// Enter a debug span named after an exported entry point until the end of
/// the enclosing block.
macro_rules! entry_span {
    ($label:expr) => {
        let __entry_span = tracing::debug_span!("js_entry", entry = $label);
        let __entry_guard = __entry_span.enter();
        tracing::debug!("start");
    };
}

pub(crate) use entry_span;
