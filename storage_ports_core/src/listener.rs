//! Change listeners.
//!
//! A listener is the application's inbound channel: the relay calls it with
//! every [`StoreChange`] the application should hear about.
//!
//! If you don't need to observe changes, use [`NoListener`].
//!
//! [`NoListener`]: self::no_listener::NoListener

pub mod log;
pub mod no_listener;

use crate::change::StoreChange;

pub trait ChangeListener<V>: Clone + 'static {
    fn on_store_change(&self, change: StoreChange<V>);
}
