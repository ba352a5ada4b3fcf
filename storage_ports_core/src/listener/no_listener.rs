use super::ChangeListener;
use crate::change::StoreChange;
use dupe::Dupe;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Dupe, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoListener;

impl<V> ChangeListener<V> for NoListener {
    fn on_store_change(&self, _change: StoreChange<V>) {}
}
