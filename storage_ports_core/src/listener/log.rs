use super::ChangeListener;
use crate::change::StoreChange;
use derive_more::{From, Into};
use dupe::Dupe;
use std::{cell::RefCell, rc::Rc};
use tracing::instrument;

/// Records every change in delivery order.
#[derive(Debug, From, Into)]
pub struct Log<V>(pub Rc<RefCell<Vec<StoreChange<V>>>>);

impl<V> Log<V> {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(Vec::new())))
    }

    pub fn push(&self, change: StoreChange<V>) {
        self.0.borrow_mut().push(change)
    }

    pub fn pop(&self) -> Option<StoreChange<V>> {
        self.0.borrow_mut().pop()
    }

    /// Take every recorded change, leaving the log empty.
    pub fn drain(&self) -> Vec<StoreChange<V>> {
        std::mem::take(&mut *self.0.borrow_mut())
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }
}

impl<V: Clone> Log<V> {
    pub fn changes(&self) -> Vec<StoreChange<V>> {
        self.0.borrow().clone()
    }
}

impl<V> Clone for Log<V> {
    fn clone(&self) -> Self {
        Self(self.0.dupe())
    }
}

impl<V> Dupe for Log<V> {
    fn dupe(&self) -> Self {
        self.clone()
    }
}

impl<V> Default for Log<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: 'static> ChangeListener<V> for Log<V> {
    #[instrument(skip_all, fields(key = ?change.key()))]
    fn on_store_change(&self, change: StoreChange<V>) {
        self.push(change)
    }
}
