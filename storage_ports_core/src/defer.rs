//! Deferring work to a later turn of the event loop.
//!
//! Commit notifications must not be delivered from inside the application's
//! own outbound call. A [`Defer`] implementation moves them onto a later turn.

use derive_more::{From, Into};
use dupe::Dupe;
use std::{cell::RefCell, collections::VecDeque, fmt, rc::Rc};

pub type Task = Box<dyn FnOnce() + 'static>;

pub trait Defer {
    /// Run `task` after the current turn has finished. Never runs it inline.
    fn defer(&self, task: Task);
}

/// A FIFO of deferred tasks, drained explicitly with [`DeferQueue::run_pending`].
#[derive(Default, From, Into)]
pub struct DeferQueue(Rc<RefCell<VecDeque<Task>>>);

impl DeferQueue {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(VecDeque::new())))
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Run queued tasks until the queue is empty, including tasks queued while
    /// draining. Returns the number of tasks run.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        // The borrow must end before the task runs: tasks may defer more work.
        while let Some(task) = self.next() {
            task();
            ran += 1;
        }
        ran
    }

    fn next(&self) -> Option<Task> {
        self.0.borrow_mut().pop_front()
    }
}

impl Defer for DeferQueue {
    fn defer(&self, task: Task) {
        self.0.borrow_mut().push_back(task);
    }
}

impl Clone for DeferQueue {
    fn clone(&self) -> Self {
        Self(self.0.dupe())
    }
}

impl Dupe for DeferQueue {
    fn dupe(&self) -> Self {
        self.clone()
    }
}

impl fmt::Debug for DeferQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferQueue")
            .field("pending", &self.len())
            .finish()
    }
}
