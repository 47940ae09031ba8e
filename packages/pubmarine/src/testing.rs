//! Testing utilities for code built on the dispatcher.
//!
//! # Feature Flag
//!
//! This module is only available with the `testing` feature:
//!
//! ```toml
//! [dev-dependencies]
//! pubmarine = { version = "0.1", features = ["testing"] }
//! ```
//!
//! Both helpers hand out a [`Callback`] that the test must keep alive for as
//! long as the subscription should last; dropping it is how a test simulates
//! a subscriber going away.
//!
//! ```ignore
//! let counter = CallCounter::new();
//! let callback = counter.callback();
//! dispatcher.subscribe("tick", WeakRef::callback(&callback))?;
//!
//! dispatcher.publish("tick", ())?;
//! queue.run_pending();
//! assert_eq!(counter.get(), 1);
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::weak::Callback;

/// Counts how many times its callbacks ran.
#[derive(Debug, Clone, Default)]
pub struct CallCounter {
    calls: Rc<Cell<usize>>,
}

impl CallCounter {
    /// Create a counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of invocations so far.
    pub fn get(&self) -> usize {
        self.calls.get()
    }

    /// A new callback that increments this counter, ignoring its payload.
    pub fn callback<P: 'static>(&self) -> Callback<P> {
        let calls = Rc::clone(&self.calls);
        Rc::new(move |_: P| calls.set(calls.get() + 1))
    }
}

/// Records every payload its callbacks receive, in invocation order.
#[derive(Debug)]
pub struct Recorder<P> {
    seen: Rc<RefCell<Vec<P>>>,
}

impl<P: Clone + 'static> Recorder<P> {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self {
            seen: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// A new callback that appends each payload to this recorder.
    pub fn callback(&self) -> Callback<P> {
        let seen = Rc::clone(&self.seen);
        Rc::new(move |payload: P| seen.borrow_mut().push(payload))
    }

    /// Snapshot of the payloads recorded so far.
    pub fn seen(&self) -> Vec<P> {
        self.seen.borrow().clone()
    }

    /// Number of payloads recorded.
    pub fn len(&self) -> usize {
        self.seen.borrow().len()
    }

    /// True if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.seen.borrow().is_empty()
    }

    /// Take the recorded payloads, leaving the recorder empty.
    pub fn take(&self) -> Vec<P> {
        std::mem::take(&mut *self.seen.borrow_mut())
    }
}

impl<P: Clone + 'static> Default for Recorder<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Clone for Recorder<P> {
    fn clone(&self) -> Self {
        Self {
            seen: Rc::clone(&self.seen),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_counter() {
        let counter = CallCounter::new();
        let callback: Callback<u8> = counter.callback();
        callback(1);
        callback(2);
        assert_eq!(counter.get(), 2);
    }

    #[test]
    fn test_recorder_take() {
        let recorder = Recorder::new();
        let callback = recorder.callback();
        callback("a");
        callback("b");
        assert_eq!(recorder.len(), 2);
        assert_eq!(recorder.take(), vec!["a", "b"]);
        assert!(recorder.is_empty());
    }

    #[test]
    fn test_clones_share_storage() {
        let recorder = Recorder::new();
        let other = recorder.clone();
        (recorder.callback())(3);
        assert_eq!(other.seen(), vec![3]);
    }
}
