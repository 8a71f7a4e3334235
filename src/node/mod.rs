//! Single threaded event loop
//!
//! Minimal loop that owns periodic timers and dispatches their callbacks from
//! [spin_once](struct.Node.html#method.spin_once).
//!
//! ## Usage
//!
//!```rust
//! use spin_timer::node::Node;
//! use spin_timer::{RawTimer, Spin};
//!
//! use core::time;
//! use std::rc::Rc;
//! use std::cell::Cell;
//!
//! let node = Node::new("ticker");
//! let ticks = Rc::new(Cell::new(0u32));
//! let counter = ticks.clone();
//! let timer = node.create_timer(time::Duration::from_millis(10), move || counter.set(counter.get() + 1)).expect("To create timer");
//!
//! node.spin_once(time::Duration::from_millis(100)).expect("To spin");
//! node.spin_once(time::Duration::from_millis(100)).expect("To spin");
//! assert_eq!(ticks.get(), 2);
//!
//! timer.cancel().expect("To cancel");
//! node.spin_once(time::Duration::from_millis(20)).expect("To spin");
//! assert_eq!(ticks.get(), 2);
//!```

use core::{fmt, time};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Instant;

use crate::provider::{self, Waiter};
use crate::{Error, RawTimer, Result, Spin};

mod timer;

pub use timer::NodeTimer;
use timer::Slot;

struct Inner {
    name: String,
    timers: RefCell<Vec<Rc<RefCell<Slot>>>>,
    //Created on first wait
    waiter: RefCell<Option<provider::Platform>>,
    destroyed: Cell<bool>,
}

///Event loop owning periodic timers.
///
///Callbacks are executed on the thread calling `spin_once`, one callback per call.
///
///`Node` is a handle: clones refer to the same loop.
#[derive(Clone)]
pub struct Node {
    inner: Rc<Inner>,
}

impl Node {
    ///Creates new instance
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            inner: Rc::new(Inner {
                name: name.into(),
                timers: RefCell::new(Vec::new()),
                waiter: RefCell::new(None),
                destroyed: Cell::new(false),
            })
        }
    }

    #[inline]
    ///Returns node's name
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    ///Creates periodic timer, which is armed immediately.
    ///
    ///First call happens after `period` elapses.
    pub fn create_timer<F: FnMut() + 'static>(&self, period: time::Duration, callback: F) -> Result<NodeTimer> {
        if self.inner.destroyed.get() {
            return Err(Error::Destroyed);
        }

        let slot = Rc::new(RefCell::new(Slot::new(period, Box::new(callback), Instant::now())));
        self.inner.timers.borrow_mut().push(slot.clone());
        tracing::debug!(node = %self.inner.name, ?period, "timer created");

        Ok(NodeTimer::new(slot))
    }

    ///Returns number of timers that are not destroyed.
    pub fn timer_count(&self) -> usize {
        self.prune();
        self.inner.timers.borrow().len()
    }

    ///Destroys node together with all its timers.
    ///
    ///Further spinning or timer creation fails with `Error::Destroyed`.
    pub fn destroy(&self) {
        self.inner.destroyed.set(true);
        let timers = core::mem::replace(&mut *self.inner.timers.borrow_mut(), Vec::new());
        for slot in timers.iter() {
            NodeTimer::new(slot.clone()).destroy();
        }
        tracing::debug!(node = %self.inner.name, timers = timers.len(), "node destroyed");
    }

    #[inline]
    ///Returns whether node is destroyed.
    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.get()
    }

    fn prune(&self) {
        self.inner.timers.borrow_mut().retain(|slot| !slot.borrow().destroyed);
    }

    //Most overdue timer among active
    fn next_ready(&self, now: Instant) -> Option<Rc<RefCell<Slot>>> {
        self.prune();
        let timers = self.inner.timers.borrow();
        let ready = timers.iter()
                          .filter(|slot| slot.borrow().is_due(now))
                          .min_by_key(|slot| slot.borrow().next_call)
                          .cloned();
        ready
    }

    fn earliest_call(&self) -> Option<Instant> {
        let timers = self.inner.timers.borrow();
        let call = timers.iter()
                         .map(|slot| slot.borrow())
                         .filter(|slot| !slot.canceled && !slot.destroyed)
                         .map(|slot| slot.next_call)
                         .min();
        call
    }

    fn wait(&self, timeout: time::Duration) -> Result<()> {
        let mut waiter = self.inner.waiter.borrow_mut();
        if waiter.is_none() {
            *waiter = Some(provider::Platform::new()?);
        }

        tracing::trace!(node = %self.inner.name, ?timeout, "waiting");
        if let Some(waiter) = waiter.as_mut() {
            waiter.wait(timeout)?;
        }
        Ok(())
    }

    fn dispatch(&self, slot: &Rc<RefCell<Slot>>) {
        let mut callback = {
            let mut slot = slot.borrow_mut();
            slot.fire(Instant::now())
        };

        tracing::trace!(node = %self.inner.name, "dispatching timer");
        if let Some(callback) = callback.as_mut() {
            callback();
        }

        //Callback might have replaced itself or destroyed timer
        let callback = {
            let mut slot = slot.borrow_mut();
            if slot.callback.is_none() && !slot.destroyed {
                slot.callback = callback;
                None
            } else {
                callback
            }
        };
        drop(callback);
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        //Callbacks may hold handles to their own timer, so release them explicitly
        for slot in self.timers.get_mut().drain(..) {
            NodeTimer::new(slot).destroy();
        }
    }
}

impl Spin for Node {
    fn spin_once(&self, timeout: time::Duration) -> Result<()> {
        if self.inner.destroyed.get() {
            return Err(Error::Destroyed);
        }

        let now = Instant::now();
        let slot = match self.next_ready(now) {
            Some(slot) => slot,
            None => {
                let wait = match self.earliest_call() {
                    Some(call) => call.saturating_duration_since(now).min(timeout),
                    None => timeout,
                };

                self.wait(wait)?;

                match self.next_ready(Instant::now()) {
                    Some(slot) => slot,
                    None => return Ok(()),
                }
            }
        };

        self.dispatch(&slot);
        Ok(())
    }

    #[inline(always)]
    fn now(&self) -> Instant {
        Instant::now()
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
         .field("name", &self.inner.name)
         .field("timers", &self.inner.timers.borrow().len())
         .field("destroyed", &self.inner.destroyed.get())
         .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::Node;
    use crate::{Error, RawTimer, Spin};

    use core::time;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn should_dispatch_most_overdue_timer_first() {
        let node = Node::new("order");
        let order = Rc::new(Cell::new(0u8));

        let slow_order = order.clone();
        let _slow = node.create_timer(time::Duration::from_millis(20), move || slow_order.set(slow_order.get() * 10 + 2)).expect("To create");
        let fast_order = order.clone();
        let _fast = node.create_timer(time::Duration::from_millis(5), move || fast_order.set(fast_order.get() * 10 + 1)).expect("To create");

        std::thread::sleep(time::Duration::from_millis(30));
        node.spin_once(time::Duration::from_secs(0)).expect("To spin");
        node.spin_once(time::Duration::from_secs(0)).expect("To spin");

        assert_eq!(order.get(), 12);
    }

    #[test]
    fn should_wait_out_timeout_without_timers() {
        let node = Node::new("idle");

        let before = std::time::Instant::now();
        node.spin_once(time::Duration::from_millis(20)).expect("To spin");
        assert!(before.elapsed() >= time::Duration::from_millis(20));
    }

    #[test]
    fn should_destroy_timers_with_node() {
        let node = Node::new("destroy");
        let timer = node.create_timer(time::Duration::from_millis(5), || ()).expect("To create");
        assert_eq!(node.timer_count(), 1);

        node.destroy();
        assert!(node.is_destroyed());
        assert_eq!(node.timer_count(), 0);
        assert!(timer.is_canceled());

        match timer.reset() {
            Err(Error::Destroyed) => (),
            other => panic!("Unexpected result: {:?}", other),
        }
        match node.spin_once(time::Duration::from_millis(1)) {
            Err(Error::Destroyed) => (),
            other => panic!("Unexpected result: {:?}", other),
        }
        assert!(node.create_timer(time::Duration::from_millis(1), || ()).is_err());
    }

    #[test]
    fn should_release_callbacks_when_dropped() {
        let node = Node::new("drop");
        let captured = Rc::new(());

        let timer = node.create_timer(time::Duration::from_millis(5), || ()).expect("To create");
        let handle = timer.clone();
        let sentinel = captured.clone();
        timer.set_callback(Box::new(move || {
            let _ = &sentinel;
            let _ = handle.cancel();
        })).expect("To set");
        assert_eq!(Rc::strong_count(&captured), 2);

        drop(timer);
        drop(node);
        assert_eq!(Rc::strong_count(&captured), 1);
    }

    #[test]
    fn should_allow_callback_to_replace_itself() {
        let node = Node::new("replace");
        let hits = Rc::new(Cell::new(0u32));

        let timer = node.create_timer(time::Duration::from_millis(5), || ()).expect("To create");
        let handle = timer.clone();
        let outer_hits = hits.clone();
        timer.set_callback(Box::new(move || {
            outer_hits.set(outer_hits.get() + 1);
            let inner_hits = outer_hits.clone();
            handle.set_callback(Box::new(move || inner_hits.set(inner_hits.get() + 100))).expect("To replace");
        })).expect("To set");

        node.spin_once(time::Duration::from_millis(100)).expect("To spin");
        node.spin_once(time::Duration::from_millis(100)).expect("To spin");

        assert_eq!(hits.get(), 101);
    }
}
