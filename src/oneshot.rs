//! One-shot timer
//!
//! Adapts periodic [RawTimer](../trait.RawTimer.html) so that it fires only once per arming.
//!
//! ## Usage
//!
//!```rust
//! use spin_timer::node::Node;
//! use spin_timer::oneshot::OneShot;
//! use spin_timer::Spin;
//!
//! use core::time;
//! use std::rc::Rc;
//! use std::cell::Cell;
//!
//! let node = Node::new("oneshot");
//! let raw = node.create_timer(time::Duration::from_secs(1), || ()).expect("To create timer");
//!
//! let fired = Rc::new(Cell::new(0u32));
//! let counter = fired.clone();
//! let mut timer = OneShot::new(raw);
//! timer.arm(time::Duration::from_millis(10), move || counter.set(counter.get() + 1)).expect("To arm");
//!
//! node.spin_once(time::Duration::from_millis(50)).expect("To spin");
//! node.spin_once(time::Duration::from_millis(50)).expect("To spin");
//! assert_eq!(fired.get(), 1);
//! assert!(timer.is_canceled());
//!```

use core::time;

use crate::{RawTimer, Result};

///Wrapper that converts periodic timer into one-shot.
///
///Wrapper preserves interface of underlying timer, forwarding all operations to it.
///Once expired, timer is cancelled and can be re-used via `reset`.
pub struct OneShot<T> {
    timer: T,
}

impl<T: RawTimer + 'static> OneShot<T> {
    #[inline]
    ///Wraps already created timer.
    ///
    ///Timer's state is left as it is until `arm` is called.
    pub fn new(timer: T) -> Self {
        Self {
            timer,
        }
    }

    ///Arms timer with new period and callback.
    ///
    ///Timer is restarted, and `callback` will be invoked once after `period`.
    ///Previously installed callback is discarded.
    pub fn arm<F: FnMut() + 'static>(&mut self, period: time::Duration, mut callback: F) -> Result<&mut Self> {
        self.timer.cancel()?;

        let timer = self.timer.clone();
        self.timer.set_period(period)?;
        self.timer.set_callback(Box::new(move || {
            //Cancel first, so that callback is free to reset timer
            if let Err(error) = timer.cancel() {
                tracing::warn!(%error, "unable to cancel expired one-shot timer");
            }
            callback();
        }))?;

        self.timer.reset()?;
        Ok(self)
    }

    #[inline(always)]
    ///Cancels timer.
    ///
    ///Cancelling already cancelled timer succeeds.
    pub fn cancel(&self) -> Result<()> {
        self.timer.cancel()
    }

    #[inline(always)]
    ///Destroys underlying timer.
    pub fn destroy(&self) {
        self.timer.destroy()
    }

    #[inline(always)]
    ///Returns whether timer is cancelled, which is the case after it expires.
    pub fn is_canceled(&self) -> bool {
        self.timer.is_canceled()
    }

    #[inline(always)]
    ///Returns whether timer is due.
    pub fn is_ready(&self) -> bool {
        self.timer.is_ready()
    }

    #[inline(always)]
    ///Restarts timer, allowing it to fire once more.
    ///
    ///Countdown starts anew from full period.
    pub fn reset(&self) -> Result<()> {
        self.timer.reset()
    }

    #[inline(always)]
    ///Returns time since last call
    pub fn time_since_last_call(&self) -> time::Duration {
        self.timer.time_since_last_call()
    }

    #[inline(always)]
    ///Returns time until next call, unless timer is cancelled.
    pub fn time_until_next_call(&self) -> Option<time::Duration> {
        self.timer.time_until_next_call()
    }

    #[inline(always)]
    ///Returns timer's period
    pub fn period(&self) -> time::Duration {
        self.timer.period()
    }

    #[inline(always)]
    ///Accesses underlying timer
    pub fn inner(&self) -> &T {
        &self.timer
    }

    #[inline(always)]
    ///Returns underlying timer
    pub fn into_inner(self) -> T {
        self.timer
    }
}
