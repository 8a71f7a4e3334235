//! Threading-style timers on top of periodic event-loop timers
//!
//! Event loops usually expose periodic timers only: a callback that fires every `period`
//! for as long as the loop is spinning.
//! This crate adapts such timer into:
//!
//! - [OneShot](oneshot/struct.OneShot.html) - fires once per arming and cancels itself;
//! - [Timer](threading/struct.Timer.html) - mimics thread based timer with `start`, `join`, `cancel` and `is_alive`.
//!
//! Both layers only delegate to [RawTimer](trait.RawTimer.html) and [Spin](trait.Spin.html).
//! The crate ships minimal single threaded event loop [Node](node/struct.Node.html) implementing both.
//!
//! ## Usage
//!
//!```rust
//! use spin_timer::node::Node;
//! use spin_timer::threading::Timer;
//!
//! use core::time;
//!
//! let node = Node::new("example");
//! let raw = node.create_timer(time::Duration::from_secs(1), || ()).expect("To create timer");
//!
//! let mut timer = Timer::new(raw, node.clone(), time::Duration::from_millis(20), || println!("Timeout")).expect("To create");
//! assert!(!timer.is_alive());
//!
//! timer.start().expect("To start");
//! assert!(timer.is_alive());
//! timer.join(None).expect("To join");
//! assert!(!timer.is_alive());
//!
//! assert!(timer.start().is_err());
//!```

#![warn(missing_docs)]

use core::time;
use std::time::Instant;

#[macro_use]
mod utils;
mod error;
///Platform specific waiting.
pub mod provider;
///Reference event loop.
pub mod node;
pub mod oneshot;
pub mod threading;

pub use error::{Error, Result};
pub use oneshot::OneShot;
pub use threading::Timer;

///Timer's callback
pub type Callback = Box<dyn FnMut()>;

///Describes handle to periodic timer owned by event loop.
///
///Handle is expected to be cheap to clone, with each clone referring to the same timer.
///
///Semantics follow common event loop timers:
///
///- Timer fires every `period` while not cancelled.
///- Cancelled timer can be reset and used again.
///- Cancelling already cancelled timer succeeds.
pub trait RawTimer: Clone {
    ///Stops timer.
    fn cancel(&self) -> Result<()>;

    ///Sets next call time to `now + period`.
    ///
    ///Cancelled timer is additionally made not cancelled.
    fn reset(&self) -> Result<()>;

    ///Returns whether timer is cancelled.
    fn is_canceled(&self) -> bool;

    ///Returns whether timer is due to be called.
    fn is_ready(&self) -> bool;

    ///Returns time elapsed since last callback invocation.
    fn time_since_last_call(&self) -> time::Duration;

    ///Returns time until next call, if timer is not cancelled.
    ///
    ///Overdue timer returns zero.
    fn time_until_next_call(&self) -> Option<time::Duration>;

    ///Returns timer's period.
    fn period(&self) -> time::Duration;

    ///Sets new period.
    ///
    ///Change is not reflected until timer is reset or fires next time.
    fn set_period(&self, period: time::Duration) -> Result<()>;

    ///Replaces timer's callback.
    fn set_callback(&self, callback: Callback) -> Result<()>;

    ///Releases timer from its event loop.
    fn destroy(&self);
}

///Describes event loop that drives timers.
pub trait Spin {
    ///Waits at most `timeout` for single ready timer and executes its callback.
    fn spin_once(&self, timeout: time::Duration) -> Result<()>;

    ///Returns current time of the loop's clock.
    fn now(&self) -> Instant;
}

impl<S: Spin> Spin for &'_ S {
    #[inline(always)]
    fn spin_once(&self, timeout: time::Duration) -> Result<()> {
        (**self).spin_once(timeout)
    }

    #[inline(always)]
    fn now(&self) -> Instant {
        (**self).now()
    }
}
