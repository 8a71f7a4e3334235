//! Thread-style timer
//!
//! Mimics interface of thread based one-shot timer: timer is created idle, started once,
//! can be cancelled and joined.
//!
//! Unlike thread based timer, nothing runs in background: timer's callback is executed by
//! event loop, which is spun by [join](struct.Timer.html#method.join) or by the user.

use core::time;
use std::cell::Cell;
use std::rc::Rc;

use crate::oneshot::OneShot;
use crate::{Error, RawTimer, Result, Spin};

//Upper bound of single spin when joining without timeout.
const JOIN_SPIN: time::Duration = time::Duration::from_secs(1);

///Thread-style one-shot timer.
///
///## Usage
///
///```rust
/// use spin_timer::node::Node;
/// use spin_timer::threading::Timer;
/// use spin_timer::Error;
///
/// use core::time;
///
/// let node = Node::new("threading");
/// let raw = node.create_timer(time::Duration::from_secs(1), || ()).expect("To create timer");
///
/// let mut timer = Timer::new(raw, &node, time::Duration::from_millis(50), || println!("Timeout")).expect("To create");
/// timer.start().expect("To start");
/// timer.join(Some(time::Duration::from_millis(20))).expect("To join");
/// timer.cancel().expect("To cancel");
///
/// assert!(!timer.is_alive());
/// match timer.start() {
///     Err(Error::AlreadyStarted) => (),
///     _ => panic!("Timer can be started only once"),
/// }
///```
pub struct Timer<T, S> {
    timer: OneShot<T>,
    spin: S,
    started: bool,
    alive: Rc<Cell<bool>>,
}

impl<T: RawTimer + 'static, S: Spin> Timer<T, S> {
    ///Creates new timer, which invokes `function` once `interval` elapses after `start`.
    ///
    ///`timer` is taken over by wrapper, replacing its period and callback.
    ///`spin` is event loop driving `timer`, used to `join`.
    pub fn new<F: FnMut() + 'static>(timer: T, spin: S, interval: time::Duration, function: F) -> Result<Self> {
        let mut result = Self {
            timer: OneShot::new(timer),
            spin,
            started: false,
            alive: Rc::new(Cell::new(false)),
        };

        result.arm(interval, function)?;
        Ok(result)
    }

    ///Re-initializes timer with new `interval` and `function`.
    ///
    ///Timer is not started, and after that can be started once again.
    pub fn arm<F: FnMut() + 'static>(&mut self, interval: time::Duration, mut function: F) -> Result<&mut Self> {
        self.started = false;
        self.alive.set(false);

        let alive = self.alive.clone();
        self.timer.arm(interval, move || {
            function();
            alive.set(false);
        })?;

        //Thread-style timer does not start on creation
        self.timer.cancel()?;
        Ok(self)
    }

    ///Starts timer.
    ///
    ///Can be called only once per arming, further calls fail with `Error::AlreadyStarted`.
    pub fn start(&mut self) -> Result<()> {
        if self.started {
            return Err(Error::AlreadyStarted);
        }

        self.started = true;
        self.run()?;
        self.alive.set(true);
        tracing::debug!(interval = ?self.timer.period(), "timer started");
        Ok(())
    }

    #[inline]
    ///Starts countdown of underlying timer.
    ///
    ///Unlike `start`, this doesn't track state.
    pub fn run(&self) -> Result<()> {
        self.timer.reset()
    }

    ///Waits until timer is no longer alive or `timeout` elapses.
    ///
    ///Event loop is spun while waiting, executing any ready callback.
    ///
    ///Fails if timer has not been started, or if timer is not alive and no `timeout` is given.
    pub fn join(&self, timeout: Option<time::Duration>) -> Result<()> {
        if !self.started {
            return Err(Error::NotStarted);
        }

        if !self.is_alive() && timeout.is_none() {
            return Err(Error::NotAlive);
        }

        let deadline = timeout.and_then(|timeout| self.spin.now().checked_add(timeout));
        tracing::debug!(?timeout, "joining timer");

        while self.is_alive() {
            let spin = match deadline {
                Some(deadline) => {
                    let now = self.spin.now();
                    if now >= deadline {
                        break;
                    }
                    deadline - now
                },
                None => JOIN_SPIN,
            };

            self.spin.spin_once(spin)?;
        }

        Ok(())
    }

    #[inline]
    ///Returns whether timer is started and is not yet expired or cancelled.
    pub fn is_alive(&self) -> bool {
        self.alive.get()
    }

    #[inline]
    ///Returns whether timer has been started since last arming.
    pub fn is_started(&self) -> bool {
        self.started
    }

    ///Stops timer, if it is still ongoing.
    ///
    ///Cancelled timer cannot be restarted.
    pub fn cancel(&self) -> Result<()> {
        self.timer.cancel()?;
        if self.alive.replace(false) {
            tracing::debug!("timer cancelled");
        }
        Ok(())
    }

    #[inline(always)]
    ///Returns interval of timer
    pub fn interval(&self) -> time::Duration {
        self.timer.period()
    }

    #[inline(always)]
    ///Accesses underlying one-shot timer
    pub fn oneshot(&self) -> &OneShot<T> {
        &self.timer
    }
}
