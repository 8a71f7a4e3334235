//! Platform waiters
//!
//! Used by event loop to block until the earliest timer is due.
//!
//! ## Implementations:
//!
//! - Linux and Android use `timerfd` with `CLOCK_MONOTONIC`
//! - Other platforms, or when `thread-sleep` feature is enabled, use `std::thread::sleep`

use core::time;
use std::io;

///Describes blocking wait.
pub trait Waiter: Sized {
    ///Creates new instance
    fn new() -> io::Result<Self>;

    ///Blocks current thread for `timeout`.
    ///
    ///Zero timeout returns immediately.
    fn wait(&mut self, timeout: time::Duration) -> io::Result<()>;
}

#[cfg(any(target_os = "linux", target_os = "android"))]
mod timer_fd;
#[cfg(any(target_os = "linux", target_os = "android"))]
pub use timer_fd::TimerFd;
#[cfg(all(not(feature = "thread-sleep"), any(target_os = "linux", target_os = "android")))]
///Platform alias to `timerfd` waiter
pub type Platform = timer_fd::TimerFd;

mod thread;
pub use thread::ThreadSleep;
#[cfg(any(feature = "thread-sleep", not(any(target_os = "linux", target_os = "android"))))]
///Platform alias to portable waiter
pub type Platform = thread::ThreadSleep;
