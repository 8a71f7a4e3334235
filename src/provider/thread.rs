use core::time;
use std::{io, thread};

///Waiter that puts thread to sleep.
pub struct ThreadSleep;

impl super::Waiter for ThreadSleep {
    #[inline(always)]
    fn new() -> io::Result<Self> {
        Ok(Self)
    }

    #[inline]
    fn wait(&mut self, timeout: time::Duration) -> io::Result<()> {
        if timeout != time::Duration::from_secs(0) {
            thread::sleep(timeout);
        }

        Ok(())
    }
}
