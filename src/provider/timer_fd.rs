//! Linux waiter implementation based on `timerfd`

use core::{mem, ptr, time};
use std::io;

use libc::c_int;

///Waiter over blocking `timerfd`.
///
///Timer is armed as one-shot for each wait, and expiration is consumed by blocking `read`.
pub struct TimerFd(c_int);

impl TimerFd {
    fn set(&mut self, timeout: time::Duration) -> io::Result<()> {
        let mut new_value: libc::itimerspec = unsafe { mem::zeroed() };
        new_value.it_value.tv_sec = timeout.as_secs().min(libc::time_t::MAX as u64) as libc::time_t;
        new_value.it_value.tv_nsec = timeout.subsec_nanos() as _;

        let ret = unsafe { libc::timerfd_settime(self.0, 0, &new_value, ptr::null_mut()) };
        os_try!(ret != -1);
        Ok(())
    }

    fn read(&mut self) -> io::Result<u64> {
        let mut expirations = 0u64;

        loop {
            let ret = unsafe { libc::read(self.0, &mut expirations as *mut u64 as *mut libc::c_void, mem::size_of::<u64>()) };
            if ret != -1 {
                return Ok(expirations);
            }

            let error = io::Error::last_os_error();
            match error.kind() {
                io::ErrorKind::Interrupted => continue,
                _ => return Err(error),
            }
        }
    }
}

impl super::Waiter for TimerFd {
    fn new() -> io::Result<Self> {
        let fd = unsafe { libc::timerfd_create(libc::CLOCK_MONOTONIC, libc::TFD_CLOEXEC) };

        //If you hit this, then most likely you run into OS imposed limit on file descriptor number
        os_try!(fd != -1);
        Ok(Self(fd))
    }

    fn wait(&mut self, timeout: time::Duration) -> io::Result<()> {
        //Zero value disarms timer, hence blocking read would never return
        if timeout == time::Duration::from_secs(0) {
            return Ok(());
        }

        self.set(timeout)?;
        let expirations = self.read()?;
        tracing::trace!(expirations, "timerfd expired");
        Ok(())
    }
}

impl Drop for TimerFd {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.0);
        }
    }
}
