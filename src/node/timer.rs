//! Node's periodic timer

use core::{fmt, time};
use core::convert::TryFrom;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use crate::{Callback, Error, RawTimer, Result};

pub(super) struct Slot {
    pub(super) period: time::Duration,
    pub(super) next_call: Instant,
    last_call: Instant,
    pub(super) canceled: bool,
    pub(super) destroyed: bool,
    pub(super) callback: Option<Callback>,
}

impl Slot {
    pub(super) fn new(period: time::Duration, callback: Callback, now: Instant) -> Self {
        Self {
            period,
            next_call: deadline_after(now, period),
            last_call: now,
            canceled: false,
            destroyed: false,
            callback: Some(callback),
        }
    }

    #[inline]
    pub(super) fn is_due(&self, now: Instant) -> bool {
        !self.canceled && !self.destroyed && self.next_call <= now
    }

    ///Records call and schedules next one, returning callback to invoke.
    pub(super) fn fire(&mut self, now: Instant) -> Option<Callback> {
        self.last_call = now;
        self.next_call = next_call_after(self.next_call, self.period, now);
        self.callback.take()
    }
}

//Deadline used when `Instant` cannot represent requested one.
const FAR_FUTURE: time::Duration = time::Duration::from_secs(60 * 60 * 24 * 365 * 30);

///Returns `at + period`, saturating to far future on overflow.
fn deadline_after(at: Instant, period: time::Duration) -> Instant {
    match at.checked_add(period) {
        Some(deadline) => deadline,
        None => at.checked_add(FAR_FUTURE).unwrap_or(at),
    }
}

///Advances call time by one period, skipping periods that are already missed.
fn next_call_after(call: Instant, period: time::Duration, now: Instant) -> Instant {
    if period == time::Duration::from_secs(0) {
        return now;
    }

    let next = deadline_after(call, period);
    if next >= now {
        return next;
    }

    let period_ns = period.as_nanos();
    let missed = (now - next).as_nanos() / period_ns;
    let skip = (missed + 1) * period_ns;
    let secs = u64::try_from(skip / 1_000_000_000).unwrap_or(u64::max_value());
    deadline_after(next, time::Duration::new(secs, (skip % 1_000_000_000) as u32))
}

///Handle to periodic timer created by [Node](struct.Node.html).
///
///Clones refer to the same timer.
#[derive(Clone)]
pub struct NodeTimer {
    slot: Rc<RefCell<Slot>>,
}

impl NodeTimer {
    pub(super) fn new(slot: Rc<RefCell<Slot>>) -> Self {
        Self {
            slot
        }
    }

    fn with_active<R, F: FnOnce(&mut Slot) -> R>(&self, cb: F) -> Result<R> {
        let mut slot = self.slot.borrow_mut();
        if slot.destroyed {
            return Err(Error::Destroyed);
        }
        Ok(cb(&mut *slot))
    }
}

impl RawTimer for NodeTimer {
    fn cancel(&self) -> Result<()> {
        self.with_active(|slot| slot.canceled = true)
    }

    fn reset(&self) -> Result<()> {
        self.with_active(|slot| {
            slot.next_call = deadline_after(Instant::now(), slot.period);
            slot.canceled = false;
        })
    }

    #[inline]
    fn is_canceled(&self) -> bool {
        let slot = self.slot.borrow();
        slot.canceled || slot.destroyed
    }

    #[inline]
    fn is_ready(&self) -> bool {
        self.slot.borrow().is_due(Instant::now())
    }

    #[inline]
    fn time_since_last_call(&self) -> time::Duration {
        Instant::now().saturating_duration_since(self.slot.borrow().last_call)
    }

    fn time_until_next_call(&self) -> Option<time::Duration> {
        match self.is_canceled() {
            true => None,
            false => Some(self.slot.borrow().next_call.saturating_duration_since(Instant::now())),
        }
    }

    #[inline]
    fn period(&self) -> time::Duration {
        self.slot.borrow().period
    }

    fn set_period(&self, period: time::Duration) -> Result<()> {
        self.with_active(|slot| slot.period = period)
    }

    fn set_callback(&self, callback: Callback) -> Result<()> {
        let old = self.with_active(|slot| slot.callback.replace(callback))?;
        drop(old);
        Ok(())
    }

    fn destroy(&self) {
        let callback = {
            let mut slot = self.slot.borrow_mut();
            if slot.destroyed {
                return;
            }
            slot.destroyed = true;
            slot.canceled = true;
            slot.callback.take()
        };

        tracing::debug!("timer destroyed");
        drop(callback);
    }
}

impl fmt::Debug for NodeTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.slot.borrow();
        f.debug_struct("NodeTimer")
         .field("period", &slot.period)
         .field("canceled", &slot.canceled)
         .field("destroyed", &slot.destroyed)
         .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{deadline_after, next_call_after};

    use core::time;
    use std::time::Instant;

    #[test]
    fn should_advance_by_single_period_when_on_time() {
        let start = Instant::now();
        let period = time::Duration::from_millis(10);

        let next = next_call_after(start, period, start + time::Duration::from_millis(1));
        assert_eq!(next, start + period);
    }

    #[test]
    fn should_skip_missed_periods() {
        let start = Instant::now();
        let period = time::Duration::from_millis(10);

        let next = next_call_after(start, period, start + time::Duration::from_millis(35));
        assert_eq!(next, start + time::Duration::from_millis(40));

        //Missed boundary is skipped as well
        let next = next_call_after(start, period, start + time::Duration::from_millis(30));
        assert_eq!(next, start + time::Duration::from_millis(40));
    }

    #[test]
    fn should_keep_call_that_is_exactly_on_time() {
        let start = Instant::now();
        let period = time::Duration::from_millis(10);

        let next = next_call_after(start, period, start + period);
        assert_eq!(next, start + period);
    }

    #[test]
    fn should_saturate_on_overflow() {
        let start = Instant::now();

        let deadline = deadline_after(start, time::Duration::MAX);
        assert!(deadline > start + time::Duration::from_secs(60 * 60 * 24 * 365));

        let next = next_call_after(start, time::Duration::MAX, start + time::Duration::from_millis(1));
        assert!(next > start);
    }

    #[test]
    fn should_schedule_zero_period_now() {
        let start = Instant::now();
        let now = start + time::Duration::from_millis(3);

        assert_eq!(next_call_after(start, time::Duration::from_secs(0), now), now);
    }
}
