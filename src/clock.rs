//! Wall clock and timed suspension, behind traits so the scheduling loop can
//! be driven deterministically.

use chrono::{Local, NaiveDateTime};
use std::thread;
use std::time::{Duration, Instant};

use crate::shutdown::shutdown_requested;

/// Longest uninterrupted sleep before re-checking for shutdown.
const SLEEP_SLICE: Duration = Duration::from_millis(200);

/// Source of the current local time.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Suspends the calling thread.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Local wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Sleeps on the current thread, returning early once Ctrl+C is received.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        // No deadline when it lies beyond what `Instant` can hold.
        let deadline = Instant::now().checked_add(duration);
        while !shutdown_requested() {
            match next_slice(deadline, Instant::now()) {
                Some(slice) => thread::sleep(slice),
                None => return,
            }
        }
    }
}

/// How long to sleep next, or `None` once `deadline` has passed.
fn next_slice(deadline: Option<Instant>, now: Instant) -> Option<Duration> {
    match deadline {
        Some(deadline) if now >= deadline => None,
        Some(deadline) => Some((deadline - now).min(SLEEP_SLICE)),
        None => Some(SLEEP_SLICE),
    }
}
