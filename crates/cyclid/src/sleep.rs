use core::time::Duration;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use thiserror::Error;

/// Returned by a [`SleepProvider`] when a sleep was cut short.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("sleep interrupted")]
pub struct Interrupted;

/// A trait that abstracts over how a blocking wait for a given [`Duration`]
/// is performed.
///
/// This allows the token generator to be driven by a real sleep, a sleep that
/// other threads can interrupt, or a no-op in tests.
pub trait SleepProvider {
    /// Blocks the current thread for roughly `dur`.
    ///
    /// Returns [`Interrupted`] if the wait was cut short.
    fn sleep_for(&self, dur: Duration) -> Result<(), Interrupted>;

    /// Raises again an interrupt that [`Self::sleep_for`] consumed, so the
    /// surrounding context still observes it.
    ///
    /// Providers that are never interrupted keep the default no-op.
    fn restore_interrupt(&self) {}
}

/// Plain [`std::thread::sleep`]. Never interrupted.
#[derive(Default, Clone, Copy, Debug)]
pub struct ThreadSleep;

impl SleepProvider for ThreadSleep {
    fn sleep_for(&self, dur: Duration) -> Result<(), Interrupted> {
        std::thread::sleep(dur);
        Ok(())
    }
}

/// A sleep that can be interrupted through an [`Interrupter`].
///
/// An interrupt is latched: it is observed (and cleared) by the next
/// [`SleepProvider::sleep_for`] call, whether it was raised before or during
/// that sleep.
///
/// # Example
///
/// ```
/// use cyclid::{InterruptibleSleep, SleepProvider};
/// use std::time::Duration;
///
/// let sleep = InterruptibleSleep::new();
/// let interrupter = sleep.interrupter();
///
/// interrupter.interrupt();
/// assert!(sleep.sleep_for(Duration::from_millis(1)).is_err());
/// assert!(sleep.sleep_for(Duration::from_millis(1)).is_ok());
/// ```
#[derive(Default, Clone, Debug)]
pub struct InterruptibleSleep {
    flag: Arc<AtomicBool>,
}

impl InterruptibleSleep {
    /// Creates a sleep with no pending interrupt.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a handle that raises interrupts for this sleep.
    pub fn interrupter(&self) -> Interrupter {
        Interrupter {
            flag: Arc::clone(&self.flag),
        }
    }
}

impl SleepProvider for InterruptibleSleep {
    fn sleep_for(&self, dur: Duration) -> Result<(), Interrupted> {
        if self.flag.swap(false, Ordering::AcqRel) {
            return Err(Interrupted);
        }
        std::thread::sleep(dur);
        if self.flag.swap(false, Ordering::AcqRel) {
            return Err(Interrupted);
        }
        Ok(())
    }

    fn restore_interrupt(&self) {
        self.flag.store(true, Ordering::Release);
    }
}

/// Raises interrupts on an [`InterruptibleSleep`]. Cheap to clone and `Send`.
#[derive(Clone, Debug)]
pub struct Interrupter {
    flag: Arc<AtomicBool>,
}

impl Interrupter {
    /// Interrupts the current or next sleep.
    pub fn interrupt(&self) {
        self.flag.store(true, Ordering::Release);
    }
}
