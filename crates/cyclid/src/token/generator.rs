use crate::{
    Mutex, RandSource, Result, SleepProvider, ThreadRandom, ThreadSleep, TimeSource, TokenStatus,
    UniqueToken, WallClock,
};
use core::time::Duration;
use std::sync::Arc;
#[cfg(feature = "tracing")]
use tracing::instrument;

/// How long to back off while the clock still reads the last used
/// millisecond.
pub const CLOCK_TICK: Duration = Duration::from_millis(1);

/// A lock-based generator of unique, time-ordered [`UniqueToken`]s, meant to
/// identify distributed lock owners.
///
/// Every call runs under one mutex and waits until the clock reads a
/// millisecond different from the one recorded by the previous call, so two
/// consecutive calls on the same generator never share a recorded timestamp.
/// A clock that steps backwards (e.g. a wall clock adjusted by NTP) is
/// accepted as is, so recorded timestamps then decrease.
///
/// The generator is a service object: construct it once per process and
/// share it (it is cheap to clone, and clones share the same state). Tokens
/// from separate instances are not coordinated with each other.
///
/// ## Features
///
/// - ✅ Thread-safe
/// - ✅ Unique within the process
/// - ✅ Recorded timestamps strictly increase, as long as the clock does not
///   step backwards
/// - ⚠️ Across processes, uniqueness is only probabilistic (random nonce)
///
/// ## Note
///
/// The embedded timestamp comes from a second clock read taken *after* the
/// wait, so it may be later than the millisecond whose distinctness was just
/// enforced.
pub struct TokenGenerator<T = WallClock, R = ThreadRandom, S = ThreadSleep>
where
    T: TimeSource<u64>,
    R: RandSource<u32>,
    S: SleepProvider,
{
    last_timestamp: Arc<Mutex<u64>>,
    clock: T,
    rng: R,
    sleep: S,
}

impl Default for TokenGenerator {
    /// A generator on the system clock, thread-local RNG and a plain sleep.
    fn default() -> Self {
        Self::new(WallClock, ThreadRandom, ThreadSleep)
    }
}

impl<T, R, S> Clone for TokenGenerator<T, R, S>
where
    T: TimeSource<u64> + Clone,
    R: RandSource<u32> + Clone,
    S: SleepProvider + Clone,
{
    fn clone(&self) -> Self {
        Self {
            last_timestamp: Arc::clone(&self.last_timestamp),
            clock: self.clock.clone(),
            rng: self.rng.clone(),
            sleep: self.sleep.clone(),
        }
    }
}

impl<T, R, S> TokenGenerator<T, R, S>
where
    T: TimeSource<u64>,
    R: RandSource<u32>,
    S: SleepProvider,
{
    /// Creates a new [`TokenGenerator`] with no recorded timestamp.
    ///
    /// # Parameters
    /// - `clock`: A [`TimeSource`] reporting epoch milliseconds
    /// - `rng`: A [`RandSource`] producing nonces in `[0, 1_000_000)`
    /// - `sleep`: A [`SleepProvider`] used while waiting for the clock
    ///
    /// # Example
    /// ```
    /// use cyclid::{ThreadRandom, ThreadSleep, TokenGenerator, WallClock};
    ///
    /// let generator = TokenGenerator::new(WallClock, ThreadRandom, ThreadSleep);
    /// let token = generator.generate_unique_token_value("orders").into_token();
    /// assert_eq!(token.name(), "orders");
    /// ```
    pub fn new(clock: T, rng: R, sleep: S) -> Self {
        Self {
            last_timestamp: Arc::new(Mutex::new(0)),
            clock,
            rng,
            sleep,
        }
    }

    /// The timestamp recorded by the most recent call, or `0` before the
    /// first one.
    pub fn last_timestamp(&self) -> Result<u64> {
        #[cfg(feature = "parking-lot")]
        let last = self.last_timestamp.lock();
        #[cfg(not(feature = "parking-lot"))]
        let last = self.last_timestamp.lock()?;

        Ok(*last)
    }

    /// Mints the next token for `name`.
    ///
    /// # Panics
    /// Panics if the lock is poisoned. For explicitly fallible behavior, use
    /// [`Self::try_generate_unique_token_value`] instead.
    ///
    /// # Example
    /// ```
    /// use cyclid::TokenGenerator;
    ///
    /// let generator = TokenGenerator::default();
    /// let a = generator.generate_unique_token_value("lock").into_token();
    /// let b = generator.generate_unique_token_value("lock").into_token();
    /// assert_ne!(a, b);
    /// ```
    pub fn generate_unique_token_value(&self, name: &str) -> TokenStatus {
        self.try_generate_unique_token_value(name).unwrap()
    }

    /// A fallible version of [`Self::generate_unique_token_value`] that
    /// returns a [`Result`].
    ///
    /// Blocks for up to about one clock tick when called faster than the
    /// clock advances. If the wait is interrupted, the generator keeps
    /// yielding until the clock moves on, still records the new timestamp,
    /// raises the interrupt again through [`SleepProvider::restore_interrupt`]
    /// and returns [`TokenStatus::Interrupted`] with a valid token.
    ///
    /// # Returns
    /// - `Ok(TokenStatus::Ready { token })`: A new token
    /// - `Ok(TokenStatus::Interrupted { token })`: A new token; the wait was
    ///   interrupted
    /// - `Err(e)`: The state lock was poisoned
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_generate_unique_token_value(&self, name: &str) -> Result<TokenStatus> {
        #[cfg(feature = "parking-lot")]
        let mut last = self.last_timestamp.lock();
        #[cfg(not(feature = "parking-lot"))]
        let mut last = self.last_timestamp.lock()?;

        let mut interrupted = false;
        let mut now = self.clock.current_millis();
        while now == *last {
            if interrupted {
                std::thread::yield_now();
            } else if self.sleep.sleep_for(CLOCK_TICK).is_err() {
                #[cfg(feature = "tracing")]
                tracing::debug!(last = *last, "clock wait interrupted");
                interrupted = true;
            }
            now = self.clock.current_millis();
        }
        *last = now;

        let token = UniqueToken::from_components(name, self.clock.current_millis(), self.rng.rand());

        if interrupted {
            self.sleep.restore_interrupt();
        }

        Ok(if interrupted {
            TokenStatus::Interrupted { token }
        } else {
            TokenStatus::Ready { token }
        })
    }
}
