use std::time::{SystemTime, UNIX_EPOCH};

/// A trait for time sources that return a wall-clock timestamp.
///
/// This abstraction allows you to plug in the system clock or a mocked time
/// source in tests.
///
/// The timestamp type `T` is generic (typically `u64`), and the unit is
/// expected to be **milliseconds** since the UNIX epoch.
///
/// # Example
///
/// ```
/// use cyclid::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource<u64> for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// let time = FixedTime;
/// assert_eq!(time.current_millis(), 1234);
/// ```
pub trait TimeSource<T> {
    /// Returns the current time in milliseconds since the UNIX epoch.
    fn current_millis(&self) -> T;
}

/// Reads `SystemTime::now()` on every call.
///
/// Millisecond resolution is all the token generator relies on. The clock may
/// be adjusted externally; [`TokenGenerator`] only needs consecutive reads to
/// eventually differ.
///
/// [`TokenGenerator`]: crate::TokenGenerator
#[derive(Default, Clone, Copy, Debug)]
pub struct WallClock;

impl TimeSource<u64> for WallClock {
    fn current_millis(&self) -> u64 {
        // A clock before 1970 reads as zero rather than panicking.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis() as u64)
    }
}
