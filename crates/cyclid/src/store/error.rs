use core::time::Duration;
use thiserror::Error;

/// Failures reported by a store implementation.
///
/// `cyclid` never retries these for sequence operations; they reach the
/// caller unchanged inside [`crate::Error::Store`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreError {
    /// The store could not be reached.
    #[error("store unavailable: {reason}")]
    Unavailable { reason: String },

    /// The request did not complete in time.
    #[error("store request timed out after {elapsed:?}")]
    Timeout { elapsed: Duration },

    /// No script is registered under `digest` (e.g. after a script flush or
    /// a failover).
    #[error("no script registered under digest {digest}")]
    NoScript { digest: String },

    /// The script ran and raised an error.
    #[error("script failed: {message}")]
    Script { message: String },
}

impl StoreError {
    /// Shorthand for [`StoreError::Script`].
    pub fn script(message: impl Into<String>) -> Self {
        Self::Script {
            message: message.into(),
        }
    }
}
