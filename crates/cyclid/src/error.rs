use crate::{ScriptValue, StoreError};
use std::path::PathBuf;
use thiserror::Error;

/// A result type defaulting to the crate-wide [`enum@Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors that `cyclid` can produce.
///
/// Store failures (unreachable store, timeouts, failing scripts) are carried
/// unchanged in [`Error::Store`]. Nothing in this crate retries them.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The operation failed because a lock was **poisoned**.
    ///
    /// This occurs when a thread panics while holding the lock. When the
    /// `parking-lot` feature is enabled, mutexes do **not** poison, so this
    /// variant is not available.
    #[cfg_attr(docsrs, doc(cfg(not(feature = "parking-lot"))))]
    #[cfg(not(feature = "parking-lot"))]
    #[error("lock poisoned")]
    LockPoisoned,

    /// The backing store rejected or failed the request.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The atomic script answered with a value of the wrong type.
    ///
    /// This indicates a corrupt record or a mismatched script, never a normal
    /// operating condition.
    #[error("unexpected script result for `{key}`: expected a string, got {found:?}")]
    UnexpectedScriptResult { key: String, found: ScriptValue },

    /// A cycle cannot be created without elements.
    #[error("cycle `{key}` needs at least one element")]
    EmptyCycle { key: String },

    /// The script is not bundled and no fallback path was configured.
    #[error("script `{name}` is not bundled and has no fallback path")]
    ScriptNotFound { name: String },

    /// Reading a script from its fallback path failed.
    #[error("failed to read script `{name}` from {}: {source}", path.display())]
    ScriptLoad {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg_attr(docsrs, doc(cfg(not(feature = "parking-lot"))))]
#[cfg(not(feature = "parking-lot"))]
use crate::{MutexGuard, PoisonError};
#[cfg_attr(docsrs, doc(cfg(not(feature = "parking-lot"))))]
#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
