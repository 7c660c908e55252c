use crate::{Mutex, MutexGuard, Script, ScriptBackend, ScriptExecutor, ScriptValue, StoreError};
use std::{collections::HashMap, sync::Arc};
#[cfg(feature = "tracing")]
use tracing::instrument;

/// A [`ScriptExecutor`] that registers scripts lazily and invokes them by
/// digest.
///
/// Digests are cached per script name. If the store reports
/// [`StoreError::NoScript`] (its script cache was flushed, or a replica took
/// over), the script is registered again and the call retried exactly once.
/// Any other failure, or a failing retry, is returned unchanged.
///
/// # Example
///
/// ```
/// use cyclid::{CachingScriptExecutor, KeyValueStore, MemoryStore, Script, ScriptExecutor};
/// use std::sync::Arc;
///
/// let store = Arc::new(MemoryStore::new());
/// let executor = CachingScriptExecutor::new(Arc::clone(&store));
///
/// store.replace_fields("colors", &[
///     ("current".into(), "0".into()),
///     ("0".into(), "red".into()),
/// ]).unwrap();
/// let value = executor.execute(&Script::cycle_next(), &["colors"], &[]).unwrap();
/// assert_eq!(value, cyclid::ScriptValue::Str("red".into()));
/// ```
pub struct CachingScriptExecutor<B: ScriptBackend + ?Sized> {
    backend: Arc<B>,
    digests: Mutex<HashMap<String, String>>,
}

impl<B: ScriptBackend + ?Sized> CachingScriptExecutor<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            digests: Mutex::new(HashMap::new()),
        }
    }

    /// The digest currently cached for `name`, if any.
    pub fn cached_digest(&self, name: &str) -> Option<String> {
        self.digests().get(name).cloned()
    }

    fn register(&self, script: &Script) -> Result<String, StoreError> {
        let digest = self.backend.load_script(script.body())?;

        #[cfg(feature = "tracing")]
        tracing::debug!(script = script.name(), %digest, "registered script");

        self.digests()
            .insert(script.name().to_owned(), digest.clone());
        Ok(digest)
    }

    // The map only ever holds complete entries, so a poisoned lock is safe
    // to keep using.
    fn digests(&self) -> MutexGuard<'_, HashMap<String, String>> {
        #[cfg(feature = "parking-lot")]
        {
            self.digests.lock()
        }
        #[cfg(not(feature = "parking-lot"))]
        {
            self.digests
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
        }
    }
}

impl<B: ScriptBackend + ?Sized> ScriptExecutor for CachingScriptExecutor<B> {
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "trace", skip(self, script), fields(script = script.name()))
    )]
    fn execute(
        &self,
        script: &Script,
        keys: &[&str],
        args: &[&str],
    ) -> Result<ScriptValue, StoreError> {
        let digest = match self.cached_digest(script.name()) {
            Some(digest) => digest,
            None => self.register(script)?,
        };

        match self.backend.eval_digest(&digest, keys, args) {
            Err(StoreError::NoScript { .. }) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(script = script.name(), %digest, "script unknown to store, re-registering");

                let digest = self.register(script)?;
                self.backend.eval_digest(&digest, keys, args)
            }
            res => res,
        }
    }
}
