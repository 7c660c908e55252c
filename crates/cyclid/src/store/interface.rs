use crate::{Script, StoreError};

/// A scalar answered by an atomic script.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScriptValue {
    Str(String),
    Int(i64),
    Nil,
}

/// The record-level operations a sequence needs from the store.
///
/// A record is a key mapping to a set of string fields. Implementations hand
/// out whatever connection or pooled session they need per call and release
/// it before returning.
pub trait KeyValueStore {
    /// Returns `true` if a record exists under `key`.
    fn exists(&self, key: &str) -> Result<bool, StoreError>;

    /// Atomically replaces the whole record under `key` with `fields`.
    ///
    /// Fields of a previous record that are not in `fields` must not
    /// survive, and no reader may observe a partially written record.
    fn replace_fields(&self, key: &str, fields: &[(String, String)]) -> Result<(), StoreError>;

    /// Removes the record under `key`. Removing a missing record succeeds.
    fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// Runs a [`Script`] atomically inside the store.
///
/// Nothing else may touch the store while the script runs.
pub trait ScriptExecutor {
    fn execute(
        &self,
        script: &Script,
        keys: &[&str],
        args: &[&str],
    ) -> Result<ScriptValue, StoreError>;
}

/// Low-level script capability of a store: registration by body, invocation
/// by digest.
///
/// [`CachingScriptExecutor`] turns any backend into a [`ScriptExecutor`].
///
/// [`CachingScriptExecutor`]: crate::CachingScriptExecutor
pub trait ScriptBackend {
    /// Registers `body` and returns the digest to invoke it by.
    fn load_script(&self, body: &str) -> Result<String, StoreError>;

    /// Runs the script registered under `digest`.
    ///
    /// Fails with [`StoreError::NoScript`] if the store does not know the
    /// digest.
    fn eval_digest(
        &self,
        digest: &str,
        keys: &[&str],
        args: &[&str],
    ) -> Result<ScriptValue, StoreError>;
}
