use crate::{
    CYCLE_NEXT_LUA, KeyValueStore, Mutex, MutexGuard, ScriptBackend, ScriptValue, StoreError,
    advance_cycle,
};
#[cfg(not(feature = "parking-lot"))]
use crate::PoisonError;
use sha1::{Digest, Sha1};
use std::{
    collections::{HashMap, HashSet},
    sync::atomic::{AtomicBool, Ordering},
};
#[cfg(feature = "tracing")]
use tracing::instrument;

/// A store record: field name to value.
pub type Record = HashMap<String, String>;

/// A script implemented in Rust, standing in for a script body.
///
/// Runs with exclusive access to every record of the store.
pub type NativeScript = fn(
    records: &mut HashMap<String, Record>,
    keys: &[&str],
    args: &[&str],
) -> Result<ScriptValue, StoreError>;

#[derive(Default)]
struct State {
    records: HashMap<String, Record>,
    /// Script bodies this store knows how to run, by digest.
    natives: HashMap<String, NativeScript>,
    /// Digests registered through `load_script` and not flushed since.
    loaded: HashSet<String>,
}

/// A process-local store with Redis-like script semantics.
///
/// Every operation, scripts included, runs under one lock, so a script sees
/// and leaves the records without any interleaving. Script bodies cannot be
/// interpreted; instead each body is bound to a [`NativeScript`] that
/// implements it. The bundled cycle-advance script is bound on construction.
///
/// Digests are the lowercase hex SHA1 of the body, as with Redis
/// `SCRIPT LOAD`.
///
/// Mainly useful for tests and single-process deployments. Hooks such as
/// [`Self::flush_scripts`] and [`Self::set_unavailable`] simulate store-side
/// failures.
pub struct MemoryStore {
    state: Mutex<State>,
    unavailable: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates an empty store that understands the bundled scripts.
    pub fn new() -> Self {
        let store = Self {
            state: Mutex::new(State::default()),
            unavailable: AtomicBool::new(false),
        };
        store.bind_native(CYCLE_NEXT_LUA, advance_cycle);
        store
    }

    /// Teaches the store to run `body` by calling `native`.
    ///
    /// The body still has to be registered with
    /// [`ScriptBackend::load_script`] before it can be invoked.
    pub fn bind_native(&self, body: &str, native: NativeScript) {
        let digest = digest(body);
        self.lock().natives.insert(digest, native);
    }

    /// Forgets every registered script, like `SCRIPT FLUSH`.
    pub fn flush_scripts(&self) {
        self.lock().loaded.clear();
    }

    /// While `true`, every operation fails with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Release);
    }

    /// A snapshot of the record under `key`.
    pub fn fields(&self, key: &str) -> Result<Option<Record>, StoreError> {
        Ok(self.state()?.records.get(key).cloned())
    }

    fn state(&self) -> Result<MutexGuard<'_, State>, StoreError> {
        if self.unavailable.load(Ordering::Acquire) {
            return Err(StoreError::Unavailable {
                reason: "store marked unavailable".to_owned(),
            });
        }
        Ok(self.lock())
    }

    // Every write is a single insert or remove, so a panicking script cannot
    // leave a half-written record behind and a poisoned lock is safe to keep
    // using.
    fn lock(&self) -> MutexGuard<'_, State> {
        #[cfg(feature = "parking-lot")]
        {
            self.state.lock()
        }
        #[cfg(not(feature = "parking-lot"))]
        {
            self.state.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.state()?.records.contains_key(key))
    }

    fn replace_fields(&self, key: &str, fields: &[(String, String)]) -> Result<(), StoreError> {
        let record: Record = fields.iter().cloned().collect();
        let mut state = self.state()?;
        // Like Redis, a hash without fields does not exist.
        if record.is_empty() {
            state.records.remove(key);
        } else {
            state.records.insert(key.to_owned(), record);
        }
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.state()?.records.remove(key);
        Ok(())
    }
}

impl ScriptBackend for MemoryStore {
    fn load_script(&self, body: &str) -> Result<String, StoreError> {
        let digest = digest(body);
        let mut state = self.state()?;
        if !state.natives.contains_key(&digest) {
            return Err(StoreError::script(format!(
                "no native implementation bound for script {digest}"
            )));
        }
        state.loaded.insert(digest.clone());
        Ok(digest)
    }

    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    fn eval_digest(
        &self,
        digest: &str,
        keys: &[&str],
        args: &[&str],
    ) -> Result<ScriptValue, StoreError> {
        let mut state = self.state()?;
        let native = match state.natives.get(digest) {
            Some(native) if state.loaded.contains(digest) => *native,
            _ => {
                return Err(StoreError::NoScript {
                    digest: digest.to_owned(),
                });
            }
        };
        native(&mut state.records, keys, args)
    }
}

fn digest(body: &str) -> String {
    hex::encode(Sha1::digest(body.as_bytes()))
}
