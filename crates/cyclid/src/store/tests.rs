use crate::{
    CYCLE_NEXT, CYCLE_NEXT_LUA, CachingScriptExecutor, Error, KeyValueStore, MemoryStore, Script,
    ScriptBackend, ScriptConfig, ScriptExecutor, ScriptValue, StoreError,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Backend that answers evaluations from a queue and counts registrations.
struct ScriptedBackend {
    evals: Mutex<VecDeque<Result<ScriptValue, StoreError>>>,
    loads: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    fn new(evals: impl IntoIterator<Item = Result<ScriptValue, StoreError>>) -> Arc<Self> {
        Arc::new(Self {
            evals: Mutex::new(evals.into_iter().collect()),
            loads: Mutex::new(Vec::new()),
        })
    }

    fn loads(&self) -> usize {
        self.loads.lock().unwrap().len()
    }

    fn pending_evals(&self) -> usize {
        self.evals.lock().unwrap().len()
    }
}

impl ScriptBackend for ScriptedBackend {
    fn load_script(&self, body: &str) -> Result<String, StoreError> {
        let mut loads = self.loads.lock().unwrap();
        loads.push(body.to_owned());
        Ok(format!("digest-{}", loads.len()))
    }

    fn eval_digest(
        &self,
        _digest: &str,
        _keys: &[&str],
        _args: &[&str],
    ) -> Result<ScriptValue, StoreError> {
        self.evals
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected evaluation")
    }
}

fn no_script() -> StoreError {
    StoreError::NoScript {
        digest: "stale".into(),
    }
}

#[test]
fn executor_registers_once_and_reuses_digest() {
    let backend = ScriptedBackend::new([
        Ok(ScriptValue::Str("a".into())),
        Ok(ScriptValue::Str("b".into())),
    ]);
    let executor = CachingScriptExecutor::new(Arc::clone(&backend));
    let script = Script::cycle_next();

    assert!(executor.cached_digest(CYCLE_NEXT).is_none());
    executor.execute(&script, &["k"], &[]).unwrap();
    executor.execute(&script, &["k"], &[]).unwrap();

    assert_eq!(backend.loads(), 1);
    assert_eq!(executor.cached_digest(CYCLE_NEXT).as_deref(), Some("digest-1"));
}

#[test]
fn executor_reregisters_and_retries_once_on_no_script() {
    let backend = ScriptedBackend::new([Err(no_script()), Ok(ScriptValue::Int(3))]);
    let executor = CachingScriptExecutor::new(Arc::clone(&backend));

    let value = executor.execute(&Script::cycle_next(), &["k"], &[]);
    assert_eq!(value, Ok(ScriptValue::Int(3)));
    assert_eq!(backend.loads(), 2);
    assert_eq!(executor.cached_digest(CYCLE_NEXT).as_deref(), Some("digest-2"));
}

#[test]
fn executor_gives_up_after_one_retry() {
    let backend = ScriptedBackend::new([Err(no_script()), Err(no_script()), Ok(ScriptValue::Nil)]);
    let executor = CachingScriptExecutor::new(Arc::clone(&backend));

    let value = executor.execute(&Script::cycle_next(), &["k"], &[]);
    assert_eq!(value, Err(no_script()));
    assert_eq!(backend.loads(), 2);
    assert_eq!(backend.pending_evals(), 1);
}

#[test]
fn executor_does_not_retry_other_failures() {
    let timeout = StoreError::Timeout {
        elapsed: core::time::Duration::from_secs(1),
    };
    let backend = ScriptedBackend::new([Err(timeout.clone()), Ok(ScriptValue::Nil)]);
    let executor = CachingScriptExecutor::new(Arc::clone(&backend));

    let value = executor.execute(&Script::cycle_next(), &["k"], &[]);
    assert_eq!(value, Err(timeout));
    assert_eq!(backend.loads(), 1);
    assert_eq!(backend.pending_evals(), 1);
}

#[test]
fn memory_store_digests_are_sha1_hex() {
    let store = MemoryStore::new();
    let digest = store.load_script(CYCLE_NEXT_LUA).unwrap();
    assert_eq!(digest.len(), 40);
    assert!(digest.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()));
    assert_eq!(store.load_script(CYCLE_NEXT_LUA).unwrap(), digest);
}

#[test]
fn memory_store_rejects_unbound_scripts() {
    let store = MemoryStore::new();
    let err = store.load_script("return redis.call('FLUSHALL')").unwrap_err();
    assert!(matches!(err, StoreError::Script { .. }));
}

#[test]
fn memory_store_requires_registration_before_eval() {
    let store = MemoryStore::new();
    let digest = store.load_script(CYCLE_NEXT_LUA).unwrap();
    store.flush_scripts();

    let err = store.eval_digest(&digest, &["k"], &[]).unwrap_err();
    assert_eq!(err, StoreError::NoScript { digest });
}

#[test]
fn memory_store_replace_and_delete() {
    let store = MemoryStore::new();
    assert!(!store.exists("k").unwrap());

    store
        .replace_fields("k", &[("a".into(), "1".into()), ("b".into(), "2".into())])
        .unwrap();
    store.replace_fields("k", &[("c".into(), "3".into())]).unwrap();
    let fields = store.fields("k").unwrap().unwrap();
    assert_eq!(fields.len(), 1);
    assert_eq!(fields["c"], "3");

    store.delete("k").unwrap();
    store.delete("k").unwrap();
    assert!(!store.exists("k").unwrap());

    store.replace_fields("k", &[]).unwrap();
    assert!(!store.exists("k").unwrap());
}

#[test]
fn memory_store_unavailable_fails_everything() {
    let store = MemoryStore::new();
    store.set_unavailable(true);

    let unavailable = |res: Result<(), StoreError>| {
        assert!(matches!(res, Err(StoreError::Unavailable { .. })));
    };
    unavailable(store.exists("k").map(drop));
    unavailable(store.delete("k"));
    unavailable(store.replace_fields("k", &[]));
    unavailable(store.load_script(CYCLE_NEXT_LUA).map(drop));
    unavailable(store.eval_digest("d", &["k"], &[]).map(drop));
}

#[test]
fn memory_store_keeps_working_after_a_script_panics() {
    const BODY: &str = "error('boom')";

    let store = MemoryStore::new();
    store.bind_native(BODY, |_, _, _| panic!("native script failed"));
    let bad = store.load_script(BODY).unwrap();
    let good = store.load_script(CYCLE_NEXT_LUA).unwrap();
    store
        .replace_fields("k", &[("current".into(), "0".into()), ("0".into(), "a".into())])
        .unwrap();

    let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        store.eval_digest(&bad, &["k"], &[])
    }));
    assert!(res.is_err());

    assert!(store.exists("k").unwrap());
    assert_eq!(
        store.eval_digest(&good, &["k"], &[]),
        Ok(ScriptValue::Str("a".into()))
    );

    store.flush_scripts();
    assert_eq!(
        store.eval_digest(&good, &["k"], &[]),
        Err(StoreError::NoScript { digest: good })
    );
}

#[test]
fn resolve_finds_bundled_scripts() {
    let script = Script::resolve(&ScriptConfig::cycle()).unwrap();
    assert_eq!(script, Script::cycle_next());
    assert_eq!(script.body(), CYCLE_NEXT_LUA);
}

#[test]
fn resolve_falls_back_to_file() {
    let path = std::env::temp_dir().join(format!("cyclid-resolve-{}.lua", std::process::id()));
    std::fs::write(&path, "return 1").unwrap();

    let config = ScriptConfig::new("custom").with_fallback_path(&path);
    let script = Script::resolve(&config).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(script.name(), "custom");
    assert_eq!(script.body(), "return 1");
}

#[test]
fn resolve_reports_missing_scripts() {
    let err = Script::resolve(&ScriptConfig::new("custom")).unwrap_err();
    assert!(matches!(err, Error::ScriptNotFound { name } if name == "custom"));

    let config = ScriptConfig::new("custom").with_fallback_path("/nonexistent/cyclid/custom.lua");
    let err = Script::resolve(&config).unwrap_err();
    assert!(matches!(err, Error::ScriptLoad { name, .. } if name == "custom"));
}

#[test]
fn bundled_script_takes_precedence_over_fallback() {
    let config = ScriptConfig::cycle().with_fallback_path("/nonexistent/cyclid/cycle.lua");
    assert_eq!(Script::resolve(&config).unwrap(), Script::cycle_next());
}
