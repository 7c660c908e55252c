use cyclid::{TokenGenerator, UniqueToken};
use std::collections::HashSet;
use std::sync::Mutex;
use std::thread::scope;
use std::time::{SystemTime, UNIX_EPOCH};

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
}

#[test]
fn tokens_from_many_threads_are_distinct() {
    const THREADS: usize = 8;
    const TOTAL: usize = 10_000;
    const PER_THREAD: usize = TOTAL / THREADS;

    let generator = TokenGenerator::default();
    let seen = Mutex::new(HashSet::with_capacity(TOTAL));

    scope(|s| {
        for _ in 0..THREADS {
            let generator = &generator;
            let seen = &seen;
            s.spawn(move || {
                let mut local = Vec::with_capacity(PER_THREAD);
                for _ in 0..PER_THREAD {
                    local.push(generator.generate_unique_token_value("lock").into_token());
                }
                let mut seen = seen.lock().unwrap();
                for token in local {
                    assert!(seen.insert(token.to_string()), "duplicate {token}");
                }
            });
        }
    });

    assert_eq!(seen.lock().unwrap().len(), TOTAL);
}

#[test]
fn token_timestamps_never_fall_behind_recorded_last() {
    let generator = TokenGenerator::default();
    let start = now_millis();

    let mut recorded_last = 0;
    for _ in 0..200 {
        let token = generator.generate_unique_token_value("lease").into_token();
        assert!(token.timestamp() >= recorded_last);
        assert!(token.timestamp() >= start);
        let last = generator.last_timestamp().unwrap();
        assert!(last > recorded_last);
        recorded_last = last;
    }
}

#[test]
fn tokens_parse_back() {
    let generator = TokenGenerator::default();
    let token = generator.generate_unique_token_value("a_b").into_token();
    let parsed: UniqueToken = token.to_string().parse().unwrap();
    assert_eq!(parsed, token);
    assert!(parsed.nonce() < cyclid::NONCE_BOUND);
}
