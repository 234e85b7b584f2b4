//! S9: `Limits::from_env` overrides `max_tls_areas` to a small number,
//! and the registry's `Exhausted` error is observed at exactly that
//! bound rather than the compiled-in default of 128.
//!
//! This lives in its own test binary (and thus its own process) because
//! the override is read once into a process-wide `OnceLock` the first
//! time the registry is touched — sharing a process with another test
//! that touches `cow_tls` first would make the override arrive too
//! late.

use cow_tls::tls_create;
use std::thread;

#[test]
fn exhausted_bound_follows_the_env_override() {
    std::env::set_var("KEOS_LAB_MAX_TLS_AREAS", "3");

    let mut handles = Vec::new();
    for _ in 0..3 {
        handles.push(thread::spawn(|| {
            tls_create(16).unwrap();
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    // A 4th concurrent area (from yet another thread) must be rejected
    // at the overridden bound of 3, not the compiled-in default of 128.
    let rejected = thread::spawn(|| tls_create(16)).join().unwrap();
    assert!(rejected.is_err());
}
