//! Pluggable "who is the current thread" and "terminate the current
//! thread" seams.
//!
//! The original C library only ever had one notion of thread identity
//! (`pthread_self()`), because it only ever ran over real OS threads. A
//! reusable `cow-tls` needs a seam here so that `uthread` can later
//! substitute "the running TCB" without `cow-tls` knowing `uthread`
//! exists. Grounded on `keos`'s swappable `Scheduler` singleton
//! (`static mut SCHEDULER: Option<&'static dyn Scheduler>` with a
//! built-in fallback, see `keos/src/thread/scheduler.rs`).

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub type ThreadId = u64;

/// Returns a stable id for the calling thread. Returns `None` if a
/// fault-termination hook is not appropriate to call recursively while
/// already inside one (not used by the default provider, but kept for
/// symmetry with [`terminate_current`]).
pub type IdentityProvider = fn() -> ThreadId;

/// Marks the current thread as terminated in whatever sense its owner
/// understands: exits the OS thread (default) or, once `uthread`
/// installs its own hook, marks the running TCB `Exited` and
/// reschedules.
pub type TerminationHook = fn() -> !;

static mut IDENTITY_PROVIDER: Option<IdentityProvider> = None;
static mut TERMINATION_HOOK: Option<TerminationHook> = None;

fn default_identity() -> ThreadId {
    let mut hasher = DefaultHasher::new();
    std::thread::current().id().hash(&mut hasher);
    hasher.finish()
}

fn default_termination() -> ! {
    // Standalone mode: there is no scheduler to hand control back to, so
    // the only sound thing to do is end this OS thread, matching
    // `tls_page_fault`'s `pthread_exit(NULL)` call.
    std::thread::park();
    unreachable!("parked thread should not resume after fault termination")
}

/// Overrides the identity provider. Intended to be called exactly once,
/// by `uthread`, before any user thread is created.
///
/// # Safety
/// Must not be called concurrently with [`current_id`].
pub unsafe fn set_identity_provider(provider: IdentityProvider) {
    IDENTITY_PROVIDER = Some(provider);
}

/// Overrides the fault-termination hook. See [`set_identity_provider`].
///
/// # Safety
/// Must not be called concurrently with [`terminate_current`].
pub unsafe fn set_termination_hook(hook: TerminationHook) {
    TERMINATION_HOOK = Some(hook);
}

/// The calling thread's identity, per the currently installed provider
/// (or the OS-thread-keyed default if none has been installed).
pub fn current_id() -> ThreadId {
    let provider = unsafe { IDENTITY_PROVIDER }.unwrap_or(default_identity as IdentityProvider);
    provider()
}

/// Terminates the calling thread, per the currently installed hook (or
/// the OS-thread-exit default if none has been installed).
pub fn terminate_current() -> ! {
    let hook = unsafe { TERMINATION_HOOK }.unwrap_or(default_termination as TerminationHook);
    hook()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_identity_is_stable_within_a_thread() {
        assert_eq!(current_id(), current_id());
    }
}
