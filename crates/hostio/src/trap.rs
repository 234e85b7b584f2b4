//! SignalGate: the process-wide handler for synchronous memory-protection
//! traps (`SIGSEGV`/`SIGBUS`), grounded on `tls_page_fault` in `tls.c`.
//!
//! The handler runs in a restricted signal context: it must not allocate
//! or take a lock the faulting thread might hold. It only ever calls the
//! single registered probe and, if that probe doesn't claim the fault,
//! restores the default disposition and re-raises so unrelated crashes
//! keep their native behavior.

use std::sync::Once;

/// Called with a page-aligned fault address. Returns `true` if the fault
/// was inside a region this probe owns — in which case the probe itself
/// must already have terminated the offending thread and the handler
/// does not return to the faulting instruction. Returns `false` to let
/// the fault fall through to the default disposition.
pub type Probe = fn(usize) -> bool;

static mut PROBE: Option<Probe> = None;
static INSTALL: Once = Once::new();

/// Installs the process-wide `SIGSEGV`/`SIGBUS` handler and registers
/// `probe` as the single owner-check callback. Idempotent: only the
/// first call actually installs the `sigaction`; later calls merely
/// replace the registered probe, matching `tls_create`'s `is_first_call`
/// latch around `tls_init()`.
///
/// # Safety
/// Must be called before any thread touches a trap-protected region.
/// `probe` must be safe to call from a signal handler (no allocation, no
/// locking).
pub unsafe fn install(probe: Probe) {
    PROBE = Some(probe);
    INSTALL.call_once(|| {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = handle_fault as usize;
        sa.sa_flags = libc::SA_SIGINFO;
        libc::sigemptyset(&mut sa.sa_mask);
        libc::sigaction(libc::SIGSEGV, &sa, std::ptr::null_mut());
        libc::sigaction(libc::SIGBUS, &sa, std::ptr::null_mut());
    });
}

extern "C" fn handle_fault(sig: libc::c_int, info: *mut libc::siginfo_t, _ctx: *mut libc::c_void) {
    let fault_addr = unsafe { (*info).si_addr() as usize };
    let aligned = crate::vm::align_down(fault_addr);

    let claimed = unsafe { PROBE }.map(|probe| probe(aligned)).unwrap_or(false);
    if claimed {
        return;
    }

    unsafe {
        libc::signal(libc::SIGSEGV, libc::SIG_DFL);
        libc::signal(libc::SIGBUS, libc::SIG_DFL);
        libc::raise(sig);
    }
}
