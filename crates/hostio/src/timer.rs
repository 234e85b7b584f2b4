//! The periodic preemption signal the scheduler rides on, grounded on
//! `scheduler_init`'s `sigaction(SIGALRM, ...)` + `ualarm(QUANTUM,
//! QUANTUM)` in `threads.c`. Uses `setitimer` instead of the deprecated
//! `ualarm` so the quantum isn't limited to `ualarm`'s microsecond range.

use std::time::Duration;

/// Installs `handler` as the `SIGALRM` disposition and arms a repeating
/// timer of `period`. `SA_NODEFER` matches the original so a tick that
/// fires while the handler is still nominally "running" (e.g. because it
/// longjmp'd out without returning) does not leave the signal blocked
/// forever.
///
/// # Safety
/// `handler` must be safe to run as a signal handler: no allocation, no
/// locking, and it must not unwind past the signal frame.
pub unsafe fn install(handler: extern "C" fn(libc::c_int), period: Duration) {
    let mut sa: libc::sigaction = std::mem::zeroed();
    sa.sa_sigaction = handler as usize;
    sa.sa_flags = libc::SA_NODEFER;
    libc::sigemptyset(&mut sa.sa_mask);
    libc::sigaction(libc::SIGALRM, &sa, std::ptr::null_mut());
    arm(period);
}

/// (Re-)arms the repeating timer without touching the handler.
pub fn arm(period: Duration) {
    let interval = to_timeval(period);
    let timer = libc::itimerval {
        it_interval: interval,
        it_value: interval,
    };
    unsafe {
        libc::setitimer(libc::ITIMER_REAL, &timer, std::ptr::null_mut());
    }
}

/// Stops the timer, matching `pthread_exit`'s `ualarm(0, 0)` when the
/// last thread exits.
pub fn disarm() {
    let zero = libc::itimerval {
        it_interval: libc::timeval {
            tv_sec: 0,
            tv_usec: 0,
        },
        it_value: libc::timeval {
            tv_sec: 0,
            tv_usec: 0,
        },
    };
    unsafe {
        libc::setitimer(libc::ITIMER_REAL, &zero, std::ptr::null_mut());
    }
}

fn to_timeval(d: Duration) -> libc::timeval {
    libc::timeval {
        tv_sec: d.as_secs() as libc::time_t,
        tv_usec: d.subsec_micros() as libc::suseconds_t,
    }
}

/// Masks (blocks) `SIGALRM` for the calling thread, the critical-section
/// entry both `cow-tls`'s trap handling and `usync`'s primitives rely
/// on. Grounded on `threads.c`'s `lock()`.
pub fn mask_preemption() {
    unsafe {
        let mut set: libc::sigset_t = std::mem::zeroed();
        libc::sigemptyset(&mut set);
        libc::sigaddset(&mut set, libc::SIGALRM);
        libc::sigprocmask(libc::SIG_BLOCK, &set, std::ptr::null_mut());
    }
}

/// Unmasks `SIGALRM`, matching `threads.c`'s `unlock()`.
pub fn unmask_preemption() {
    unsafe {
        let mut set: libc::sigset_t = std::mem::zeroed();
        libc::sigemptyset(&mut set);
        libc::sigaddset(&mut set, libc::SIGALRM);
        libc::sigprocmask(libc::SIG_UNBLOCK, &set, std::ptr::null_mut());
    }
}
