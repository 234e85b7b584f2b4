//! The register-snapshot scheduler: a periodic `SIGALRM` drives
//! preemptive switches, cooperative code can also invoke it directly via
//! [`yield_now`], and `spawn`/`exit_thread`/`join` are all expressed in
//! terms of the same per-tick procedure. Grounded on `schedule`,
//! `scheduler_init`, `pthread_create`, `pthread_exit` and `pthread_join`
//! in `threads.c`.

use crate::error::ThreadError;
use crate::tcb::{Status, Tcb, TcbAdapter, ThreadId};
use hostio::context::Context;
use hostio::{identity, timer, CoreError, Limits};
use intrusive_collections::LinkedList;
use std::sync::{Once, OnceLock};

static mut THREADS: Option<LinkedList<TcbAdapter>> = None;
static mut CURRENT: *const Tcb = std::ptr::null();
static mut NEXT_ID: ThreadId = 0;
static INIT: Once = Once::new();
static LIMITS: OnceLock<Limits> = OnceLock::new();

fn limits() -> Limits {
    *LIMITS.get_or_init(Limits::from_env)
}

fn ensure_init() {
    INIT.call_once(|| unsafe {
        THREADS = Some(LinkedList::new(TcbAdapter::new()));
        let list = THREADS.as_mut().expect("just initialized");

        let boot = Tcb::bootstrap(alloc_id());
        CURRENT = Box::as_ref(&boot) as *const Tcb;
        list.push_back(boot);

        identity::set_identity_provider(current_id);
        identity::set_termination_hook(terminate_current);

        timer::install(on_tick, limits().quantum);
        log::debug!("uthread: scheduler initialized, quantum={:?}", limits().quantum);
    });
}

unsafe fn alloc_id() -> ThreadId {
    let id = NEXT_ID;
    NEXT_ID += 1;
    id
}

extern "C" fn on_tick(_signal: libc::c_int) {
    schedule();
}

/// Returns the running TCB's id. Installed as `hostio::identity`'s
/// provider once the scheduler exists, so `cow_tls` keys its registry by
/// user-thread id rather than OS-thread id.
fn current_id() -> ThreadId {
    unsafe { (*CURRENT).id }
}

/// Installed as `hostio::identity`'s termination hook: a thread that
/// touches TLS it doesn't own is marked `Exited` and the scheduler is
/// invoked, exactly like a normal `exit_thread`, but with a sentinel
/// return value distinguishing fault termination from a clean exit.
fn terminate_current() -> ! {
    exit_thread(usize::MAX)
}

/// Core per-tick procedure (spec §4.4): ready the running thread (unless
/// it just exited), advance the circular cursor to the next `Ready` TCB,
/// and resume it. Safe to invoke from the alarm handler or from a
/// cooperative call site — both paths fall through the same code.
fn schedule() {
    unsafe {
        let list = THREADS.as_mut().expect("scheduler initialized before first schedule()");
        let current_ptr = CURRENT;
        let current = &*current_ptr;

        if current.status.get() != Status::Exited {
            current.status.set(Status::Ready);
        }

        let mut cursor = list.cursor_mut_from_ptr(current_ptr);
        let bound = limits().max_threads + 1;
        let mut steps = 0usize;
        let next_ptr = loop {
            cursor.move_next();
            if cursor.is_null() {
                // Wrapped past the list's ghost element back to the front.
                cursor.move_next();
            }
            steps += 1;
            if steps > bound {
                if current.status.get() == Status::Exited {
                    log::info!("uthread: last thread exited, stopping scheduler");
                    timer::disarm();
                    std::process::exit(0);
                }
                current.status.set(Status::Running);
                return;
            }
            if let Some(tcb) = cursor.get() {
                if tcb.status.get() == Status::Ready {
                    break tcb as *const Tcb;
                }
            }
        };

        let next = &*next_ptr;
        next.status.set(Status::Running);
        CURRENT = next_ptr;

        Context::swap(&mut *current.context_ptr(), &*next.context_ptr());
    }
}

/// Entry point `makecontext` jumps to on a freshly spawned thread's
/// first switch-in. Reads its start closure off `CURRENT` rather than
/// any state owned by `hostio::context`, because by the time this runs,
/// `schedule()` has already set `CURRENT` to this very TCB — the
/// handoff is therefore per-thread, not a single shared slot a
/// re-entrant `schedule()` (e.g. a `SIGALRM` landing right after this
/// switch-in) could overwrite or race.
extern "C" fn trampoline() {
    let start = unsafe { (*CURRENT).take_pending_start() }
        .expect("trampoline entered without a pending start");
    start();
}

/// Invokes the scheduler cooperatively. Used by `usync`'s mutex/barrier
/// spin-yield loops and by `join`'s wait loop.
pub fn yield_now() {
    ensure_init();
    schedule();
}

/// Creates a new user thread running `start` to completion, then exiting
/// with its return value. Returns the new thread's id.
pub fn spawn<F>(start: F) -> Result<ThreadId, ThreadError>
where
    F: FnOnce() -> usize + 'static,
{
    ensure_init();
    timer::mask_preemption();
    let outcome = (|| unsafe {
        let list = THREADS.as_mut().expect("scheduler initialized");
        let live = list.iter().filter(|t| t.status.get() != Status::Exited).count();
        if live >= limits().max_threads {
            return Err(ThreadError::from(CoreError::Exhausted));
        }
        let id = alloc_id();
        let tcb = Tcb::spawned(
            id,
            limits().stack_size,
            Box::new(move || {
                let ret = start();
                exit_thread(ret);
            }),
            trampoline,
        );
        let mut cursor = list.cursor_mut_from_ptr(CURRENT);
        cursor.insert_before(tcb);
        log::debug!("uthread: spawned thread {}", id);
        Ok(id)
    })();
    timer::unmask_preemption();
    outcome
}

/// Terminates the calling thread, publishing `return_value` for a later
/// `join`. Never returns.
pub fn exit_thread(return_value: usize) -> ! {
    ensure_init();
    timer::mask_preemption();
    unsafe {
        let current = &*CURRENT;
        current.retval.set(Some(return_value));
        current.status.set(Status::Exited);
    }
    schedule();
    unreachable!("an Exited TCB must never be rescheduled")
}

/// Blocks (cooperatively, by yielding) until thread `id` has exited, then
/// returns its published return value and releases its stack.
pub fn join(id: ThreadId) -> Result<usize, ThreadError> {
    ensure_init();
    loop {
        timer::mask_preemption();
        let found = unsafe {
            let list = THREADS.as_ref().expect("scheduler initialized");
            list.iter().find(|t| t.id == id).map(|t| (t.status.get(), t.retval.get()))
        };
        match found {
            None => {
                timer::unmask_preemption();
                return Err(CoreError::NotFound.into());
            }
            Some((Status::Exited, retval)) => {
                timer::unmask_preemption();
                reap(id);
                return Ok(retval.unwrap_or(0));
            }
            Some(_) => {
                timer::unmask_preemption();
                yield_now();
            }
        }
    }
}

fn reap(id: ThreadId) {
    timer::mask_preemption();
    unsafe {
        let list = THREADS.as_mut().expect("scheduler initialized");
        let mut cursor = list.front_mut();
        while let Some(tcb) = cursor.get() {
            if tcb.id == id {
                cursor.remove();
                break;
            }
            cursor.move_next();
        }
    }
    timer::unmask_preemption();
}

/// The calling thread's own id.
pub fn self_id() -> ThreadId {
    ensure_init();
    current_id()
}
