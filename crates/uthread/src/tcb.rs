//! Thread control blocks: an intrusively-linked node combining status,
//! captured register context, owned stack and exit value. Grounded on
//! `struct thread_control_block` in `threads.h`/`threads.c`.

use hostio::context::Context;
use intrusive_collections::{intrusive_adapter, LinkedListLink};
use std::cell::{Cell, RefCell};

pub type ThreadId = hostio::identity::ThreadId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ready,
    Running,
    Exited,
}

/// A single thread's bookkeeping. Heap-allocated and never moved once
/// linked: the scheduler keeps raw pointers to the currently-running TCB
/// across `swapcontext` calls, so its address must stay stable.
pub struct Tcb {
    link: LinkedListLink,
    pub id: ThreadId,
    pub status: Cell<Status>,
    context: RefCell<Context>,
    /// Consumed exactly once, by this TCB's own trampoline invocation
    /// on its first `swapcontext`-in. Lives on the TCB itself (not in
    /// any shared slot) so a preemption tick that re-enters the
    /// scheduler right after the switch-in can never see or clobber
    /// another thread's start closure. `None` for the bootstrap TCB and
    /// for any TCB that has already run once.
    pending_start: RefCell<Option<Box<dyn FnOnce()>>>,
    /// Kept alive for as long as the TCB is linked; dropped (freeing the
    /// stack) when the TCB is reaped after a successful `join`.
    _stack: Option<Box<[u8]>>,
    pub retval: Cell<Option<usize>>,
}

intrusive_adapter!(pub TcbAdapter = Box<Tcb>: Tcb { link: LinkedListLink });

impl Tcb {
    /// The TCB for the thread that is already running when the scheduler
    /// is first initialized (the original process's one OS thread).
    pub fn bootstrap(id: ThreadId) -> Box<Tcb> {
        Box::new(Tcb {
            link: LinkedListLink::new(),
            id,
            status: Cell::new(Status::Running),
            context: RefCell::new(Context::capture()),
            pending_start: RefCell::new(None),
            _stack: None,
            retval: Cell::new(None),
        })
    }

    /// A freshly created user thread, ready to run `start` the first time
    /// the scheduler switches to it. `entry` is the trampoline
    /// `Context::new_on_stack` will jump to; it is the scheduler's job
    /// (not this TCB's) to pull `start` back out once it is running,
    /// since by then this TCB is the one the scheduler has made current.
    pub fn spawned(
        id: ThreadId,
        stack_size: usize,
        start: Box<dyn FnOnce()>,
        entry: extern "C" fn(),
    ) -> Box<Tcb> {
        let mut stack = vec![0u8; stack_size].into_boxed_slice();
        let context = Context::new_on_stack(&mut stack, entry);
        Box::new(Tcb {
            link: LinkedListLink::new(),
            id,
            status: Cell::new(Status::Ready),
            context: RefCell::new(context),
            pending_start: RefCell::new(Some(start)),
            _stack: Some(stack),
            retval: Cell::new(None),
        })
    }

    /// Takes this TCB's pending start closure, if it has not yet run.
    pub fn take_pending_start(&self) -> Option<Box<dyn FnOnce()>> {
        self.pending_start.borrow_mut().take()
    }

    /// # Safety
    /// The caller must not hold any other live borrow of this TCB's
    /// context (the scheduler only ever touches one TCB's context at a
    /// time, with the alarm masked).
    pub unsafe fn context_ptr(&self) -> *mut Context {
        self.context.as_ptr()
    }
}
