//! Register-state snapshot/restore via POSIX `ucontext`, the chosen
//! replacement for the original library's `setjmp`/`longjmp` plus
//! hand-rolled glibc pointer mangling (see `threads.h`'s `_ptr_mangle`/
//! `set_reg`/`start_thunk`). `swapcontext` natively handles being
//! captured from, and resumed into, a signal handler frame, which is
//! exactly the property the original's manual register poking existed
//! to approximate.

use std::mem::MaybeUninit;

/// One thread's captured register state plus its stack bounds. Stack
/// memory is owned by the caller (`uthread::tcb`), not by `Context`
/// itself, because the `ucontext_t` does not own the stack it points at.
pub struct Context(Box<libc::ucontext_t>);

impl Context {
    /// A zeroed context, to be filled in by [`Context::capture`] before
    /// first use as a `swap` source.
    pub fn empty() -> Context {
        Context(Box::new(unsafe { MaybeUninit::zeroed().assume_init() }))
    }

    /// Captures the calling context in place (used for the bootstrap
    /// "main" thread, which is already running rather than freshly
    /// created).
    pub fn capture() -> Context {
        let mut ctx = Context::empty();
        unsafe {
            libc::getcontext(ctx.0.as_mut());
        }
        ctx
    }

    /// Builds a new context that, when first switched into, begins
    /// executing `entry` on top of `stack`. `entry` takes no arguments:
    /// `makecontext`'s variadic-argument ABI is avoided entirely rather
    /// than used to smuggle a fat pointer/closure through `int` varargs,
    /// so `entry` must recover whatever it needs to run from state the
    /// caller tracks itself (see `uthread::scheduler`'s `trampoline`,
    /// which reads the closure to run off the TCB the scheduler has
    /// already made current, not off any state owned by this module).
    pub fn new_on_stack(stack: &mut [u8], entry: extern "C" fn()) -> Context {
        let mut ctx = Context::empty();
        unsafe {
            libc::getcontext(ctx.0.as_mut());
            ctx.0.uc_stack.ss_sp = stack.as_mut_ptr() as *mut libc::c_void;
            ctx.0.uc_stack.ss_size = stack.len();
            ctx.0.uc_link = std::ptr::null_mut();
            libc::makecontext(ctx.0.as_mut(), entry, 0);
        }
        ctx
    }

    /// Saves the caller's registers into `from` and resumes `to`.
    /// Returns once some later `swap` targets `from` again.
    ///
    /// # Safety
    /// `to` must be a context previously produced by [`Context::capture`]
    /// or [`Context::new_on_stack`], and its stack (if any) must still be
    /// live.
    pub unsafe fn swap(from: &mut Context, to: &Context) {
        libc::swapcontext(from.0.as_mut(), to.0.as_ref());
    }
}
