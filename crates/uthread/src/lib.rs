//! A user-mode M:1 thread library: one OS thread multiplexes many user
//! threads via a periodic alarm and `ucontext`-based register snapshot
//! and restore, with cooperative yields from `usync`'s primitives
//! layered on top. Grounded on `examples/original_source/multithreading/
//! threads.c`.
//!
//! Every scheduler-affecting call here funnels through a single
//! process-wide scheduler instance (see `scheduler`), consistent with
//! the non-goal of cross-OS-thread parallelism: this library assumes it
//! owns the one OS thread it runs on.

pub mod error;
pub mod scheduler;
pub mod tcb;

pub use error::ThreadError;
pub use scheduler::{exit_thread, join, self_id as current_id, spawn, yield_now};
pub use tcb::ThreadId;
