//! Host-facing primitives shared by the CoW-TLS and user-thread labs:
//! page-granular virtual memory, the memory-protection trap gate, the
//! preemption timer, `ucontext`-based register snapshot/restore, and the
//! pluggable thread-identity seam that lets `uthread` reinterpret "the
//! current thread" out from under `cow-tls`.
//!
//! Nothing in this crate knows about TLS areas or thread control blocks;
//! it only knows about pages, signals and register contexts.

pub mod context;
pub mod error;
pub mod identity;
pub mod limits;
pub mod timer;
pub mod trap;
pub mod vm;

pub use error::CoreError;
pub use limits::Limits;
