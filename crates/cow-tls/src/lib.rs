//! Per-thread TLS regions isolated by page-fault trapping, with
//! reference-counted copy-on-write sharing between threads. Grounded on
//! `examples/original_source/cow/tls.c`.
//!
//! This crate only knows about pages, areas and a process-wide registry; it
//! asks [`hostio::identity`] for "who is the calling thread" rather than
//! assuming an OS thread, so it works unmodified once `uthread` overrides
//! that provider with its own user-thread ids.

pub mod area;
pub mod error;
pub mod page;
pub mod registry;

pub use error::TlsError;
pub use hostio::identity::ThreadId;
pub use registry::{tls_clone, tls_create, tls_debug_page_addr, tls_destroy, tls_read, tls_write};
