//! Synchronization primitives expressed entirely over `uthread`'s
//! scheduler: every wait is a masked check followed by a cooperative
//! yield, never a kernel block, since there is only one OS thread to
//! make progress on. Grounded on the mutex/barrier halves of
//! `examples/original_source/multithreading/threads.c`.

pub mod barrier;
pub mod error;
pub mod mutex;

pub use barrier::Barrier;
pub use error::SyncError;
pub use mutex::Mutex;
