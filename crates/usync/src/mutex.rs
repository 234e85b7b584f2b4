//! A mutex expressed entirely over the scheduler's spin-yield loop:
//! there is no kernel blocking primitive to wait on, so the only way the
//! owner makes progress on a single OS thread is for a contending waiter
//! to yield. Grounded on `pthread_mutex_{init,lock,unlock,destroy}` in
//! `threads.c`.

use crate::error::SyncError;
use hostio::timer;
use std::cell::Cell;

pub struct Mutex {
    locked: Cell<bool>,
    initialized: Cell<bool>,
}

impl Mutex {
    pub fn new() -> Mutex {
        Mutex {
            locked: Cell::new(false),
            initialized: Cell::new(true),
        }
    }

    /// Blocks (cooperatively) until the mutex is free, then takes it.
    /// Every check of `locked` happens with the preemption alarm masked,
    /// so the test-and-set is atomic with respect to this single OS
    /// thread's other user threads.
    pub fn lock(&self) -> Result<(), SyncError> {
        loop {
            timer::mask_preemption();
            if !self.initialized.get() {
                timer::unmask_preemption();
                return Err(SyncError::InvalidState);
            }
            if !self.locked.get() {
                self.locked.set(true);
                timer::unmask_preemption();
                return Ok(());
            }
            timer::unmask_preemption();
            uthread::yield_now();
        }
    }

    pub fn unlock(&self) -> Result<(), SyncError> {
        timer::mask_preemption();
        if !self.initialized.get() {
            timer::unmask_preemption();
            return Err(SyncError::InvalidState);
        }
        self.locked.set(false);
        timer::unmask_preemption();
        Ok(())
    }

    /// Clears the mutex's state. Returns `SyncError::InvalidState` if the
    /// mutex is already uninitialized or is currently held, rather than
    /// silently corrupting whatever thread still thinks it owns the lock
    /// (see `DESIGN.md`'s resolution of the source's §3/§4.5 tension).
    pub fn destroy(&self) -> Result<(), SyncError> {
        timer::mask_preemption();
        if !self.initialized.get() || self.locked.get() {
            timer::unmask_preemption();
            return Err(SyncError::InvalidState);
        }
        self.initialized.set(false);
        timer::unmask_preemption();
        Ok(())
    }
}

impl Default for Mutex {
    fn default() -> Self {
        Mutex::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_unlock_roundtrips() {
        let m = Mutex::new();
        m.lock().unwrap();
        m.unlock().unwrap();
        m.lock().unwrap();
        m.unlock().unwrap();
    }

    #[test]
    fn destroy_while_held_is_rejected() {
        let m = Mutex::new();
        m.lock().unwrap();
        assert_eq!(m.destroy(), Err(SyncError::InvalidState));
        m.unlock().unwrap();
        assert!(m.destroy().is_ok());
    }

    #[test]
    fn destroy_uninitialized_is_rejected() {
        let m = Mutex::new();
        m.destroy().unwrap();
        assert_eq!(m.destroy(), Err(SyncError::InvalidState));
    }
}
