//! A reusable barrier with no separate reset step: a `generation`
//! counter, bumped once by the serial winner, lets the next generation
//! start accumulating arrivals immediately while still giving a
//! straggler from the *previous* generation an unambiguous release
//! signal to poll for. Grounded on `pthread_barrier_{init,wait,destroy}`
//! in `threads.c`, with the §9 fix applied: non-serial waiters
//! genuinely spin-yield until the winner's arrival is visible (the
//! source's equivalent loop condition can never be false, so it never
//! actually waits).
//!
//! Polling `arrivals >= limit` directly (instead of the generation
//! counter) would race same-instance reuse across generations: if the
//! winner calls `wait()` again for the next generation before a slow
//! non-winner from the previous one notices release, the winner's own
//! arrival resets `arrivals` back down, and the straggler's poll would
//! see it low again and fold into the wrong generation. Capturing the
//! generation a waiter arrived in and waiting for it to change sidesteps
//! that: the counter only ever moves forward, once per generation,
//! under the same masked section that resets `arrivals`.

use crate::error::SyncError;
use hostio::timer;
use hostio::CoreError;
use std::cell::Cell;

pub struct Barrier {
    limit: Cell<usize>,
    arrivals: Cell<usize>,
    generation: Cell<usize>,
    initialized: Cell<bool>,
}

impl Barrier {
    pub fn new(count: usize) -> Result<Barrier, SyncError> {
        if count == 0 {
            return Err(CoreError::InvalidArg.into());
        }
        Ok(Barrier {
            limit: Cell::new(count),
            arrivals: Cell::new(0),
            generation: Cell::new(0),
            initialized: Cell::new(true),
        })
    }

    /// Arrives at the barrier. Returns `true` to exactly one caller per
    /// generation (the serial winner, per spec's "serial sentinel"),
    /// `false` to the rest.
    pub fn wait(&self) -> Result<bool, SyncError> {
        timer::mask_preemption();
        if !self.initialized.get() {
            timer::unmask_preemption();
            return Err(SyncError::InvalidState);
        }
        let my_generation = self.generation.get();
        self.arrivals.set(self.arrivals.get() + 1);
        let is_serial = self.arrivals.get() >= self.limit.get();
        if is_serial {
            self.arrivals.set(0);
            self.generation.set(my_generation.wrapping_add(1));
        }
        timer::unmask_preemption();

        if !is_serial {
            loop {
                timer::mask_preemption();
                let released = self.generation.get() != my_generation;
                timer::unmask_preemption();
                if released {
                    break;
                }
                uthread::yield_now();
            }
        }
        Ok(is_serial)
    }

    pub fn destroy(&self) -> Result<(), SyncError> {
        timer::mask_preemption();
        if !self.initialized.get() {
            timer::unmask_preemption();
            return Err(SyncError::InvalidState);
        }
        self.initialized.set(false);
        self.limit.set(0);
        self.arrivals.set(0);
        timer::unmask_preemption();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_count_is_rejected() {
        assert!(Barrier::new(0).is_err());
    }

    #[test]
    fn single_participant_is_always_serial() {
        let b = Barrier::new(1).unwrap();
        assert_eq!(b.wait().unwrap(), true);
        assert_eq!(b.wait().unwrap(), true);
    }
}
