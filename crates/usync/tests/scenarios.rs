//! End-to-end scenarios for `usync`'s mutex and barrier, exercised over
//! real `uthread` user threads rather than bare OS threads (there is
//! only one OS thread to make progress on in this design). Both
//! scenarios drive the same process-wide `uthread` scheduler, so — same
//! reasoning as `uthread`'s own scenario tests — they run one after
//! another inside a single `#[test]`, never as separate functions cargo
//! could schedule on parallel OS threads.

use std::cell::Cell;
use std::rc::Rc;
use usync::{Barrier, Mutex};

#[test]
fn sync_scenarios() {
    mutex_serializes_contended_increments();
    barrier_reinitializes_with_a_new_generation_size();
}

/// Invariant #9: 10 threads each incrementing a shared counter 10,000
/// times under one mutex yields exactly 100,000, i.e. the mutex truly
/// serializes every increment.
fn mutex_serializes_contended_increments() {
    const THREADS: usize = 10;
    const ITERS: usize = 10_000;

    let mutex = Rc::new(Mutex::new());
    let counter = Rc::new(Cell::new(0usize));

    let ids: Vec<_> = (0..THREADS)
        .map(|_| {
            let mutex = mutex.clone();
            let counter = counter.clone();
            uthread::spawn(move || {
                for _ in 0..ITERS {
                    mutex.lock().unwrap();
                    counter.set(counter.get() + 1);
                    mutex.unlock().unwrap();
                }
                0
            })
            .unwrap()
        })
        .collect();

    for id in ids {
        uthread::join(id).unwrap();
    }

    assert_eq!(counter.get(), THREADS * ITERS);
}

/// S5: a barrier initialized with N=5 is used once by 5 threads (one
/// gets the serial sentinel), then destroyed and reinitialized with
/// N=4, then used again by 4 threads — exactly one of the second group
/// gets the serial sentinel too.
fn barrier_reinitializes_with_a_new_generation_size() {
    let barrier = Rc::new(Barrier::new(5).unwrap());
    let serial_count = Rc::new(Cell::new(0usize));

    let ids: Vec<_> = (0..5)
        .map(|_| {
            let barrier = barrier.clone();
            let serial_count = serial_count.clone();
            uthread::spawn(move || {
                if barrier.wait().unwrap() {
                    serial_count.set(serial_count.get() + 1);
                }
                0
            })
            .unwrap()
        })
        .collect();
    for id in ids {
        uthread::join(id).unwrap();
    }
    assert_eq!(serial_count.get(), 1);
    barrier.destroy().unwrap();

    let barrier = Rc::new(Barrier::new(4).unwrap());
    let serial_count = Rc::new(Cell::new(0usize));
    let ids: Vec<_> = (0..4)
        .map(|_| {
            let barrier = barrier.clone();
            let serial_count = serial_count.clone();
            uthread::spawn(move || {
                if barrier.wait().unwrap() {
                    serial_count.set(serial_count.get() + 1);
                }
                0
            })
            .unwrap()
        })
        .collect();
    for id in ids {
        uthread::join(id).unwrap();
    }
    assert_eq!(serial_count.get(), 1);
}
