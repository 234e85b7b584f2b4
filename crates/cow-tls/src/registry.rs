//! Process-wide table of per-thread TLS areas, and the fault probe
//! registered with `hostio::trap` to terminate any thread that touches
//! a page it doesn't own. Grounded on `thread_storage[MAX_THREADS]` and
//! `tls_page_fault` in `tls.c`.
//!
//! The table is a fixed-capacity `ArrayVec` scanned linearly with no
//! locking, by design: the fault probe can run inside a signal handler
//! and must not allocate or block. This mirrors the original's complete
//! absence of synchronization around `thread_storage` — soundness here
//! rests on the same assumption the rest of this lab makes, that only
//! one logical thread of control touches the table at a time (a single
//! OS thread in the `uthread` world; cooperating, non-racing OS threads
//! when `cow-tls` is used standalone).

use crate::area::TlsArea;
use crate::error::TlsError;
use arrayvec::ArrayVec;
use hostio::identity::{self, ThreadId};
use hostio::{CoreError, Limits};
use std::sync::{Once, OnceLock};

/// Upper bound on the backing array: large enough for any
/// [`Limits::from_env`] override this process will ever see. The
/// *effective* bound callers observe is `limits().max_tls_areas`, not
/// this constant — see [`limits`].
const CAPACITY: usize = Limits::DEFAULT.max_tls_areas;

static LIMITS: OnceLock<Limits> = OnceLock::new();

fn limits() -> Limits {
    *LIMITS.get_or_init(Limits::from_env)
}

struct Entry {
    owner: ThreadId,
    area: TlsArea,
}

static mut REGISTRY: Option<ArrayVec<Option<Entry>, CAPACITY>> = None;
static INIT: Once = Once::new();

fn ensure_init() {
    INIT.call_once(|| unsafe {
        let mut table = ArrayVec::new();
        for _ in 0..CAPACITY {
            table.push(None);
        }
        REGISTRY = Some(table);
        hostio::trap::install(fault_probe);
    });
}

/// Index of the first free slot within the *effective* bound
/// (`limits().max_tls_areas`), not the full backing array.
fn free_slot_within_bound(table: &ArrayVec<Option<Entry>, CAPACITY>) -> Option<usize> {
    let bound = limits().max_tls_areas.min(CAPACITY);
    table[..bound].iter().position(|slot| slot.is_none())
}

fn find_index(table: &ArrayVec<Option<Entry>, CAPACITY>, id: ThreadId) -> Option<usize> {
    table.iter().position(|slot| matches!(slot, Some(e) if e.owner == id))
}

/// Creates a TLS area of `size` bytes for the calling thread.
pub fn tls_create(size: usize) -> Result<(), TlsError> {
    ensure_init();
    let id = identity::current_id();
    let table = unsafe { REGISTRY.as_mut() }.expect("registry initialized by ensure_init");

    if find_index(table, id).is_some() {
        return Err(CoreError::Exists.into());
    }
    let slot = free_slot_within_bound(table).ok_or(CoreError::Exhausted)?;

    let area = TlsArea::create(size)?;
    table[slot] = Some(Entry { owner: id, area });
    log::debug!("tls_create: thread {} allocated {} bytes in slot {}", id, size, slot);
    Ok(())
}

/// Destroys the calling thread's TLS area, releasing or decrementing
/// every page it held.
pub fn tls_destroy() -> Result<(), TlsError> {
    ensure_init();
    let id = identity::current_id();
    let table = unsafe { REGISTRY.as_mut() }.expect("registry initialized by ensure_init");
    let slot = find_index(table, id).ok_or(CoreError::NotFound)?;
    table[slot] = None;
    log::debug!("tls_destroy: thread {} released slot {}", id, slot);
    Ok(())
}

/// Reads `length` bytes at `offset` from the calling thread's TLS area.
pub fn tls_read(offset: usize, length: usize, out: &mut [u8]) -> Result<(), TlsError> {
    ensure_init();
    let id = identity::current_id();
    let table = unsafe { REGISTRY.as_ref() }.expect("registry initialized by ensure_init");
    let slot = find_index(table, id).ok_or(CoreError::NotFound)?;
    table[slot].as_ref().unwrap().area.read(offset, length, out)
}

/// Writes `length` bytes at `offset` into the calling thread's TLS area,
/// splitting any shared page it touches.
pub fn tls_write(offset: usize, length: usize, data: &[u8]) -> Result<(), TlsError> {
    ensure_init();
    let id = identity::current_id();
    let table = unsafe { REGISTRY.as_mut() }.expect("registry initialized by ensure_init");
    let slot = find_index(table, id).ok_or(CoreError::NotFound)?;
    table[slot].as_mut().unwrap().area.write(offset, length, data)
}

/// Returns the virtual address of page `page_num` within the calling
/// thread's TLS area. Exists for callers (tests, demos) that want to
/// deliberately dereference a raw pointer into their own region to
/// observe `SignalGate` terminate them — there is no other way to learn
/// where a TLS area lives, by design (every ordinary access must go
/// through [`tls_read`]/[`tls_write`]).
pub fn tls_debug_page_addr(page_num: usize) -> Result<usize, TlsError> {
    ensure_init();
    let id = identity::current_id();
    let table = unsafe { REGISTRY.as_ref() }.expect("registry initialized by ensure_init");
    let slot = find_index(table, id).ok_or(CoreError::NotFound)?;
    table[slot]
        .as_ref()
        .unwrap()
        .area
        .page_addr(page_num)
        .ok_or(CoreError::InvalidArg.into())
}

/// Clones `donor`'s TLS area into a new one owned by the calling thread,
/// sharing every page with an incremented reference count.
pub fn tls_clone(donor: ThreadId) -> Result<(), TlsError> {
    ensure_init();
    let id = identity::current_id();
    let table = unsafe { REGISTRY.as_mut() }.expect("registry initialized by ensure_init");

    if find_index(table, id).is_some() {
        return Err(CoreError::Exists.into());
    }
    let donor_slot = find_index(table, donor).ok_or(CoreError::NotFound)?;
    let new_slot = free_slot_within_bound(table).ok_or(CoreError::Exhausted)?;

    let cloned = TlsArea::clone_from(&table[donor_slot].as_ref().unwrap().area);
    table[new_slot] = Some(Entry { owner: id, area: cloned });
    log::debug!("tls_clone: thread {} cloned thread {}'s area into slot {}", id, donor, new_slot);
    Ok(())
}

/// Scans every registered area for a page at `aligned_addr`. If found,
/// the owning thread touched its own protected TLS page outside of
/// `tls_read`/`tls_write` (or a double fault) and is terminated on the
/// spot; this function never returns in that case.
///
/// # Safety (signal-handler context)
/// No allocation, no locking: a linear scan over an already-initialized
/// fixed-capacity table.
fn fault_probe(aligned_addr: usize) -> bool {
    let table = match unsafe { REGISTRY.as_ref() } {
        Some(t) => t,
        None => return false,
    };
    for slot in table.iter().flatten() {
        for page_num in 0..slot.area.num_pages() {
            if slot.area.page_addr(page_num) == Some(aligned_addr) {
                eprintln!(
                    "TLS Error: Segmentation fault in thread {} at page {}. Exiting thread.",
                    slot.owner, page_num
                );
                log::error!("tls fault: thread {} touched protected page {}", slot.owner, page_num);
                identity::terminate_current();
            }
        }
    }
    false
}
