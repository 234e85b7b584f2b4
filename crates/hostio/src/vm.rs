//! Page-granular virtual memory reservation, grounded on the `mmap`/
//! `mprotect` calls in `tls.c`, generalized to query the host page size
//! instead of assuming 4 KiB.

use crate::error::CoreError;
use std::sync::OnceLock;

/// Access level a page can be opened at. There is no write-only level on
/// any host worth supporting, so this is the full lattice we need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    None,
    Read,
    ReadWrite,
}

impl Access {
    fn to_prot(self) -> libc::c_int {
        match self {
            Access::None => libc::PROT_NONE,
            Access::Read => libc::PROT_READ,
            Access::ReadWrite => libc::PROT_READ | libc::PROT_WRITE,
        }
    }
}

static PAGE_SIZE: OnceLock<usize> = OnceLock::new();

/// The host's page size, queried once via `sysconf` and cached.
pub fn page_size() -> usize {
    *PAGE_SIZE.get_or_init(|| {
        let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        if size <= 0 {
            4096
        } else {
            size as usize
        }
    })
}

/// `ceil(size / page_size())`, the page count every TLS area computation
/// in `cow-tls` is expressed in terms of.
pub fn pages_for(size: usize) -> usize {
    let ps = page_size();
    (size + ps - 1) / ps
}

/// A single anonymous, private page-aligned mapping, initially
/// unreadable and unwritable. Reserved with `PROT_NONE` so that every
/// subsequent access must go through [`set_access`] first, matching
/// `tls_create`'s `mmap(..., PROT_NONE, ...)`.
#[derive(Debug)]
pub struct MappedPage {
    addr: *mut libc::c_void,
}

unsafe impl Send for MappedPage {}

impl MappedPage {
    pub fn reserve() -> Result<MappedPage, CoreError> {
        let len = page_size();
        let addr = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                len,
                libc::PROT_NONE,
                libc::MAP_ANON | libc::MAP_PRIVATE,
                -1,
                0,
            )
        };
        if addr == libc::MAP_FAILED {
            return Err(CoreError::Fatal);
        }
        Ok(MappedPage { addr })
    }

    pub fn addr(&self) -> usize {
        self.addr as usize
    }

    /// Changes this page's protection. A failure here is fatal: a stuck
    /// protection would silently break every CoW invariant downstream.
    pub fn set_access(&self, access: Access) {
        let ret = unsafe { libc::mprotect(self.addr, page_size(), access.to_prot()) };
        if ret != 0 {
            log::error!("mprotect failed for page at {:#x}; aborting", self.addr());
            std::process::abort();
        }
    }

    /// Reads a single byte at `offset` within the page, transiently
    /// promoting to read-only and restoring `None` afterward.
    pub fn read_byte(&self, offset: usize) -> u8 {
        self.set_access(Access::Read);
        let byte = unsafe { *(self.addr as *const u8).add(offset) };
        self.set_access(Access::None);
        byte
    }

    /// Writes a single byte at `offset`, transiently promoting to
    /// read+write and restoring `None` afterward.
    pub fn write_byte(&self, offset: usize, value: u8) {
        self.set_access(Access::ReadWrite);
        unsafe {
            *(self.addr as *mut u8).add(offset) = value;
        }
        self.set_access(Access::None);
    }
}

impl Drop for MappedPage {
    fn drop(&mut self) {
        unsafe {
            libc::munmap(self.addr, page_size());
        }
    }
}

/// Aligns a faulting address down to its containing page boundary, the
/// first step `tls_page_fault` performs before scanning the registry.
pub fn align_down(addr: usize) -> usize {
    addr & !(page_size() - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_is_nonzero_and_power_of_two() {
        let ps = page_size();
        assert!(ps > 0);
        assert_eq!(ps & (ps - 1), 0);
    }

    #[test]
    fn pages_for_rounds_up() {
        let ps = page_size();
        assert_eq!(pages_for(1), 1);
        assert_eq!(pages_for(ps), 1);
        assert_eq!(pages_for(ps + 1), 2);
    }

    #[test]
    fn reserve_and_promote_roundtrips_a_byte() {
        let page = MappedPage::reserve().unwrap();
        page.write_byte(0, 0xAB);
        assert_eq!(page.read_byte(0), 0xAB);
    }
}
