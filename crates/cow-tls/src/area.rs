//! A thread's byte-addressable region backed by individually protected
//! pages, and the copy-on-write logic for reading, writing and cloning
//! it. Grounded directly on `tls_create`/`tls_read`/`tls_write`/
//! `tls_clone` in `examples/original_source/cow/tls.c`.

use crate::error::TlsError;
use crate::page::Page;
use hostio::vm::{self, Access};
use hostio::CoreError;

pub struct TlsArea {
    size: usize,
    pages: Vec<Page>,
}

impl TlsArea {
    pub fn create(size: usize) -> Result<TlsArea, TlsError> {
        if size == 0 {
            return Err(CoreError::InvalidArg.into());
        }
        let page_count = vm::pages_for(size);
        let mut pages = Vec::with_capacity(page_count);
        for _ in 0..page_count {
            pages.push(Page::reserve()?);
        }
        Ok(TlsArea { size, pages })
    }

    /// Builds a new area aliasing `donor`'s pages. No bytes are copied;
    /// the first divergent write on either side splits that one page.
    pub fn clone_from(donor: &TlsArea) -> TlsArea {
        TlsArea {
            size: donor.size,
            pages: donor.pages.clone(),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn num_pages(&self) -> usize {
        self.pages.len()
    }

    pub fn page_addr(&self, index: usize) -> Option<usize> {
        self.pages.get(index).map(Page::addr)
    }

    fn locate(offset: usize) -> (usize, usize) {
        let page_size = vm::page_size();
        (offset / page_size, offset % page_size)
    }

    fn check_bounds(&self, offset: usize, length: usize) -> Result<(), TlsError> {
        let end = offset.checked_add(length).ok_or(CoreError::InvalidArg)?;
        if end > self.size {
            return Err(CoreError::InvalidArg.into());
        }
        Ok(())
    }

    /// Reads `length` bytes starting at `offset` into `out`. Never
    /// changes a page's reference count: a shared page is read through
    /// a transient read-only promotion, never copied.
    pub fn read(&self, offset: usize, length: usize, out: &mut [u8]) -> Result<(), TlsError> {
        self.check_bounds(offset, length)?;
        for i in 0..length {
            let (page_num, page_off) = Self::locate(offset + i);
            out[i] = self.pages[page_num].read_byte(page_off);
        }
        Ok(())
    }

    /// Writes `length` bytes starting at `offset` from `data`. Any byte
    /// that lands on a page with `ref_count > 1` triggers a
    /// copy-on-write split first: a fresh private page is allocated,
    /// seeded from the shared page's contents, and substituted into this
    /// area before the write proceeds.
    pub fn write(&mut self, offset: usize, length: usize, data: &[u8]) -> Result<(), TlsError> {
        self.check_bounds(offset, length)?;
        for i in 0..length {
            let (page_num, page_off) = Self::locate(offset + i);
            if self.pages[page_num].is_shared() {
                self.split_page(page_num)?;
            }
            self.pages[page_num].write_byte(page_off, data[i]);
        }
        Ok(())
    }

    fn split_page(&mut self, page_num: usize) -> Result<(), TlsError> {
        let shared = self.pages[page_num].clone();
        let fresh = Page::reserve()?;

        fresh.set_access(Access::ReadWrite);
        shared.set_access(Access::Read);
        fresh.raw_copy_from(&shared);
        // Leave the old page at read-only: it still belongs to whoever
        // else is holding it, and a transient all-the-way-to-None demote
        // here would need to race-free coordinate with them. The next
        // read or write they perform manages its own protection cycle
        // regardless of where this leaves it.

        self.pages[page_num] = fresh;
        Ok(())
    }
}
