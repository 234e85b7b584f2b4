//! A single physical page, shared between `TlsArea`s via `Rc` cloning.
//!
//! `Rc::strong_count` *is* the page's reference count — the data model's
//! `ref_count` field falls directly out of `Rc`'s own bookkeeping rather
//! than needing a parallel counter, since a single OS thread drives all
//! of `cow-tls` at any instant (see `DESIGN.md`'s note on why this isn't
//! `Arc`: an atomic count would misleadingly imply cross-thread safety
//! this design neither has nor needs).

use hostio::vm::{Access, MappedPage};
use std::rc::Rc;

#[derive(Clone)]
pub struct Page(Rc<MappedPage>);

impl Page {
    pub fn reserve() -> Result<Page, hostio::CoreError> {
        Ok(Page(Rc::new(MappedPage::reserve()?)))
    }

    pub fn addr(&self) -> usize {
        self.0.addr()
    }

    pub fn ref_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    pub fn is_shared(&self) -> bool {
        self.ref_count() > 1
    }

    pub fn read_byte(&self, offset: usize) -> u8 {
        self.0.read_byte(offset)
    }

    pub fn write_byte(&self, offset: usize, value: u8) {
        self.0.write_byte(offset, value)
    }

    pub fn set_access(&self, access: Access) {
        self.0.set_access(access)
    }

    /// Copies `src`'s full contents into this page. Assumes both pages
    /// already have whatever protection the caller needs (`src`
    /// readable, `self` writable) and leaves protections untouched.
    pub fn raw_copy_from(&self, src: &Page) {
        let len = hostio::vm::page_size();
        unsafe {
            std::ptr::copy_nonoverlapping(src.addr() as *const u8, self.addr() as *mut u8, len);
        }
    }

}
