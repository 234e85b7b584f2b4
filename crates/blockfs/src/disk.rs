//! An in-process simulated block device. Grounded on `disk.h`'s
//! `make_disk`/`open_disk`/`close_disk`/`block_read`/`block_write`, with
//! the real `open()`/`read()`/`write()` syscalls against a backing file
//! replaced by a plain in-memory block array: this workspace has no
//! interest in persistence across process restarts, only in the
//! block-addressed semantics a file system is built on.

use crate::error::FsError;
use hostio::CoreError;

pub const BLOCK_SIZE: usize = 4096;
pub const DISK_BLOCKS: usize = 8192;

pub struct Disk {
    blocks: Vec<[u8; BLOCK_SIZE]>,
}

impl Disk {
    /// Creates a fresh, zeroed disk of `DISK_BLOCKS` blocks.
    pub fn create() -> Disk {
        Disk {
            blocks: vec![[0u8; BLOCK_SIZE]; DISK_BLOCKS],
        }
    }

    pub fn block_read(&self, block: usize, buf: &mut [u8; BLOCK_SIZE]) -> Result<(), FsError> {
        let src = self.blocks.get(block).ok_or(CoreError::InvalidArg)?;
        buf.copy_from_slice(src);
        Ok(())
    }

    pub fn block_write(&mut self, block: usize, buf: &[u8; BLOCK_SIZE]) -> Result<(), FsError> {
        let dst = self.blocks.get_mut(block).ok_or(CoreError::InvalidArg)?;
        dst.copy_from_slice(buf);
        Ok(())
    }
}
