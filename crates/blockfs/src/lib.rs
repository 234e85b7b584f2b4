//! A flat, block-addressed file system over [`disk::Disk`]. Grounded on
//! `examples/original_source/fs/fs.c`'s `make_fs`/`mount_fs`/`umount_fs`/
//! `fs_open`/`fs_close`/`fs_create`/`fs_delete`/`fs_read`/`fs_write`/
//! `fs_get_filesize`/`fs_listfiles`/`fs_lseek`/`fs_truncate`.
//!
//! Two fixes from the source are applied here (see `DESIGN.md`):
//! `create` breaks on the first free inode instead of the last, and
//! `lseek` accepts `offset == file_size` (seeking to end-of-file, ready
//! for an append-by-write).

pub mod disk;
pub mod error;
pub mod layout;

use disk::{Disk, BLOCK_SIZE};
use error::FsError;
use hostio::CoreError;
use layout::{DirectoryEntry, FileDescriptor, Inode, SuperBlock, MAX_FILES, MAX_FILE_DESCRIPTORS, MAX_FILE_NAME};

pub struct FileSystem {
    disk: Disk,
    super_block: SuperBlock,
    inode_table: Vec<Inode>,
    directory: Vec<DirectoryEntry>,
    file_descriptors: Vec<FileDescriptor>,
}

impl FileSystem {
    /// Formats a brand-new, mounted file system over a fresh disk.
    pub fn make() -> FileSystem {
        FileSystem {
            disk: Disk::create(),
            super_block: SuperBlock::new(),
            inode_table: vec![Inode::empty(); MAX_FILES],
            directory: vec![DirectoryEntry::empty(); MAX_FILES],
            file_descriptors: vec![FileDescriptor::empty(); MAX_FILE_DESCRIPTORS],
        }
        .mounted()
    }

    fn mounted(mut self) -> FileSystem {
        self.super_block.mounted = true;
        self
    }

    fn require_mounted(&self) -> Result<(), FsError> {
        if !self.super_block.mounted {
            return Err(CoreError::NotFound.into());
        }
        Ok(())
    }

    fn find_by_name(&self, name: &str) -> Option<usize> {
        self.directory
            .iter()
            .position(|entry| entry.name.as_deref() == Some(name))
    }

    fn free_fd(&self) -> Option<usize> {
        self.file_descriptors.iter().position(|fd| fd.inode_index.is_none())
    }

    /// Creates a new, empty file.
    pub fn create(&mut self, name: &str) -> Result<(), FsError> {
        self.require_mounted()?;
        if name.len() > MAX_FILE_NAME {
            return Err(CoreError::InvalidArg.into());
        }
        if self.find_by_name(name).is_some() {
            return Err(CoreError::Exists.into());
        }
        let directory_index = self
            .directory
            .iter()
            .position(|entry| entry.inode_index.is_none())
            .ok_or(CoreError::Exhausted)?;

        let mut inode_index = None;
        for (i, inode) in self.inode_table.iter().enumerate() {
            if inode.ref_count == 0 {
                inode_index = Some(i);
                break;
            }
        }
        let inode_index = inode_index.ok_or(CoreError::Exhausted)?;

        self.directory[directory_index] = DirectoryEntry {
            name: Some(name.to_string()),
            inode_index: Some(inode_index),
        };
        self.inode_table[inode_index] = Inode::empty();
        self.inode_table[inode_index].ref_count = 1;
        log::debug!("blockfs: created {} (inode {})", name, inode_index);
        Ok(())
    }

    /// Removes a file. Refuses while any file descriptor still has it open.
    pub fn remove(&mut self, name: &str) -> Result<(), FsError> {
        self.require_mounted()?;
        let directory_index = self.find_by_name(name).ok_or(CoreError::NotFound)?;
        let inode_index = self.directory[directory_index].inode_index.unwrap();

        if self.inode_table[inode_index].ref_count > 1 {
            return Err(CoreError::Exists.into());
        }

        for block in self.inode_table[inode_index].blocks.iter_mut() {
            if let Some(b) = block.take() {
                self.super_block.free_block(b);
            }
        }
        self.directory[directory_index] = DirectoryEntry::empty();
        self.inode_table[inode_index] = Inode::empty();
        Ok(())
    }

    /// Opens a file by name, returning a file descriptor index.
    pub fn open(&mut self, name: &str) -> Result<usize, FsError> {
        self.require_mounted()?;
        let directory_index = self.find_by_name(name).ok_or(CoreError::NotFound)?;
        let inode_index = self.directory[directory_index].inode_index.unwrap();
        let fd = self.free_fd().ok_or(CoreError::Exhausted)?;

        self.file_descriptors[fd] = FileDescriptor {
            inode_index: Some(inode_index),
            file_pointer: 0,
        };
        self.inode_table[inode_index].ref_count += 1;
        Ok(fd)
    }

    fn fd_inode(&self, fildes: usize) -> Result<usize, FsError> {
        self.file_descriptors
            .get(fildes)
            .and_then(|fd| fd.inode_index)
            .ok_or_else(|| CoreError::NotFound.into())
    }

    /// Closes a file descriptor.
    pub fn close(&mut self, fildes: usize) -> Result<(), FsError> {
        self.require_mounted()?;
        let inode_index = self.fd_inode(fildes)?;
        self.inode_table[inode_index].ref_count -= 1;
        self.file_descriptors[fildes] = FileDescriptor::empty();
        Ok(())
    }

    /// Reads up to `buf.len()` bytes starting at the descriptor's current
    /// offset, returning the number of bytes actually read (clamped to
    /// the file's size).
    pub fn read(&mut self, fildes: usize, buf: &mut [u8]) -> Result<usize, FsError> {
        self.require_mounted()?;
        let inode_index = self.fd_inode(fildes)?;
        let file_size = self.inode_table[inode_index].file_size;
        let pointer = self.file_descriptors[fildes].file_pointer;
        let nbyte = buf.len().min(file_size.saturating_sub(pointer));

        let mut block_buf = [0u8; BLOCK_SIZE];
        let mut read = 0;
        while read < nbyte {
            let abs = pointer + read;
            let block_num = abs / BLOCK_SIZE;
            let block_off = abs % BLOCK_SIZE;
            let block = self.inode_table[inode_index].blocks[block_num].ok_or(CoreError::Fatal)?;
            self.disk.block_read(block, &mut block_buf)?;
            let take = (BLOCK_SIZE - block_off).min(nbyte - read);
            buf[read..read + take].copy_from_slice(&block_buf[block_off..block_off + take]);
            read += take;
        }
        self.file_descriptors[fildes].file_pointer += read;
        Ok(read)
    }

    /// Writes `data`, extending the file and allocating new blocks as
    /// needed, clamped to `MAX_FILE_SIZE`.
    pub fn write(&mut self, fildes: usize, data: &[u8]) -> Result<usize, FsError> {
        self.require_mounted()?;
        let inode_index = self.fd_inode(fildes)?;
        let pointer = self.file_descriptors[fildes].file_pointer;
        let nbyte = data.len().min(layout::MAX_FILE_SIZE.saturating_sub(pointer));
        if nbyte == 0 && !data.is_empty() {
            return Err(CoreError::Exhausted.into());
        }

        let mut block_buf = [0u8; BLOCK_SIZE];
        let mut written = 0;
        while written < nbyte {
            let abs = pointer + written;
            let block_num = abs / BLOCK_SIZE;
            let block_off = abs % BLOCK_SIZE;

            if self.inode_table[inode_index].blocks[block_num].is_none() {
                let fresh = self.super_block.alloc_block().ok_or(CoreError::Exhausted)?;
                self.inode_table[inode_index].blocks[block_num] = Some(fresh);
            }
            let block = self.inode_table[inode_index].blocks[block_num].unwrap();

            self.disk.block_read(block, &mut block_buf)?;
            let take = (BLOCK_SIZE - block_off).min(nbyte - written);
            block_buf[block_off..block_off + take].copy_from_slice(&data[written..written + take]);
            self.disk.block_write(block, &block_buf)?;
            written += take;
        }

        self.file_descriptors[fildes].file_pointer += written;
        let new_end = pointer + written;
        if new_end > self.inode_table[inode_index].file_size {
            self.inode_table[inode_index].file_size = new_end;
        }
        Ok(written)
    }

    pub fn filesize(&self, fildes: usize) -> Result<usize, FsError> {
        let inode_index = self.fd_inode(fildes)?;
        Ok(self.inode_table[inode_index].file_size)
    }

    /// Lists every file currently present in the directory.
    pub fn list_files(&self) -> Vec<String> {
        self.directory
            .iter()
            .filter_map(|entry| entry.name.clone())
            .collect()
    }

    /// Moves a descriptor's read/write offset. `offset == file_size` is
    /// accepted (seek-to-end, ready for an append write).
    pub fn lseek(&mut self, fildes: usize, offset: usize) -> Result<(), FsError> {
        let inode_index = self.fd_inode(fildes)?;
        if offset > self.inode_table[inode_index].file_size {
            return Err(CoreError::InvalidArg.into());
        }
        self.file_descriptors[fildes].file_pointer = offset;
        Ok(())
    }

    /// Truncates a file to `length`, freeing any blocks beyond it.
    pub fn truncate(&mut self, fildes: usize, length: usize) -> Result<(), FsError> {
        let inode_index = self.fd_inode(fildes)?;
        if length > self.inode_table[inode_index].file_size {
            return Err(CoreError::InvalidArg.into());
        }

        let first_freed_block = length.div_ceil(BLOCK_SIZE);
        for block in self.inode_table[inode_index].blocks[first_freed_block..].iter_mut() {
            if let Some(b) = block.take() {
                self.super_block.free_block(b);
            }
        }
        self.inode_table[inode_index].file_size = length;
        let pointer = &mut self.file_descriptors[fildes].file_pointer;
        if *pointer > length {
            *pointer = length;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_open_twice_shares_one_inode() {
        let mut fs = FileSystem::make();
        fs.create("a.txt").unwrap();
        let fd1 = fs.open("a.txt").unwrap();
        let fd2 = fs.open("a.txt").unwrap();
        assert_ne!(fd1, fd2);
        fs.close(fd1).unwrap();
        fs.close(fd2).unwrap();
    }

    #[test]
    fn create_rejects_duplicate_name() {
        let mut fs = FileSystem::make();
        fs.create("a.txt").unwrap();
        assert!(fs.create("a.txt").is_err());
    }

    #[test]
    fn remove_refuses_while_open() {
        let mut fs = FileSystem::make();
        fs.create("a.txt").unwrap();
        let fd = fs.open("a.txt").unwrap();
        assert!(fs.remove("a.txt").is_err());
        fs.close(fd).unwrap();
        fs.remove("a.txt").unwrap();
        assert!(fs.open("a.txt").is_err());
    }

    #[test]
    fn write_across_block_boundary_then_read_back() {
        let mut fs = FileSystem::make();
        fs.create("big.bin").unwrap();
        let fd = fs.open("big.bin").unwrap();

        let data = vec![7u8; BLOCK_SIZE + 100];
        let n = fs.write(fd, &data).unwrap();
        assert_eq!(n, data.len());
        assert_eq!(fs.filesize(fd).unwrap(), data.len());

        fs.lseek(fd, 0).unwrap();
        let mut out = vec![0u8; data.len()];
        let r = fs.read(fd, &mut out).unwrap();
        assert_eq!(r, data.len());
        assert_eq!(out, data);
        fs.close(fd).unwrap();
    }

    #[test]
    fn lseek_to_exactly_file_size_succeeds() {
        let mut fs = FileSystem::make();
        fs.create("f.txt").unwrap();
        let fd = fs.open("f.txt").unwrap();
        fs.write(fd, b"hello").unwrap();
        fs.lseek(fd, 5).unwrap();
        let mut out = [0u8; 1];
        assert_eq!(fs.read(fd, &mut out).unwrap(), 0);
        assert!(fs.lseek(fd, 6).is_err());
    }

    #[test]
    fn truncate_frees_blocks_and_clamps_pointer() {
        let mut fs = FileSystem::make();
        fs.create("t.bin").unwrap();
        let fd = fs.open("t.bin").unwrap();
        fs.write(fd, &vec![1u8; BLOCK_SIZE * 2]).unwrap();
        fs.truncate(fd, 10).unwrap();
        assert_eq!(fs.filesize(fd).unwrap(), 10);
        let mut out = [0u8; 20];
        fs.lseek(fd, 0).unwrap();
        assert_eq!(fs.read(fd, &mut out).unwrap(), 10);
    }
}
