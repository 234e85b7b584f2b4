//! End-to-end scenario for `blockfs`.

use blockfs::disk::BLOCK_SIZE;
use blockfs::FileSystem;

/// S7: create a file, write across a block boundary, close, reopen,
/// read back, and confirm `lseek` to exactly `file_size` succeeds.
#[test]
fn create_write_close_reopen_read_back() {
    let mut fs = FileSystem::make();
    fs.create("greeting.txt").unwrap();

    let fd = fs.open("greeting.txt").unwrap();
    let mut payload = vec![b'x'; BLOCK_SIZE - 3];
    payload.extend_from_slice(b"END");
    fs.write(fd, &payload).unwrap();
    fs.close(fd).unwrap();

    let fd = fs.open("greeting.txt").unwrap();
    assert_eq!(fs.filesize(fd).unwrap(), payload.len());

    let mut out = vec![0u8; payload.len()];
    let read = fs.read(fd, &mut out).unwrap();
    assert_eq!(read, payload.len());
    assert_eq!(out, payload);

    fs.lseek(fd, payload.len()).unwrap();
    let mut tail = [0u8; 1];
    assert_eq!(fs.read(fd, &mut tail).unwrap(), 0);

    fs.close(fd).unwrap();
}

#[test]
fn listfiles_reflects_create_and_remove() {
    let mut fs = FileSystem::make();
    fs.create("a").unwrap();
    fs.create("b").unwrap();
    let mut names = fs.list_files();
    names.sort();
    assert_eq!(names, vec!["a".to_string(), "b".to_string()]);

    fs.remove("a").unwrap();
    assert_eq!(fs.list_files(), vec!["b".to_string()]);
}
