#![cfg(unix)]
//! Tests for the dual-result adapters over raw file descriptors
//!
//! `read` and `write` complete with both a byte count and the echoed
//! buffer; these tests pin the record packaging, the ownership round trip
//! of the buffer and the untouched errno propagation.

mod common;

use common::{wait_err, wait_ok};
use std::io::ErrorKind;
use task_fs::fs;
use tempfile::TempDir;

fn open_rw(path: &std::path::Path) -> fs::Fd {
    wait_ok(fs::open(path, libc::O_RDWR | libc::O_CREAT, 0o644))
}

#[test]
fn write_then_read_round_trips_through_the_descriptor() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.bin");
    let fd = open_rw(&path);

    let payload = b"hello world".to_vec();
    let outcome = wait_ok(fs::write(fd, payload, 0, 11, Some(0)));
    assert_eq!(outcome.written, 11);
    assert_eq!(outcome.value, b"hello world");

    wait_ok(fs::fsync(fd));

    let read_back = wait_ok(fs::read(fd, vec![0; 32], 0, 32, Some(0)));
    assert_eq!(read_back.bytes_read, 11);
    assert_eq!(&read_back.buffer[..11], b"hello world");

    wait_ok(fs::close(fd));
}

#[test]
fn the_echoed_buffer_is_the_one_handed_in() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("echo.bin");
    let fd = open_rw(&path);

    let buffer = b"payload".to_vec();
    let ptr = buffer.as_ptr() as usize;
    let outcome = wait_ok(fs::write(fd, buffer, 0, 7, Some(0)));
    assert_eq!(outcome.written, 7);
    assert_eq!(
        outcome.value.as_ptr() as usize,
        ptr,
        "the buffer must round-trip without copying"
    );

    wait_ok(fs::close(fd));
}

#[test]
fn reads_land_at_the_requested_buffer_offset() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("window.bin");
    std::fs::write(&path, "abcdefgh").unwrap();
    let fd = wait_ok(fs::open(&path, libc::O_RDONLY, 0));

    let outcome = wait_ok(fs::read(fd, vec![b'.'; 12], 4, 8, Some(0)));
    assert_eq!(outcome.bytes_read, 8);
    assert_eq!(&outcome.buffer, b"....abcdefgh");

    wait_ok(fs::close(fd));
}

#[test]
fn a_window_outside_the_buffer_is_rejected_as_invalid_input() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bounds.bin");
    let fd = open_rw(&path);

    let error = wait_err(fs::read(fd, vec![0; 8], 6, 8, Some(0)));
    assert_eq!(error.kind(), ErrorKind::InvalidInput);

    let error = wait_err(fs::write(fd, vec![0; 8], usize::MAX, 2, Some(0)));
    assert_eq!(error.kind(), ErrorKind::InvalidInput);

    wait_ok(fs::close(fd));
}

#[test]
fn a_position_beyond_the_file_offset_range_is_rejected_as_invalid_input() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("far.bin");
    let fd = open_rw(&path);

    let error = wait_err(fs::read(fd, vec![0; 4], 0, 4, Some(u64::MAX)));
    assert_eq!(error.kind(), ErrorKind::InvalidInput);

    let error = wait_err(fs::write(fd, vec![0; 4], 0, 4, Some(u64::MAX)));
    assert_eq!(error.kind(), ErrorKind::InvalidInput);

    wait_ok(fs::close(fd));
}

#[test]
fn write_str_echoes_the_string_alongside_the_count() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("text.txt");
    let fd = open_rw(&path);

    let outcome = wait_ok(fs::write_str(fd, "greetings", Some(0)));
    assert_eq!(outcome.written, 9);
    assert_eq!(outcome.value, "greetings");

    wait_ok(fs::close(fd));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "greetings");
}

#[test]
fn sequential_writes_without_a_position_advance_the_cursor() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cursor.txt");
    let fd = open_rw(&path);

    wait_ok(fs::write_str(fd, "one", None));
    wait_ok(fs::write_str(fd, " two", None));
    wait_ok(fs::close(fd));

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "one two");
}

#[test]
fn a_failing_syscall_surfaces_its_errno_untouched() {
    let dir = TempDir::new().unwrap();
    let fd = wait_ok(fs::open(dir.path(), libc::O_RDONLY | libc::O_DIRECTORY, 0));

    // read(2) on a directory descriptor fails with EISDIR on Linux.
    let error = wait_err(fs::read(fd, vec![0; 4], 0, 4, None));
    assert_eq!(error.raw_os_error(), Some(libc::EISDIR));

    wait_ok(fs::close(fd));
}
