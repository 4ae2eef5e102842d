//! Callback-style native filesystem layer
//!
//! One function per operation, each taking its leading arguments plus an
//! error-first callback. An operation dispatches its work to a dedicated
//! named worker thread, performs the `std::fs`/`libc` call there, and
//! invokes the callback exactly once with the outcome. The callback may
//! therefore fire on a different thread than the caller's, which is why
//! the synthesized callbacks are `Send`.
//!
//! This is the layer the bound operations in [`super`] are lifted from; it
//! is deliberately callback-shaped, never future-shaped, and it reports
//! every failure as the unmodified [`io::Error`] the underlying call
//! produced.

use super::rw::{ReadErrback, WriteErrback};
use super::Fd;
use crate::errback::{Errback, ErrbackVal};
use filetime::FileTime;
use std::ffi::{CString, OsString};
use std::fs::{DirBuilder, File, OpenOptions};
use std::io::{self, Write};
use std::mem::ManuallyDrop;
use std::os::fd::FromRawFd;
use std::os::unix::ffi::{OsStrExt, OsStringExt};
use std::os::unix::fs::{DirBuilderExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::SystemTime;
use tracing::{error, trace};

/// Run `job` on a fresh named worker thread.
///
/// The job owns the callback; if the thread cannot be spawned the callback
/// is lost with it and the associated task stays pending, which is the same
/// observable outcome as a native operation that never calls back.
fn dispatch(op: &'static str, job: impl FnOnce() + Send + 'static) {
    trace!(op, "dispatching native filesystem operation");
    let worker = thread::Builder::new().name(format!("task-fs/{op}"));
    if let Err(spawn_error) = worker.spawn(job) {
        error!(op, %spawn_error, "failed to spawn worker; operation will never call back");
    }
}

/// Invoke a value-shaped errback with a `Result`, error-first.
fn complete<T>(cb: ErrbackVal<T, io::Error>, result: io::Result<T>) {
    match result {
        Ok(value) => cb.call(None, Some(value)),
        Err(error) => cb.call(Some(error), None),
    }
}

fn cstring(path: &Path) -> io::Result<CString> {
    CString::new(path.as_os_str().as_bytes()).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "path contains an interior NUL byte",
        )
    })
}

/// Map a `0`-on-success libc return code to a unit result.
fn os_unit(rc: libc::c_int) -> io::Result<()> {
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

/// View a raw descriptor as a [`File`] without taking ownership of it.
///
/// The descriptor stays open after the view is dropped; release is still
/// the caller's job through `close`.
fn borrowed_file(fd: Fd) -> ManuallyDrop<File> {
    ManuallyDrop::new(unsafe { File::from_raw_fd(fd.0) })
}

/// Narrow a `u64` offset or length to the platform's `off_t`.
fn file_offset(value: u64) -> io::Result<libc::off_t> {
    libc::off_t::try_from(value).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "offset exceeds the platform's file offset range",
        )
    })
}

pub(super) fn access(path: PathBuf, mode: i32, cb: Errback<io::Error>) {
    dispatch("access", move || {
        let outcome = cstring(&path).and_then(|c| os_unit(unsafe { libc::access(c.as_ptr(), mode) }));
        cb.call(outcome.err());
    });
}

pub(super) fn append_file(path: PathBuf, data: Vec<u8>, cb: Errback<io::Error>) {
    dispatch("append_file", move || {
        let outcome = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&path)
            .and_then(|mut file| file.write_all(&data));
        cb.call(outcome.err());
    });
}

pub(super) fn chmod(path: PathBuf, mode: u32, cb: Errback<io::Error>) {
    dispatch("chmod", move || {
        cb.call(std::fs::set_permissions(&path, PermissionsExt::from_mode(mode)).err());
    });
}

pub(super) fn chown(path: PathBuf, uid: u32, gid: u32, cb: Errback<io::Error>) {
    dispatch("chown", move || {
        let outcome = cstring(&path).and_then(|c| {
            os_unit(unsafe { libc::chown(c.as_ptr(), uid as libc::uid_t, gid as libc::gid_t) })
        });
        cb.call(outcome.err());
    });
}

pub(super) fn close(fd: Fd, cb: Errback<io::Error>) {
    dispatch("close", move || {
        cb.call(os_unit(unsafe { libc::close(fd.0) }).err());
    });
}

pub(super) fn copy_file(src: PathBuf, dest: PathBuf, cb: Errback<io::Error>) {
    dispatch("copy_file", move || {
        cb.call(std::fs::copy(&src, &dest).map(|_| ()).err());
    });
}

pub(super) fn fchmod(fd: Fd, mode: u32, cb: Errback<io::Error>) {
    dispatch("fchmod", move || {
        cb.call(os_unit(unsafe { libc::fchmod(fd.0, mode as libc::mode_t) }).err());
    });
}

pub(super) fn fchown(fd: Fd, uid: u32, gid: u32, cb: Errback<io::Error>) {
    dispatch("fchown", move || {
        cb.call(
            os_unit(unsafe { libc::fchown(fd.0, uid as libc::uid_t, gid as libc::gid_t) }).err(),
        );
    });
}

pub(super) fn fdatasync(fd: Fd, cb: Errback<io::Error>) {
    dispatch("fdatasync", move || {
        cb.call(os_unit(unsafe { libc::fdatasync(fd.0) }).err());
    });
}

pub(super) fn fstat(fd: Fd, cb: ErrbackVal<std::fs::Metadata, io::Error>) {
    dispatch("fstat", move || {
        complete(cb, borrowed_file(fd).metadata());
    });
}

pub(super) fn fsync(fd: Fd, cb: Errback<io::Error>) {
    dispatch("fsync", move || {
        cb.call(os_unit(unsafe { libc::fsync(fd.0) }).err());
    });
}

pub(super) fn ftruncate(fd: Fd, len: u64, cb: Errback<io::Error>) {
    dispatch("ftruncate", move || {
        let outcome =
            file_offset(len).and_then(|len| os_unit(unsafe { libc::ftruncate(fd.0, len) }));
        cb.call(outcome.err());
    });
}

pub(super) fn futimes(fd: Fd, atime: SystemTime, mtime: SystemTime, cb: Errback<io::Error>) {
    dispatch("futimes", move || {
        let outcome = filetime::set_file_handle_times(
            &borrowed_file(fd),
            Some(FileTime::from_system_time(atime)),
            Some(FileTime::from_system_time(mtime)),
        );
        cb.call(outcome.err());
    });
}

pub(super) fn lchown(path: PathBuf, uid: u32, gid: u32, cb: Errback<io::Error>) {
    dispatch("lchown", move || {
        let outcome = cstring(&path).and_then(|c| {
            os_unit(unsafe { libc::lchown(c.as_ptr(), uid as libc::uid_t, gid as libc::gid_t) })
        });
        cb.call(outcome.err());
    });
}

pub(super) fn link(existing: PathBuf, new: PathBuf, cb: Errback<io::Error>) {
    dispatch("link", move || {
        cb.call(std::fs::hard_link(&existing, &new).err());
    });
}

pub(super) fn mkdir(path: PathBuf, mode: u32, cb: Errback<io::Error>) {
    dispatch("mkdir", move || {
        cb.call(DirBuilder::new().mode(mode).create(&path).err());
    });
}

pub(super) fn mkdtemp(prefix: PathBuf, cb: ErrbackVal<PathBuf, io::Error>) {
    dispatch("mkdtemp", move || {
        let result = cstring(&prefix).and_then(|c| {
            // mkdtemp(3) rewrites the six trailing X placeholders in place.
            let mut template = c.into_bytes();
            template.extend_from_slice(b"XXXXXX\0");
            let ptr = unsafe { libc::mkdtemp(template.as_mut_ptr().cast()) };
            if ptr.is_null() {
                Err(io::Error::last_os_error())
            } else {
                template.pop();
                Ok(PathBuf::from(OsString::from_vec(template)))
            }
        });
        complete(cb, result);
    });
}

pub(super) fn open(path: PathBuf, flags: i32, mode: u32, cb: ErrbackVal<Fd, io::Error>) {
    dispatch("open", move || {
        let result = cstring(&path).and_then(|c| {
            let fd = unsafe { libc::open(c.as_ptr(), flags, mode as libc::c_uint) };
            if fd < 0 {
                Err(io::Error::last_os_error())
            } else {
                Ok(Fd(fd))
            }
        });
        complete(cb, result);
    });
}

pub(super) fn read_dir(path: PathBuf, cb: ErrbackVal<Vec<OsString>, io::Error>) {
    dispatch("read_dir", move || {
        let result = std::fs::read_dir(&path).and_then(|entries| {
            entries
                .map(|entry| entry.map(|e| e.file_name()))
                .collect::<io::Result<Vec<OsString>>>()
        });
        complete(cb, result);
    });
}

pub(super) fn read_file(path: PathBuf, cb: ErrbackVal<Vec<u8>, io::Error>) {
    dispatch("read_file", move || complete(cb, std::fs::read(&path)));
}

pub(super) fn read_link(path: PathBuf, cb: ErrbackVal<PathBuf, io::Error>) {
    dispatch("read_link", move || complete(cb, std::fs::read_link(&path)));
}

pub(super) fn read_to_string(path: PathBuf, cb: ErrbackVal<String, io::Error>) {
    dispatch("read_to_string", move || {
        complete(cb, std::fs::read_to_string(&path));
    });
}

pub(super) fn realpath(path: PathBuf, cb: ErrbackVal<PathBuf, io::Error>) {
    dispatch("realpath", move || complete(cb, std::fs::canonicalize(&path)));
}

pub(super) fn rename(from: PathBuf, to: PathBuf, cb: Errback<io::Error>) {
    dispatch("rename", move || {
        cb.call(std::fs::rename(&from, &to).err());
    });
}

pub(super) fn rmdir(path: PathBuf, cb: Errback<io::Error>) {
    dispatch("rmdir", move || {
        cb.call(std::fs::remove_dir(&path).err());
    });
}

pub(super) fn stat(path: PathBuf, cb: ErrbackVal<std::fs::Metadata, io::Error>) {
    dispatch("stat", move || complete(cb, std::fs::metadata(&path)));
}

pub(super) fn lstat(path: PathBuf, cb: ErrbackVal<std::fs::Metadata, io::Error>) {
    dispatch("lstat", move || complete(cb, std::fs::symlink_metadata(&path)));
}

pub(super) fn symlink(target: PathBuf, link: PathBuf, cb: Errback<io::Error>) {
    dispatch("symlink", move || {
        cb.call(std::os::unix::fs::symlink(&target, &link).err());
    });
}

pub(super) fn truncate(path: PathBuf, len: u64, cb: Errback<io::Error>) {
    dispatch("truncate", move || {
        let outcome = OpenOptions::new()
            .write(true)
            .open(&path)
            .and_then(|file| file.set_len(len));
        cb.call(outcome.err());
    });
}

pub(super) fn unlink(path: PathBuf, cb: Errback<io::Error>) {
    dispatch("unlink", move || {
        cb.call(std::fs::remove_file(&path).err());
    });
}

pub(super) fn utimes(path: PathBuf, atime: SystemTime, mtime: SystemTime, cb: Errback<io::Error>) {
    dispatch("utimes", move || {
        let outcome = filetime::set_file_times(
            &path,
            FileTime::from_system_time(atime),
            FileTime::from_system_time(mtime),
        );
        cb.call(outcome.err());
    });
}

pub(super) fn write_file(path: PathBuf, data: Vec<u8>, cb: Errback<io::Error>) {
    dispatch("write_file", move || {
        cb.call(std::fs::write(&path, &data).err());
    });
}

/// Reads up to `length` bytes into `buffer[offset..offset + length]`,
/// calling back with the byte count and the buffer itself.
///
/// `position` selects `pread` at that file offset; `None` reads from the
/// descriptor's current position.
pub(super) fn read(
    fd: Fd,
    mut buffer: Vec<u8>,
    offset: usize,
    length: usize,
    position: Option<u64>,
    cb: ReadErrback<Vec<u8>, io::Error>,
) {
    dispatch("read", move || {
        match transfer_window(&buffer, offset, length)
            .and_then(|(start, end)| read_sync(fd, &mut buffer[start..end], position))
        {
            Ok(bytes_read) => cb.call(None, Some(bytes_read), Some(buffer)),
            Err(error) => cb.call(Some(error), None, None),
        }
    });
}

/// Writes `buffer[offset..offset + length]`, calling back with the byte
/// count and the buffer itself.
pub(super) fn write(
    fd: Fd,
    buffer: Vec<u8>,
    offset: usize,
    length: usize,
    position: Option<u64>,
    cb: WriteErrback<Vec<u8>, io::Error>,
) {
    dispatch("write", move || {
        match transfer_window(&buffer, offset, length)
            .and_then(|(start, end)| write_sync(fd, &buffer[start..end], position))
        {
            Ok(written) => cb.call(None, Some(written), Some(buffer)),
            Err(error) => cb.call(Some(error), None, None),
        }
    });
}

/// Writes the bytes of `data`, calling back with the byte count and the
/// string itself.
pub(super) fn write_str(
    fd: Fd,
    data: String,
    position: Option<u64>,
    cb: WriteErrback<String, io::Error>,
) {
    dispatch("write_str", move || {
        match write_sync(fd, data.as_bytes(), position) {
            Ok(written) => cb.call(None, Some(written), Some(data)),
            Err(error) => cb.call(Some(error), None, None),
        }
    });
}

/// Validate that `offset..offset + length` lies within `buffer`.
fn transfer_window(buffer: &[u8], offset: usize, length: usize) -> io::Result<(usize, usize)> {
    offset
        .checked_add(length)
        .filter(|&end| end <= buffer.len())
        .map(|end| (offset, end))
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "transfer window exceeds buffer bounds",
            )
        })
}

fn read_sync(fd: Fd, window: &mut [u8], position: Option<u64>) -> io::Result<u64> {
    let rc = match position {
        Some(pos) => {
            let pos = file_offset(pos)?;
            unsafe { libc::pread(fd.0, window.as_mut_ptr().cast(), window.len(), pos) }
        }
        None => unsafe { libc::read(fd.0, window.as_mut_ptr().cast(), window.len()) },
    };
    if rc < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(rc as u64)
    }
}

fn write_sync(fd: Fd, window: &[u8], position: Option<u64>) -> io::Result<u64> {
    let rc = match position {
        Some(pos) => {
            let pos = file_offset(pos)?;
            unsafe { libc::pwrite(fd.0, window.as_ptr().cast(), window.len(), pos) }
        }
        None => unsafe { libc::write(fd.0, window.as_ptr().cast(), window.len()) },
    };
    if rc < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(rc as u64)
    }
}
