//! Task-returning filesystem operations (Unix)
//!
//! Every public function here is a bound operation: the result of applying
//! [`lift`](crate::lift) to one operation of the callback-style native
//! layer. Calling one captures its arguments and returns a lazy
//! [`Task`]; forking the task dispatches the native call to a worker thread
//! and settles when the error-first callback fires. Errors are
//! [`std::io::Error`] values passed through exactly as the native layer
//! produced them.
//!
//! # Binding table
//!
//! The bindings are generated by the `fs_ops!` table below: one entry per
//! operation naming its leading arguments and success type, nothing else.
//! Native operations with several documented argument shapes get one binding
//! per shape ([`read_file`] returns bytes, [`read_to_string`] is its
//! text-decoding sibling; [`rw::write`] takes a buffer, [`rw::write_str`] a
//! string).
//!
//! The two operations whose completion reports a transfer count *and* an
//! echoed buffer do not fit the generic lifter and live in [`rw`] as manual
//! adapters.

mod native;
pub mod rw;

pub use rw::{read, write, write_str, BytesRead, Written};

use crate::lift::lift;
use crate::task::Task;
use std::ffi::OsString;
use std::io;
use std::os::fd::{AsRawFd, RawFd};
use std::path::PathBuf;
use std::time::SystemTime;

/// A raw file descriptor obtained from [`open`].
///
/// Plain-value handle, not an owning guard: the descriptor is released only
/// by an explicit [`close`] call, mirroring the native layer it wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fd(pub(crate) RawFd);

impl AsRawFd for Fd {
    fn as_raw_fd(&self) -> RawFd {
        self.0
    }
}

macro_rules! fs_ops {
    ($(
        $(#[$doc:meta])*
        $name:ident ( $($arg:ident : $ty:ty),* $(,)? ) -> $value:ty;
    )+) => {$(
        $(#[$doc])*
        pub fn $name($($arg: $ty),*) -> Task<$value, io::Error> {
            lift(native::$name).call($($arg.into()),*)
        }
    )+};
}

fs_ops! {
    /// Tests the caller's permissions for the file at `path`.
    ///
    /// `mode` is a bitmask of `libc::F_OK`, `R_OK`, `W_OK` and `X_OK`.
    /// Succeeds with `()` when every requested permission is granted.
    access(path: impl Into<PathBuf>, mode: i32) -> ();

    /// Appends `data` to the file at `path`, creating the file if it does
    /// not exist.
    append_file(path: impl Into<PathBuf>, data: impl Into<Vec<u8>>) -> ();

    /// Changes the permission bits of the file at `path` to `mode`.
    chmod(path: impl Into<PathBuf>, mode: u32) -> ();

    /// Changes the owner and group of the file at `path`.
    chown(path: impl Into<PathBuf>, uid: u32, gid: u32) -> ();

    /// Closes a file descriptor obtained from [`open`].
    close(fd: Fd) -> ();

    /// Copies `src` to `dest`, overwriting `dest` if it exists.
    copy_file(src: impl Into<PathBuf>, dest: impl Into<PathBuf>) -> ();

    /// Changes the permission bits of the open file behind `fd` to `mode`.
    fchmod(fd: Fd, mode: u32) -> ();

    /// Changes the owner and group of the open file behind `fd`.
    fchown(fd: Fd, uid: u32, gid: u32) -> ();

    /// Flushes the data (but not necessarily the metadata) of the file
    /// behind `fd` to stable storage.
    fdatasync(fd: Fd) -> ();

    /// Retrieves metadata for the open file behind `fd`.
    fstat(fd: Fd) -> std::fs::Metadata;

    /// Flushes the file behind `fd`, data and metadata, to stable storage.
    fsync(fd: Fd) -> ();

    /// Truncates or extends the file behind `fd` to exactly `len` bytes.
    ftruncate(fd: Fd, len: u64) -> ();

    /// Sets the access and modification timestamps of the open file behind
    /// `fd`.
    futimes(fd: Fd, atime: SystemTime, mtime: SystemTime) -> ();

    /// Changes the owner and group of the symlink or file at `path` itself,
    /// never following a trailing symlink.
    lchown(path: impl Into<PathBuf>, uid: u32, gid: u32) -> ();

    /// Creates a hard link at `new` pointing to the same inode as `existing`.
    link(existing: impl Into<PathBuf>, new: impl Into<PathBuf>) -> ();

    /// Retrieves metadata for the file at `path` without following a
    /// trailing symlink.
    lstat(path: impl Into<PathBuf>) -> std::fs::Metadata;

    /// Creates a directory at `path` with the given permission bits.
    mkdir(path: impl Into<PathBuf>, mode: u32) -> ();

    /// Creates a uniquely named directory whose path begins with `prefix`
    /// and succeeds with the created path.
    mkdtemp(prefix: impl Into<PathBuf>) -> PathBuf;

    /// Opens the file at `path` and succeeds with its descriptor.
    ///
    /// `flags` is a bitmask of `libc::O_*` constants; `mode` supplies the
    /// permission bits when the call creates the file (`O_CREAT`).
    open(path: impl Into<PathBuf>, flags: i32, mode: u32) -> Fd;

    /// Lists the entry names of the directory at `path`.
    ///
    /// Names only, in directory order; `.` and `..` are not included.
    read_dir(path: impl Into<PathBuf>) -> Vec<OsString>;

    /// Reads the entire contents of the file at `path` as raw bytes.
    read_file(path: impl Into<PathBuf>) -> Vec<u8>;

    /// Reads the target of the symbolic link at `path`.
    read_link(path: impl Into<PathBuf>) -> PathBuf;

    /// Reads the entire contents of the file at `path` as UTF-8 text.
    ///
    /// The text-decoding sibling of [`read_file`]; fails with
    /// [`io::ErrorKind::InvalidData`] if the contents are not valid UTF-8.
    read_to_string(path: impl Into<PathBuf>) -> String;

    /// Resolves `path` to an absolute path with all symlinks, `.` and `..`
    /// components removed.
    realpath(path: impl Into<PathBuf>) -> PathBuf;

    /// Renames `from` to `to`, replacing `to` if it exists.
    rename(from: impl Into<PathBuf>, to: impl Into<PathBuf>) -> ();

    /// Removes the empty directory at `path`.
    rmdir(path: impl Into<PathBuf>) -> ();

    /// Retrieves metadata for the file at `path`, following symlinks.
    stat(path: impl Into<PathBuf>) -> std::fs::Metadata;

    /// Creates a symbolic link at `link` pointing at `target`.
    symlink(target: impl Into<PathBuf>, link: impl Into<PathBuf>) -> ();

    /// Truncates or extends the file at `path` to exactly `len` bytes.
    truncate(path: impl Into<PathBuf>, len: u64) -> ();

    /// Removes the file at `path`.
    unlink(path: impl Into<PathBuf>) -> ();

    /// Sets the access and modification timestamps of the file at `path`.
    utimes(path: impl Into<PathBuf>, atime: SystemTime, mtime: SystemTime) -> ();

    /// Writes `data` to the file at `path`, creating it if needed and
    /// truncating it otherwise.
    write_file(path: impl Into<PathBuf>, data: impl Into<Vec<u8>>) -> ();
}
