//! Manual adapters for the dual-result operations `read` and `write`
//!
//! These two operations complete with *two* trailing values, the number of
//! bytes transferred and the buffer (or string) involved, so the generic
//! lifter cannot tell which one is "the" success value. Each gets a bespoke
//! adapter: the same append-callback, invoke, branch-on-error algorithm (the
//! branch itself is the shared [`settle`](crate::errback) routine), with the
//! one difference that the success value packages both trailing values into
//! a named record.
//!
//! The buffer handed in is moved to the worker, filled or drained there, and
//! moved back out through the record, so it comes back pointer-identical;
//! nothing is copied or reallocated on the way through.

use super::native;
use super::Fd;
use crate::errback::settle;
use crate::task::{Settlement, Task};
use std::io;

/// Success value of [`read`]: how much was read, and the buffer it was read
/// into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BytesRead<B> {
    /// Number of bytes placed into `buffer`; `0` at end of file.
    pub bytes_read: u64,
    /// The buffer passed to [`read`], returned with the fresh bytes in place.
    pub buffer: B,
}

/// Success value of [`write`] and [`write_str`]: how much was written, and
/// the data it was written from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Written<T> {
    /// Number of bytes the descriptor accepted; may be short of the window.
    pub written: u64,
    /// The buffer or string passed in, returned unchanged.
    pub value: T,
}

/// Synthesized callback for [`read`]: error-first, then the byte count and
/// the echoed buffer.
pub struct ReadErrback<B, E> {
    settlement: Settlement<BytesRead<B>, E>,
}

impl<B, E> ReadErrback<B, E> {
    pub(crate) fn new(settlement: Settlement<BytesRead<B>, E>) -> Self {
        Self { settlement }
    }

    /// Complete the read. The error slot decides the channel exactly as in
    /// the generic adapter; on success both trailing values are required and
    /// are packaged into one [`BytesRead`] record.
    pub fn call(self, error: Option<E>, bytes_read: Option<u64>, buffer: Option<B>) {
        let value = bytes_read
            .zip(buffer)
            .map(|(bytes_read, buffer)| BytesRead { bytes_read, buffer });
        settle(self.settlement, error, value);
    }
}

/// Synthesized callback for [`write`] and [`write_str`]: error-first, then
/// the byte count and the echoed data.
pub struct WriteErrback<T, E> {
    settlement: Settlement<Written<T>, E>,
}

impl<T, E> WriteErrback<T, E> {
    pub(crate) fn new(settlement: Settlement<Written<T>, E>) -> Self {
        Self { settlement }
    }

    /// Complete the write; see [`ReadErrback::call`] for the channel rules.
    pub fn call(self, error: Option<E>, written: Option<u64>, value: Option<T>) {
        let outcome = written
            .zip(value)
            .map(|(written, value)| Written { written, value });
        settle(self.settlement, error, outcome);
    }
}

/// Reads up to `length` bytes from `fd` into `buffer[offset..offset + length]`.
///
/// `position` reads at that absolute file offset without moving the
/// descriptor's cursor; `None` reads from (and advances) the current
/// position. Succeeds with a [`BytesRead`] carrying the byte count and the
/// buffer itself.
///
/// # Errors
///
/// The task fails with the unmodified [`io::Error`] from the native layer,
/// including [`io::ErrorKind::InvalidInput`] when the requested window does
/// not fit inside `buffer`.
pub fn read(
    fd: Fd,
    buffer: Vec<u8>,
    offset: usize,
    length: usize,
    position: Option<u64>,
) -> Task<BytesRead<Vec<u8>>, io::Error> {
    Task::new(move |settlement| {
        native::read(fd, buffer, offset, length, position, ReadErrback::new(settlement));
    })
}

/// Writes `buffer[offset..offset + length]` to `fd`.
///
/// `position` writes at that absolute file offset without moving the
/// descriptor's cursor; `None` writes at (and advances) the current
/// position. Succeeds with a [`Written`] carrying the byte count and the
/// buffer itself; the count may be short of the window.
///
/// # Errors
///
/// The task fails with the unmodified [`io::Error`] from the native layer,
/// including [`io::ErrorKind::InvalidInput`] when the requested window does
/// not fit inside `buffer`.
pub fn write(
    fd: Fd,
    buffer: Vec<u8>,
    offset: usize,
    length: usize,
    position: Option<u64>,
) -> Task<Written<Vec<u8>>, io::Error> {
    Task::new(move |settlement| {
        native::write(fd, buffer, offset, length, position, WriteErrback::new(settlement));
    })
}

/// Writes the bytes of `data` to `fd`; the string sibling of [`write`].
///
/// Succeeds with a [`Written`] echoing the string back alongside the byte
/// count.
pub fn write_str(
    fd: Fd,
    data: impl Into<String>,
    position: Option<u64>,
) -> Task<Written<String>, io::Error> {
    let data = data.into();
    Task::new(move |settlement| {
        native::write_str(fd, data, position, WriteErrback::new(settlement));
    })
}
