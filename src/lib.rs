//! # task-fs
//!
//! Lazy [`Task`] adapters for asynchronous operations that follow the
//! error-first callback convention, plus a Task-returning filesystem surface
//! built on them.
//!
//! The core is [`lift`]: given a native operation shaped
//! `(arg1, .., argN, callback)` whose trailing callback is error-first, it
//! produces a bound operation with the same leading arguments that returns a
//! [`Task`] instead of taking a callback. The task is lazy (nothing runs
//! until it is forked), settles exactly once per fork, and keeps the
//! operation's success and error types statically distinguishable.
//!
//! ## Lifting a callback operation
//!
//! ```
//! use task_fs::{lift, ErrbackVal};
//!
//! fn parse_decimal(input: String, cb: ErrbackVal<i64, String>) {
//!     match input.trim().parse() {
//!         Ok(n) => cb.call(None, Some(n)),
//!         Err(e) => cb.call(Some(e.to_string()), None),
//!     }
//! }
//!
//! let parse = lift(parse_decimal);
//! parse.call(" 42 ".into()).fork(
//!     |err| panic!("unexpected failure: {err}"),
//!     |n| assert_eq!(n, 42),
//! );
//! ```
//!
//! ## Filesystem operations
//!
//! The [`fs`] module (Unix only) applies the lifter to a callback-style
//! native filesystem layer, one bound operation per native operation:
//!
//! ```no_run
//! use std::sync::mpsc;
//!
//! let (tx, rx) = mpsc::channel();
//! let err_tx = tx.clone();
//! task_fs::fs::read_file("Cargo.toml").fork(
//!     move |err| { err_tx.send(Err(err)).ok(); },
//!     move |data| { tx.send(Ok(data)).ok(); },
//! );
//! let contents = rx.recv().unwrap().unwrap();
//! assert!(!contents.is_empty());
//! ```
//!
//! ## What this crate does not do
//!
//! No retry, no caching, no pooling, no scheduling, no timeouts, no
//! cancellation. Forking a task performs exactly one native call; composing
//! richer behavior on top is the caller's business.

pub mod errback;
pub mod lift;
pub mod task;

#[cfg(unix)]
pub mod fs;

pub use errback::{Errback, ErrbackVal};
pub use lift::{lift, Bound, ErrbackFn};
pub use task::{Settlement, Task};
