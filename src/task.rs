//! Lazy deferred computations with separate success and failure channels
//!
//! A [`Task`] represents the eventual outcome of a single asynchronous
//! operation. Unlike a future, it carries no polling machinery: nothing
//! happens when a `Task` is constructed, and the one side effect it wraps
//! runs only when the task is forked. Forking consumes the task, so
//! "fork-once per instance" is enforced by ownership; re-running the effect
//! means constructing a fresh task.
//!
//! # Lifecycle
//!
//! `Unforked -> Pending -> {Succeeded | Failed}`
//!
//! - `Unforked -> Pending` happens on [`Task::fork`], which runs the wrapped
//!   computation exactly once and returns immediately.
//! - The terminal transition happens when the computation settles the task
//!   through its [`Settlement`] handle, possibly from another thread.
//! - The two terminal states are mutually exclusive; there is no transition
//!   back to `Pending` and no retry at this layer.
//! - A computation that never settles leaves the task pending forever. That
//!   is the computation's contract to uphold, not this type's.

use tracing::trace;

/// A lazy, single-result deferred computation.
///
/// Constructing a `Task` performs no side effect; the wrapped computation
/// runs only when [`fork`](Task::fork) is called. Exactly one of the two
/// channels fires, at most once, per fork.
pub struct Task<T, E> {
    /// The deferred side effect, handed the settlement handle on fork.
    computation: Box<dyn FnOnce(Settlement<T, E>)>,
}

impl<T, E> Task<T, E> {
    /// Wrap a computation into a lazy task.
    ///
    /// The computation receives the [`Settlement`] handle for the fork and
    /// must eventually consume it through [`Settlement::resolve`] or
    /// [`Settlement::reject`]. It is free to move the handle to another
    /// thread and settle later; dropping it unsettled leaves the task
    /// pending forever.
    ///
    /// # Example
    ///
    /// ```
    /// use task_fs::Task;
    ///
    /// let task: Task<u32, String> = Task::new(|settlement| settlement.resolve(7));
    /// task.fork(
    ///     |err| panic!("unexpected failure: {err}"),
    ///     |value| assert_eq!(value, 7),
    /// );
    /// ```
    pub fn new(computation: impl FnOnce(Settlement<T, E>) + 'static) -> Self {
        Self {
            computation: Box::new(computation),
        }
    }

    /// Run the wrapped computation and subscribe to its outcome.
    ///
    /// Returns as soon as the computation has been started; the handlers are
    /// invoked whenever the computation settles, which may be on a worker
    /// thread (hence the `Send + 'static` bounds). Exactly one handler runs,
    /// at most once.
    ///
    /// Forking does not support cancellation: once started, the underlying
    /// operation runs to completion on its own schedule.
    pub fn fork<FE, FT>(self, on_failure: FE, on_success: FT)
    where
        FE: FnOnce(E) + Send + 'static,
        FT: FnOnce(T) + Send + 'static,
    {
        (self.computation)(Settlement {
            on_success: Box::new(on_success),
            on_failure: Box::new(on_failure),
        });
    }
}

/// The one-shot handle a computation uses to settle its [`Task`].
///
/// Both methods consume the handle, so a settlement can land on at most one
/// channel, at most once; this is a compile-time property rather than a
/// runtime check. Dropping the handle without calling either method leaves
/// the task pending forever.
pub struct Settlement<T, E> {
    /// Success-channel handler installed by [`Task::fork`].
    on_success: Box<dyn FnOnce(T) + Send>,
    /// Failure-channel handler installed by [`Task::fork`].
    on_failure: Box<dyn FnOnce(E) + Send>,
}

impl<T, E> Settlement<T, E> {
    /// Fire the success channel with `value`.
    pub fn resolve(self, value: T) {
        trace!(channel = "success", "task settled");
        (self.on_success)(value);
    }

    /// Fire the failure channel with `error`.
    ///
    /// The error is delivered exactly as supplied; no wrapping or
    /// classification happens here or anywhere else in this crate.
    pub fn reject(self, error: E) {
        trace!(channel = "failure", "task settled");
        (self.on_failure)(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::sync::Arc;

    #[test]
    fn construction_does_not_run_the_computation() {
        let runs = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&runs);
        let task: Task<(), ()> = Task::new(move |settlement| {
            seen.fetch_add(1, Ordering::SeqCst);
            settlement.resolve(());
        });
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        task.fork(|()| {}, |()| {});
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn fork_delivers_a_resolution_to_the_success_handler() {
        let (tx, rx) = mpsc::channel();
        let task: Task<u32, String> = Task::new(|settlement| settlement.resolve(42));
        task.fork(|_| {}, move |value| tx.send(value).unwrap());
        assert_eq!(rx.recv().unwrap(), 42);
    }

    #[test]
    fn fork_delivers_a_rejection_to_the_failure_handler() {
        let (tx, rx) = mpsc::channel();
        let task: Task<u32, String> = Task::new(|settlement| settlement.reject("boom".into()));
        task.fork(move |error| tx.send(error).unwrap(), |_| {});
        assert_eq!(rx.recv().unwrap(), "boom");
    }

    #[test]
    fn settlement_can_cross_threads() {
        let (tx, rx) = mpsc::channel();
        let task: Task<u32, String> = Task::new(|settlement| {
            std::thread::spawn(move || settlement.resolve(5));
        });
        task.fork(|_| {}, move |value| tx.send(value).unwrap());
        assert_eq!(rx.recv().unwrap(), 5);
    }

    #[test]
    fn dropping_the_settlement_leaves_the_task_pending() {
        let task: Task<u32, String> = Task::new(drop);
        // Neither handler may fire; reaching the end of the test is the assertion.
        task.fork(|_| panic!("failure channel fired"), |_| panic!("success channel fired"));
    }
}
