//! Synthesized error-first callbacks and the uniform settlement routine
//!
//! Native operations signal completion through an error-first callback: the
//! first slot carries the error on failure and is empty on success, and the
//! error slot alone decides which channel fires. The two types here are the
//! concrete callback values this crate synthesizes and appends to a native
//! call:
//!
//! - [`Errback<E>`] for operations that report no value (success is `()`),
//! - [`ErrbackVal<T, E>`] for operations that report one trailing value.
//!
//! Both funnel into a single settlement routine, shared with the manual
//! dual-result adapters in [`crate::fs::rw`], so the branch on the error slot
//! exists in exactly one place; adapters differ only in how they build the
//! success value.
//!
//! Each callback consumes `self` on invocation. A native operation therefore
//! cannot invoke its callback twice; the second call is a type error at the
//! native layer rather than a runtime no-op.

use crate::task::Settlement;
use tracing::warn;

/// Synthesized callback for native operations whose completion carries no
/// value: invoked with `Some(error)` on failure, `None` on success.
pub struct Errback<E> {
    settlement: Settlement<(), E>,
}

impl<E> Errback<E> {
    /// Wrap a settlement handle into an error-only callback.
    ///
    /// [`lift`](crate::lift) does this internally; it is public for manual
    /// adapters over operations the generic lifter cannot express.
    pub fn new(settlement: Settlement<(), E>) -> Self {
        Self { settlement }
    }

    /// Complete the operation. `Some(error)` fires the failure channel with
    /// that error; `None` fires the success channel with `()`.
    pub fn call(self, error: Option<E>) {
        settle(self.settlement, error, Some(()));
    }
}

/// Synthesized callback for native operations whose completion carries one
/// trailing value beyond the error slot.
pub struct ErrbackVal<T, E> {
    settlement: Settlement<T, E>,
}

impl<T, E> ErrbackVal<T, E> {
    /// Wrap a settlement handle into an error-plus-value callback.
    ///
    /// Public for the same reason as [`Errback::new`].
    pub fn new(settlement: Settlement<T, E>) -> Self {
        Self { settlement }
    }

    /// Complete the operation.
    ///
    /// The error slot is the single source of truth: `Some(error)` fires the
    /// failure channel and `value` is ignored; `(None, Some(value))` fires
    /// the success channel with `value`, moved through untouched.
    ///
    /// `(None, None)` is a native-contract violation (success signalled with
    /// no value to succeed with); the settlement is dropped and the task
    /// stays pending.
    pub fn call(self, error: Option<E>, value: Option<T>) {
        settle(self.settlement, error, value);
    }
}

/// The one shared settlement step: branch on the error slot, then deliver.
///
/// `value` is what the success channel would receive; adapters that package
/// several trailing callback arguments into a composite success value build
/// it before calling in.
pub(crate) fn settle<T, E>(settlement: Settlement<T, E>, error: Option<E>, value: Option<T>) {
    match (error, value) {
        (Some(error), _) => settlement.reject(error),
        (None, Some(value)) => settlement.resolve(value),
        (None, None) => {
            warn!("native operation signalled success without a value; task left pending");
            drop(settlement);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Task;
    use std::sync::mpsc;

    #[test]
    fn errback_resolves_unit_when_the_error_slot_is_empty() {
        let (tx, rx) = mpsc::channel();
        let task: Task<(), String> = Task::new(|s| Errback::new(s).call(None));
        task.fork(|_| {}, move |()| tx.send(()).unwrap());
        rx.recv().unwrap();
    }

    #[test]
    fn errback_rejects_with_the_supplied_error() {
        let (tx, rx) = mpsc::channel();
        let task: Task<(), String> = Task::new(|s| Errback::new(s).call(Some("EPERM".into())));
        task.fork(move |error| tx.send(error).unwrap(), |()| {});
        assert_eq!(rx.recv().unwrap(), "EPERM");
    }

    #[test]
    fn an_occupied_error_slot_wins_over_a_present_value() {
        let (tx, rx) = mpsc::channel();
        let task: Task<u32, String> =
            Task::new(|s| ErrbackVal::new(s).call(Some("EIO".into()), Some(9)));
        task.fork(move |error| tx.send(error).unwrap(), |_| panic!("success channel fired"));
        assert_eq!(rx.recv().unwrap(), "EIO");
    }

    #[test]
    fn success_without_a_value_settles_nothing() {
        let task: Task<u32, String> = Task::new(|s| ErrbackVal::new(s).call(None, None));
        task.fork(
            |_| panic!("failure channel fired"),
            |_| panic!("success channel fired"),
        );
    }
}
