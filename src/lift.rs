//! Lifting error-first callback operations into lazy [`Task`]s
//!
//! A native operation has the shape `(arg1, .., argN, callback)` where the
//! trailing callback is error-first. [`lift`] turns such an operation into a
//! [`Bound`] operation: same leading arguments, no callback, returning a
//! `Task` whose success and error types are the ones the callback would have
//! delivered.
//!
//! # Arity resolution
//!
//! The split point between "arguments the caller supplies" and "the trailing
//! callback" is resolved at the type level by [`ErrbackFn`]. Its `Sig`
//! parameter is the native operation's full argument tuple; the impls below
//! are generated for every leading arity from 0 through 6, crossed with the
//! two callback shapes ([`Errback`] and [`ErrbackVal`]). A function item or
//! closure implements exactly one `Fn` signature, so exactly one impl
//! matches and `Sig` is inferred at the `lift` call site.
//!
//! Seven or more leading arguments have no impl: the ceiling is a hard
//! compile-time rejection, not a silent fallback. Operations beyond it (or
//! with callback shapes the resolver does not enumerate, such as the
//! dual-result completions of [`crate::fs::rw`]) need a manual adapter built
//! directly from [`Task::new`] and a [`Settlement`]-wrapping callback.
//!
//! ```compile_fail
//! use task_fs::{lift, Errback};
//!
//! // Seven leading arguments: past the ceiling, rejected at compile time.
//! fn seven(_: u8, _: u8, _: u8, _: u8, _: u8, _: u8, _: u8, cb: Errback<String>) {
//!     cb.call(None);
//! }
//!
//! lift(seven);
//! ```

use crate::errback::{Errback, ErrbackVal};
use crate::task::{Settlement, Task};
use std::marker::PhantomData;

/// A native operation whose trailing argument is an error-first callback.
///
/// `Sig` is the operation's full argument tuple, callback included; the
/// associated types carry what the type-level resolution derived from it.
/// Implemented for functions and closures with 0 to 6 leading arguments
/// followed by an [`Errback`] or [`ErrbackVal`] parameter.
pub trait ErrbackFn<Sig> {
    /// The leading arguments, as a tuple.
    type Args;
    /// The success type the callback would have delivered (`()` for
    /// error-only callbacks).
    type Value;
    /// The error type the callback would have delivered.
    type Error;

    /// Invoke the native operation with `args` plus a callback synthesized
    /// around `settlement`.
    fn invoke(self, args: Self::Args, settlement: Settlement<Self::Value, Self::Error>);
}

/// Lift a native error-first callback operation into a [`Bound`] operation.
///
/// The bound operation has the native operation's leading arguments and
/// returns a [`Task`] instead of taking a callback. Nothing runs at lift
/// time, nor when the bound operation is called: the native operation is
/// invoked only when the returned task is forked, once per fork.
///
/// # Example
///
/// ```
/// use task_fs::{lift, ErrbackVal};
///
/// fn double(n: i32, cb: ErrbackVal<i32, String>) {
///     cb.call(None, Some(n * 2));
/// }
///
/// let double = lift(double);
/// double.call(21).fork(
///     |err| panic!("unexpected failure: {err}"),
///     |n| assert_eq!(n, 42),
/// );
/// ```
pub fn lift<F, Sig>(native: F) -> Bound<F, Sig>
where
    F: ErrbackFn<Sig>,
{
    Bound {
        native,
        _sig: PhantomData,
    }
}

/// The product of [`lift`]ing one native operation.
///
/// Stateless and reusable: every `call` captures its own arguments into a
/// fresh [`Task`], and concurrent calls are fully independent. The
/// arity-specific `call` methods are generated together with the
/// [`ErrbackFn`] impls; [`apply`](Bound::apply) is the tuple-argument form
/// they all delegate to.
pub struct Bound<F, Sig> {
    native: F,
    _sig: PhantomData<fn(Sig)>,
}

impl<F: Clone, Sig> Clone for Bound<F, Sig> {
    fn clone(&self) -> Self {
        Self {
            native: self.native.clone(),
            _sig: PhantomData,
        }
    }
}

impl<F, Sig> Bound<F, Sig>
where
    F: ErrbackFn<Sig> + Clone + 'static,
    F::Args: 'static,
    F::Value: 'static,
    F::Error: 'static,
{
    /// Produce a [`Task`] for one invocation, taking the leading arguments
    /// as a tuple.
    ///
    /// Constructing the task performs no side effect; forking it invokes the
    /// native operation exactly once with `args` plus the synthesized
    /// callback. If the native operation never invokes that callback, the
    /// task stays pending forever; no timeout or retry is added here.
    pub fn apply(&self, args: F::Args) -> Task<F::Value, F::Error> {
        let native = self.native.clone();
        Task::new(move |settlement| native.invoke(args, settlement))
    }
}

macro_rules! impl_errback_arities {
    ($( ($($Arg:ident $arg:ident),*) )+) => {$(
        impl<F, $($Arg,)* E> ErrbackFn<($($Arg,)* Errback<E>,)> for F
        where
            F: FnOnce($($Arg,)* Errback<E>),
        {
            type Args = ($($Arg,)*);
            type Value = ();
            type Error = E;

            fn invoke(self, ($($arg,)*): Self::Args, settlement: Settlement<(), E>) {
                self($($arg,)* Errback::new(settlement));
            }
        }

        impl<F, $($Arg,)* T, E> ErrbackFn<($($Arg,)* ErrbackVal<T, E>,)> for F
        where
            F: FnOnce($($Arg,)* ErrbackVal<T, E>),
        {
            type Args = ($($Arg,)*);
            type Value = T;
            type Error = E;

            fn invoke(self, ($($arg,)*): Self::Args, settlement: Settlement<T, E>) {
                self($($arg,)* ErrbackVal::new(settlement));
            }
        }

        impl<F, $($Arg,)* E> Bound<F, ($($Arg,)* Errback<E>,)>
        where
            F: FnOnce($($Arg,)* Errback<E>) + Clone + 'static,
            $($Arg: 'static,)*
            E: 'static,
        {
            /// Invoke the bound operation with its leading arguments,
            /// producing a lazy [`Task`] of `()`.
            pub fn call(&self, $($arg: $Arg),*) -> Task<(), E> {
                self.apply(($($arg,)*))
            }
        }

        impl<F, $($Arg,)* T, E> Bound<F, ($($Arg,)* ErrbackVal<T, E>,)>
        where
            F: FnOnce($($Arg,)* ErrbackVal<T, E>) + Clone + 'static,
            $($Arg: 'static,)*
            T: 'static,
            E: 'static,
        {
            /// Invoke the bound operation with its leading arguments,
            /// producing a lazy [`Task`] of the callback's value type.
            pub fn call(&self, $($arg: $Arg),*) -> Task<T, E> {
                self.apply(($($arg,)*))
            }
        }
    )+};
}

impl_errback_arities! {
    ()
    (A1 a1)
    (A1 a1, A2 a2)
    (A1 a1, A2 a2, A3 a3)
    (A1 a1, A2 a2, A3 a3, A4 a4)
    (A1 a1, A2 a2, A3 a3, A4 a4, A5 a5)
    (A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Errno(&'static str);

    fn delivered<T: Send + 'static>(task: Task<T, Errno>) -> Result<T, Errno> {
        let (tx, rx) = mpsc::channel();
        let err_tx = tx.clone();
        task.fork(
            move |error| err_tx.send(Err(error)).unwrap(),
            move |value| tx.send(Ok(value)).unwrap(),
        );
        rx.recv().unwrap()
    }

    #[test]
    fn resolves_a_zero_argument_error_only_operation_to_unit() {
        let ping = lift(|cb: Errback<Errno>| cb.call(None));
        assert_eq!(delivered(ping.call()), Ok(()));
    }

    #[test]
    fn forwards_six_leading_arguments_in_order() {
        fn concat(
            a: String,
            b: String,
            c: String,
            d: String,
            e: String,
            f: String,
            cb: ErrbackVal<String, Errno>,
        ) {
            cb.call(None, Some(format!("{a}{b}{c}{d}{e}{f}")));
        }
        let concat = lift(concat);
        let task = concat.call(
            "a".into(),
            "b".into(),
            "c".into(),
            "d".into(),
            "e".into(),
            "f".into(),
        );
        assert_eq!(delivered(task), Ok("abcdef".to_string()));
    }

    #[test]
    fn a_cloned_bound_operation_shares_the_native_function() {
        let add = lift(|a: u32, b: u32, cb: ErrbackVal<u32, Errno>| cb.call(None, Some(a + b)));
        let also_add = add.clone();
        assert_eq!(delivered(add.call(1, 2)), Ok(3));
        assert_eq!(delivered(also_add.call(3, 4)), Ok(7));
    }
}
