//! Shared fork-and-wait helpers for integration tests
//!
//! `Task` delivers its outcome through handlers that may run on a worker
//! thread, so tests funnel settlements through a channel and block on it
//! with a timeout.

use std::fmt::Debug;
use std::sync::mpsc;
use std::time::Duration;
use task_fs::Task;

const SETTLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Fork `task` and block until it settles, returning whichever channel fired.
#[allow(dead_code)]
pub fn settled<T, E>(task: Task<T, E>) -> Result<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let err_tx = tx.clone();
    task.fork(
        move |error| {
            err_tx.send(Err(error)).ok();
        },
        move |value| {
            tx.send(Ok(value)).ok();
        },
    );
    match rx.recv_timeout(SETTLE_TIMEOUT) {
        Ok(outcome) => outcome,
        Err(_) => panic!("task did not settle within {SETTLE_TIMEOUT:?}"),
    }
}

/// Fork `task` and block until it succeeds, panicking if it fails.
#[allow(dead_code)]
pub fn wait_ok<T, E>(task: Task<T, E>) -> T
where
    T: Send + 'static,
    E: Debug + Send + 'static,
{
    match settled(task) {
        Ok(value) => value,
        Err(error) => panic!("task settled on the failure channel: {error:?}"),
    }
}

/// Fork `task` and block until it fails, panicking if it succeeds.
#[allow(dead_code)]
pub fn wait_err<T, E>(task: Task<T, E>) -> E
where
    T: Debug + Send + 'static,
    E: Send + 'static,
{
    match settled(task) {
        Ok(value) => panic!("task settled on the success channel: {value:?}"),
        Err(error) => error,
    }
}
