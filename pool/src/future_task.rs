//! Adapters that turn value-producing work into plain tasks with a handle.

use std::panic::{self, AssertUnwindSafe};

use anyhow::anyhow;
use ferry_core::{BoxCallable, Task, TaskFailure, TaskHandle, named};

/// Split `callable` into a runnable the pool can queue and the caller's handle.
///
/// A task whose handle was cancelled before it started completes as
/// [`TaskFailure::Cancelled`] without calling the callable.
pub(crate) fn future_task<T: Send + 'static>(
    mut callable: BoxCallable<T>,
) -> (Task, TaskHandle<T>) {
    let (completer, handle) = TaskHandle::channel();
    let mut completer = Some(completer);
    let name = callable.describe();

    let task = named(name, move || {
        let Some(completer) = completer.take() else {
            return;
        };
        if completer.is_cancelled() {
            completer.complete(Err(TaskFailure::Cancelled));
            return;
        }
        let outcome = match panic::catch_unwind(AssertUnwindSafe(|| callable.call())) {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(TaskFailure::Failed(err)),
            Err(payload) => Err(TaskFailure::from_panic(payload)),
        };
        completer.complete(outcome);
    });

    (Box::new(task), handle)
}

/// A callable that runs `task` and then yields `result`.
pub(crate) fn with_result<T: Send + 'static>(mut task: Task, result: T) -> BoxCallable<T> {
    let name = task.describe();
    let mut result = Some(result);
    Box::new(named(name, move || {
        task.run();
        result
            .take()
            .ok_or_else(|| anyhow!("result was already handed out"))
    }))
}
