//! Executor shapes that propagating wrappers decorate and delegates implement.
//!
//! These describe the collaborator, not a pool: ordering, thread selection,
//! rejection and timeouts are whatever the implementation decides.

use std::sync::Arc;
use std::time::Duration;

use crate::error::{ExecutorError, TaskFailure};
use crate::handle::TaskHandle;
use crate::task::{BoxCallable, Task};

/// Outcome of each task in a bulk submission, in input order.
pub type Outcomes<T> = Vec<Result<T, TaskFailure>>;

pub trait Executor: Send + Sync {
    fn execute(&self, task: Task) -> Result<(), ExecutorError>;
}

pub trait ExecutorService: Executor {
    fn submit<T: Send + 'static>(
        &self,
        task: BoxCallable<T>,
    ) -> Result<TaskHandle<T>, ExecutorError>;

    fn submit_runnable(&self, task: Task) -> Result<TaskHandle<()>, ExecutorError>;

    /// Run `task`, then complete the handle with `result`.
    fn submit_with_result<T: Send + 'static>(
        &self,
        task: Task,
        result: T,
    ) -> Result<TaskHandle<T>, ExecutorError>;

    /// Run every task and wait for all of them.
    ///
    /// `None` is distinct from an empty batch; how it is treated is up to the
    /// implementation.
    fn invoke_all<T: Send + 'static>(
        &self,
        tasks: Option<Vec<BoxCallable<T>>>,
    ) -> Result<Outcomes<T>, ExecutorError>;

    fn invoke_all_timeout<T: Send + 'static>(
        &self,
        tasks: Option<Vec<BoxCallable<T>>>,
        timeout: Duration,
    ) -> Result<Outcomes<T>, ExecutorError>;

    /// Return the value of the first task to succeed.
    fn invoke_any<T: Send + 'static>(
        &self,
        tasks: Option<Vec<BoxCallable<T>>>,
    ) -> Result<T, ExecutorError>;

    fn invoke_any_timeout<T: Send + 'static>(
        &self,
        tasks: Option<Vec<BoxCallable<T>>>,
        timeout: Duration,
    ) -> Result<T, ExecutorError>;

    fn shutdown(&self);

    /// Stop accepting work and return the tasks that never started.
    fn shutdown_now(&self) -> Vec<Task>;

    fn is_shutdown(&self) -> bool;

    fn is_terminated(&self) -> bool;

    /// Block until terminated or `timeout` elapses; `true` if terminated.
    fn await_termination(&self, timeout: Duration) -> bool;
}

pub trait ScheduledExecutorService: ExecutorService {
    fn schedule(&self, task: Task, delay: Duration) -> Result<TaskHandle<()>, ExecutorError>;

    fn schedule_callable<T: Send + 'static>(
        &self,
        task: BoxCallable<T>,
        delay: Duration,
    ) -> Result<TaskHandle<T>, ExecutorError>;

    /// Runs start `period` apart, measured from the first start.
    fn schedule_at_fixed_rate(
        &self,
        task: Task,
        initial_delay: Duration,
        period: Duration,
    ) -> Result<TaskHandle<()>, ExecutorError>;

    /// Runs start `delay` after the previous run finished.
    fn schedule_with_fixed_delay(
        &self,
        task: Task,
        initial_delay: Duration,
        delay: Duration,
    ) -> Result<TaskHandle<()>, ExecutorError>;
}

pub trait AsyncTaskExecutor: Executor {
    fn submit_task(&self, task: Task) -> Result<TaskHandle<()>, ExecutorError>;

    fn submit_callable<T: Send + 'static>(
        &self,
        task: BoxCallable<T>,
    ) -> Result<TaskHandle<T>, ExecutorError>;
}

pub trait SchedulingTaskExecutor: AsyncTaskExecutor {
    /// Whether the scheduler is tuned for many short tasks rather than few long ones.
    fn prefers_short_lived_tasks(&self) -> bool {
        true
    }
}

impl<E: Executor + ?Sized> Executor for Arc<E> {
    fn execute(&self, task: Task) -> Result<(), ExecutorError> {
        (**self).execute(task)
    }
}

impl<E: ExecutorService> ExecutorService for Arc<E> {
    fn submit<T: Send + 'static>(
        &self,
        task: BoxCallable<T>,
    ) -> Result<TaskHandle<T>, ExecutorError> {
        (**self).submit(task)
    }

    fn submit_runnable(&self, task: Task) -> Result<TaskHandle<()>, ExecutorError> {
        (**self).submit_runnable(task)
    }

    fn submit_with_result<T: Send + 'static>(
        &self,
        task: Task,
        result: T,
    ) -> Result<TaskHandle<T>, ExecutorError> {
        (**self).submit_with_result(task, result)
    }

    fn invoke_all<T: Send + 'static>(
        &self,
        tasks: Option<Vec<BoxCallable<T>>>,
    ) -> Result<Outcomes<T>, ExecutorError> {
        (**self).invoke_all(tasks)
    }

    fn invoke_all_timeout<T: Send + 'static>(
        &self,
        tasks: Option<Vec<BoxCallable<T>>>,
        timeout: Duration,
    ) -> Result<Outcomes<T>, ExecutorError> {
        (**self).invoke_all_timeout(tasks, timeout)
    }

    fn invoke_any<T: Send + 'static>(
        &self,
        tasks: Option<Vec<BoxCallable<T>>>,
    ) -> Result<T, ExecutorError> {
        (**self).invoke_any(tasks)
    }

    fn invoke_any_timeout<T: Send + 'static>(
        &self,
        tasks: Option<Vec<BoxCallable<T>>>,
        timeout: Duration,
    ) -> Result<T, ExecutorError> {
        (**self).invoke_any_timeout(tasks, timeout)
    }

    fn shutdown(&self) {
        (**self).shutdown();
    }

    fn shutdown_now(&self) -> Vec<Task> {
        (**self).shutdown_now()
    }

    fn is_shutdown(&self) -> bool {
        (**self).is_shutdown()
    }

    fn is_terminated(&self) -> bool {
        (**self).is_terminated()
    }

    fn await_termination(&self, timeout: Duration) -> bool {
        (**self).await_termination(timeout)
    }
}

impl<E: ScheduledExecutorService> ScheduledExecutorService for Arc<E> {
    fn schedule(&self, task: Task, delay: Duration) -> Result<TaskHandle<()>, ExecutorError> {
        (**self).schedule(task, delay)
    }

    fn schedule_callable<T: Send + 'static>(
        &self,
        task: BoxCallable<T>,
        delay: Duration,
    ) -> Result<TaskHandle<T>, ExecutorError> {
        (**self).schedule_callable(task, delay)
    }

    fn schedule_at_fixed_rate(
        &self,
        task: Task,
        initial_delay: Duration,
        period: Duration,
    ) -> Result<TaskHandle<()>, ExecutorError> {
        (**self).schedule_at_fixed_rate(task, initial_delay, period)
    }

    fn schedule_with_fixed_delay(
        &self,
        task: Task,
        initial_delay: Duration,
        delay: Duration,
    ) -> Result<TaskHandle<()>, ExecutorError> {
        (**self).schedule_with_fixed_delay(task, initial_delay, delay)
    }
}

impl<E: AsyncTaskExecutor> AsyncTaskExecutor for Arc<E> {
    fn submit_task(&self, task: Task) -> Result<TaskHandle<()>, ExecutorError> {
        (**self).submit_task(task)
    }

    fn submit_callable<T: Send + 'static>(
        &self,
        task: BoxCallable<T>,
    ) -> Result<TaskHandle<T>, ExecutorError> {
        (**self).submit_callable(task)
    }
}

impl<E: SchedulingTaskExecutor> SchedulingTaskExecutor for Arc<E> {
    fn prefers_short_lived_tasks(&self) -> bool {
        (**self).prefers_short_lived_tasks()
    }
}
