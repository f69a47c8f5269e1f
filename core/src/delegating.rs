//! Executor wrappers that decorate every submitted task.
//!
//! One struct covers every executor shape: [`ContextExecutor`] implements
//! each executor trait its delegate implements. Lifecycle methods forward
//! untouched; they carry no context.

use std::time::Duration;

use tracing::trace;

use crate::error::ExecutorError;
use crate::executor::{
    AsyncTaskExecutor, Executor, ExecutorService, Outcomes, ScheduledExecutorService,
};
use crate::handle::TaskHandle;
use crate::ops::ContextOps;
use crate::propagation::ContextPropagation;
use crate::task::{BoxCallable, Task};

pub struct ContextExecutor<E, O: ContextOps> {
    delegate: E,
    propagation: ContextPropagation<O>,
}

/// A [`ContextExecutor`] over an [`ExecutorService`].
pub type ContextExecutorService<E, O> = ContextExecutor<E, O>;

/// A [`ContextExecutor`] over a [`ScheduledExecutorService`].
pub type ContextScheduledExecutorService<E, O> = ContextExecutor<E, O>;

/// A [`ContextExecutor`] over an [`AsyncTaskExecutor`].
pub type ContextAsyncTaskExecutor<E, O> = ContextExecutor<E, O>;

impl<E, O: ContextOps> ContextExecutor<E, O> {
    /// Tasks run with the context ambient on the thread that submits them.
    pub fn new(delegate: E, ops: O) -> Self {
        Self {
            delegate,
            propagation: ContextPropagation::ambient(ops),
        }
    }

    /// Tasks run with `context`, whatever is ambient at submission.
    pub fn with_context(delegate: E, context: O::Context, ops: O) -> Self {
        Self {
            delegate,
            propagation: ContextPropagation::fixed(context, ops),
        }
    }

    /// Fixed context if `context` is given, ambient capture otherwise.
    pub fn create(delegate: E, context: Option<O::Context>, ops: O) -> Self {
        match context {
            Some(context) => Self::with_context(delegate, context, ops),
            None => Self::new(delegate, ops),
        }
    }

    pub fn delegate(&self) -> &E {
        &self.delegate
    }

    fn wrap(&self, task: Task) -> Task {
        let task = self.propagation.wrap(task);
        trace!(task = %task.describe(), "forwarding task with bound context");
        task
    }

    fn wrap_callable<T: Send + 'static>(&self, task: BoxCallable<T>) -> BoxCallable<T> {
        let task = self.propagation.wrap_callable(task);
        trace!(task = %task.describe(), "forwarding callable with bound context");
        task
    }

    fn wrap_all<T: Send + 'static>(
        &self,
        tasks: Option<Vec<BoxCallable<T>>>,
    ) -> Option<Vec<BoxCallable<T>>> {
        let tasks = self.propagation.wrap_all(tasks);
        trace!(
            count = tasks.as_ref().map(Vec::len),
            "forwarding batch with bound context"
        );
        tasks
    }
}

impl<E: Executor, O: ContextOps> Executor for ContextExecutor<E, O> {
    fn execute(&self, task: Task) -> Result<(), ExecutorError> {
        self.delegate.execute(self.wrap(task))
    }
}

impl<E: ExecutorService, O: ContextOps> ExecutorService for ContextExecutor<E, O> {
    fn submit<T: Send + 'static>(
        &self,
        task: BoxCallable<T>,
    ) -> Result<TaskHandle<T>, ExecutorError> {
        self.delegate.submit(self.wrap_callable(task))
    }

    fn submit_runnable(&self, task: Task) -> Result<TaskHandle<()>, ExecutorError> {
        self.delegate.submit_runnable(self.wrap(task))
    }

    fn submit_with_result<T: Send + 'static>(
        &self,
        task: Task,
        result: T,
    ) -> Result<TaskHandle<T>, ExecutorError> {
        self.delegate.submit_with_result(self.wrap(task), result)
    }

    fn invoke_all<T: Send + 'static>(
        &self,
        tasks: Option<Vec<BoxCallable<T>>>,
    ) -> Result<Outcomes<T>, ExecutorError> {
        self.delegate.invoke_all(self.wrap_all(tasks))
    }

    fn invoke_all_timeout<T: Send + 'static>(
        &self,
        tasks: Option<Vec<BoxCallable<T>>>,
        timeout: Duration,
    ) -> Result<Outcomes<T>, ExecutorError> {
        self.delegate.invoke_all_timeout(self.wrap_all(tasks), timeout)
    }

    fn invoke_any<T: Send + 'static>(
        &self,
        tasks: Option<Vec<BoxCallable<T>>>,
    ) -> Result<T, ExecutorError> {
        self.delegate.invoke_any(self.wrap_all(tasks))
    }

    fn invoke_any_timeout<T: Send + 'static>(
        &self,
        tasks: Option<Vec<BoxCallable<T>>>,
        timeout: Duration,
    ) -> Result<T, ExecutorError> {
        self.delegate.invoke_any_timeout(self.wrap_all(tasks), timeout)
    }

    fn shutdown(&self) {
        self.delegate.shutdown();
    }

    fn shutdown_now(&self) -> Vec<Task> {
        self.delegate.shutdown_now()
    }

    fn is_shutdown(&self) -> bool {
        self.delegate.is_shutdown()
    }

    fn is_terminated(&self) -> bool {
        self.delegate.is_terminated()
    }

    fn await_termination(&self, timeout: Duration) -> bool {
        self.delegate.await_termination(timeout)
    }
}

impl<E: ScheduledExecutorService, O: ContextOps> ScheduledExecutorService
    for ContextExecutor<E, O>
{
    fn schedule(&self, task: Task, delay: Duration) -> Result<TaskHandle<()>, ExecutorError> {
        self.delegate.schedule(self.wrap(task), delay)
    }

    fn schedule_callable<T: Send + 'static>(
        &self,
        task: BoxCallable<T>,
        delay: Duration,
    ) -> Result<TaskHandle<T>, ExecutorError> {
        self.delegate.schedule_callable(self.wrap_callable(task), delay)
    }

    fn schedule_at_fixed_rate(
        &self,
        task: Task,
        initial_delay: Duration,
        period: Duration,
    ) -> Result<TaskHandle<()>, ExecutorError> {
        self.delegate
            .schedule_at_fixed_rate(self.wrap(task), initial_delay, period)
    }

    fn schedule_with_fixed_delay(
        &self,
        task: Task,
        initial_delay: Duration,
        delay: Duration,
    ) -> Result<TaskHandle<()>, ExecutorError> {
        self.delegate
            .schedule_with_fixed_delay(self.wrap(task), initial_delay, delay)
    }
}

impl<E: AsyncTaskExecutor, O: ContextOps> AsyncTaskExecutor for ContextExecutor<E, O> {
    fn submit_task(&self, task: Task) -> Result<TaskHandle<()>, ExecutorError> {
        self.delegate.submit_task(self.wrap(task))
    }

    fn submit_callable<T: Send + 'static>(
        &self,
        task: BoxCallable<T>,
    ) -> Result<TaskHandle<T>, ExecutorError> {
        self.delegate.submit_callable(self.wrap_callable(task))
    }
}
