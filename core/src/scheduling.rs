use crate::delegating::ContextExecutor;
use crate::error::ExecutorError;
use crate::executor::{AsyncTaskExecutor, Executor, SchedulingTaskExecutor};
use crate::handle::TaskHandle;
use crate::ops::ContextOps;
use crate::task::{BoxCallable, Task};

/// Propagating wrapper for a [`SchedulingTaskExecutor`].
///
/// Submission goes through an inner [`ContextExecutor`]. The short-lived-task
/// preference belongs to the scheduler and is asked of the delegate each time.
pub struct ContextSchedulingTaskExecutor<E, O: ContextOps> {
    inner: ContextExecutor<E, O>,
}

impl<E: SchedulingTaskExecutor, O: ContextOps> ContextSchedulingTaskExecutor<E, O> {
    pub fn new(delegate: E, ops: O) -> Self {
        Self {
            inner: ContextExecutor::new(delegate, ops),
        }
    }

    pub fn with_context(delegate: E, context: O::Context, ops: O) -> Self {
        Self {
            inner: ContextExecutor::with_context(delegate, context, ops),
        }
    }

    pub fn create(delegate: E, context: Option<O::Context>, ops: O) -> Self {
        Self {
            inner: ContextExecutor::create(delegate, context, ops),
        }
    }

    pub fn delegate(&self) -> &E {
        self.inner.delegate()
    }
}

impl<E: SchedulingTaskExecutor, O: ContextOps> Executor for ContextSchedulingTaskExecutor<E, O> {
    fn execute(&self, task: Task) -> Result<(), ExecutorError> {
        self.inner.execute(task)
    }
}

impl<E: SchedulingTaskExecutor, O: ContextOps> AsyncTaskExecutor
    for ContextSchedulingTaskExecutor<E, O>
{
    fn submit_task(&self, task: Task) -> Result<TaskHandle<()>, ExecutorError> {
        self.inner.submit_task(task)
    }

    fn submit_callable<T: Send + 'static>(
        &self,
        task: BoxCallable<T>,
    ) -> Result<TaskHandle<T>, ExecutorError> {
        self.inner.submit_callable(task)
    }
}

impl<E: SchedulingTaskExecutor, O: ContextOps> SchedulingTaskExecutor
    for ContextSchedulingTaskExecutor<E, O>
{
    fn prefers_short_lived_tasks(&self) -> bool {
        self.inner.delegate().prefers_short_lived_tasks()
    }
}
