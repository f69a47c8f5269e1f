use crate::carrying::ContextRunnable;
use crate::ops::ContextOps;
use crate::task::{BoxCallable, Task};

/// The decoration step every propagating wrapper shares.
///
/// With a fixed context every task is bound to it. Without one, each call
/// snapshots whatever is ambient on the calling thread at that moment.
pub struct ContextPropagation<O: ContextOps> {
    ops: O,
    context: Option<O::Context>,
}

impl<O: ContextOps> ContextPropagation<O> {
    /// Capture the ambient context at each submission.
    pub fn ambient(ops: O) -> Self {
        Self { ops, context: None }
    }

    /// Bind every task to `context`.
    pub fn fixed(context: O::Context, ops: O) -> Self {
        Self {
            ops,
            context: Some(context),
        }
    }

    pub fn wrap(&self, task: Task) -> Task {
        Box::new(self.wrap_runnable(task))
    }

    pub fn wrap_runnable(&self, task: Task) -> ContextRunnable<O> {
        self.ops.wrap_runnable(task, self.context.clone())
    }

    pub fn wrap_callable<T: Send + 'static>(&self, task: BoxCallable<T>) -> BoxCallable<T> {
        Box::new(self.ops.wrap_callable(task, self.context.clone()))
    }

    /// Wrap each element on its own; an absent batch stays absent.
    pub fn wrap_all<T: Send + 'static>(
        &self,
        tasks: Option<Vec<BoxCallable<T>>>,
    ) -> Option<Vec<BoxCallable<T>>> {
        tasks.map(|tasks| {
            tasks
                .into_iter()
                .map(|task| self.wrap_callable(task))
                .collect()
        })
    }
}

impl<O: ContextOps> Clone for ContextPropagation<O> {
    fn clone(&self) -> Self {
        Self {
            ops: self.ops.clone(),
            context: self.context.clone(),
        }
    }
}
