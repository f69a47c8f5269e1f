//! Task decorators that carry a bound context to the worker thread.
//!
//! The bound context is fixed when the decorator is built. Each run installs
//! it through a [`ContextScope`], so the worker's own context is back in place
//! once the delegate returns, errors, or panics. Runs take `&mut self`; one
//! instance cannot be run from two threads at once.

use std::fmt;

use crate::ops::ContextOps;
use crate::scope::ContextScope;
use crate::task::{BoxCallable, Callable, Runnable, Task};

pub struct ContextRunnable<O: ContextOps> {
    delegate: Task,
    context: O::Context,
    ops: O,
}

impl<O: ContextOps> ContextRunnable<O> {
    /// Bind `delegate` to an explicit context.
    pub fn new(delegate: Task, context: O::Context, ops: O) -> Self {
        Self {
            delegate,
            context,
            ops,
        }
    }

    /// Bind `delegate` to the context ambient on the calling thread.
    pub fn capture(delegate: Task, ops: O) -> Self {
        let context = ops.current();
        Self::new(delegate, context, ops)
    }

    pub fn create(delegate: Task, context: Option<O::Context>, ops: O) -> Self {
        match context {
            Some(context) => Self::new(delegate, context, ops),
            None => Self::capture(delegate, ops),
        }
    }

    #[must_use]
    pub fn bound_context(&self) -> &O::Context {
        &self.context
    }
}

impl<O: ContextOps> Runnable for ContextRunnable<O> {
    fn run(&mut self) {
        let _scope = ContextScope::enter(&self.ops, self.context.clone());
        self.delegate.run();
    }

    fn describe(&self) -> String {
        self.delegate.describe()
    }
}

impl<O: ContextOps> fmt::Display for ContextRunnable<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.delegate.describe())
    }
}

impl<O: ContextOps> fmt::Debug for ContextRunnable<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.delegate.describe())
    }
}

pub struct ContextCallable<O: ContextOps, T> {
    delegate: BoxCallable<T>,
    context: O::Context,
    ops: O,
}

impl<O: ContextOps, T: Send + 'static> ContextCallable<O, T> {
    /// Bind `delegate` to an explicit context.
    pub fn new(delegate: BoxCallable<T>, context: O::Context, ops: O) -> Self {
        Self {
            delegate,
            context,
            ops,
        }
    }

    /// Bind `delegate` to the context ambient on the calling thread.
    pub fn capture(delegate: BoxCallable<T>, ops: O) -> Self {
        let context = ops.current();
        Self::new(delegate, context, ops)
    }

    pub fn create(delegate: BoxCallable<T>, context: Option<O::Context>, ops: O) -> Self {
        match context {
            Some(context) => Self::new(delegate, context, ops),
            None => Self::capture(delegate, ops),
        }
    }

    #[must_use]
    pub fn bound_context(&self) -> &O::Context {
        &self.context
    }
}

impl<O: ContextOps, T: Send + 'static> Callable<T> for ContextCallable<O, T> {
    fn call(&mut self) -> anyhow::Result<T> {
        let _scope = ContextScope::enter(&self.ops, self.context.clone());
        self.delegate.call()
    }

    fn describe(&self) -> String {
        self.delegate.describe()
    }
}

impl<O: ContextOps, T: Send + 'static> fmt::Display for ContextCallable<O, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.delegate.describe())
    }
}

impl<O: ContextOps, T: Send + 'static> fmt::Debug for ContextCallable<O, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.delegate.describe())
    }
}
