//! Security-context propagation.
//!
//! Plugs [`SecurityContext`] into `ferry-core`: [`SecurityContextOps`] reads
//! and writes the per-thread [`SecurityContextHolder`], and the
//! `DelegatingSecurityContext*` names are the core wrappers fixed to it.
//!
//! ```ignore
//! let pool = BlockingPool::new(&config.pool)?;
//! let executor = delegating_executor(pool, None);
//! SecurityContextHolder::set_context(SecurityContext::for_principal("guest"));
//! executor.execute(task)?; // task sees "guest" on the worker thread
//! ```

mod context;
mod holder;

use ferry_core::{
    BoxCallable, ContextAsyncTaskExecutor, ContextCallable, ContextExecutor, ContextExecutorService, ContextOps,
    ContextRunnable, ContextScheduledExecutorService, ContextSchedulingTaskExecutor,
    SchedulingTaskExecutor, Task,
};
use tracing::trace;

pub use crate::context::{Authentication, SecurityContext};
pub use crate::holder::SecurityContextHolder;

/// [`ContextOps`] over [`SecurityContextHolder`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SecurityContextOps;

impl ContextOps for SecurityContextOps {
    type Context = SecurityContext;

    fn current(&self) -> SecurityContext {
        SecurityContextHolder::context()
    }

    fn set_current(&self, context: SecurityContext) {
        trace!(principal = %context, "Installing security context");
        SecurityContextHolder::set_context(context);
    }

    fn clear_current(&self) {
        SecurityContextHolder::clear_context();
    }

    fn empty(&self) -> SecurityContext {
        SecurityContextHolder::create_empty_context()
    }
}

pub type DelegatingSecurityContextRunnable = ContextRunnable<SecurityContextOps>;
pub type DelegatingSecurityContextCallable<T> = ContextCallable<SecurityContextOps, T>;
pub type DelegatingSecurityContextExecutor<E> = ContextExecutor<E, SecurityContextOps>;
pub type DelegatingSecurityContextExecutorService<E> =
    ContextExecutorService<E, SecurityContextOps>;
pub type DelegatingSecurityContextScheduledExecutorService<E> =
    ContextScheduledExecutorService<E, SecurityContextOps>;
pub type DelegatingSecurityContextAsyncTaskExecutor<E> =
    ContextAsyncTaskExecutor<E, SecurityContextOps>;
pub type DelegatingSecurityContextSchedulingTaskExecutor<E> =
    ContextSchedulingTaskExecutor<E, SecurityContextOps>;

/// Bind `task` to `context`, or to this thread's security context when `None`.
pub fn delegating_runnable(
    task: Task,
    context: Option<SecurityContext>,
) -> DelegatingSecurityContextRunnable {
    SecurityContextOps.wrap_runnable(task, context)
}

pub fn delegating_callable<T: Send + 'static>(
    task: BoxCallable<T>,
    context: Option<SecurityContext>,
) -> DelegatingSecurityContextCallable<T> {
    SecurityContextOps.wrap_callable(task, context)
}

/// Wrap any executor shape. With `None`, each submission carries the
/// submitter's security context.
pub fn delegating_executor<E>(
    delegate: E,
    context: Option<SecurityContext>,
) -> DelegatingSecurityContextExecutor<E> {
    ContextExecutor::create(delegate, context, SecurityContextOps)
}

pub fn delegating_scheduling_task_executor<E: SchedulingTaskExecutor>(
    delegate: E,
    context: Option<SecurityContext>,
) -> DelegatingSecurityContextSchedulingTaskExecutor<E> {
    ContextSchedulingTaskExecutor::create(delegate, context, SecurityContextOps)
}
