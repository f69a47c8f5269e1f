//! Ambient context propagation for Ferry.
//!
//! A context that lives in thread-local storage on the submitting thread is
//! invisible to the pool thread that later runs the task. This crate closes
//! that gap:
//!
//! - **`ops`**: the [`ContextOps`] capability (read, write, clear, empty value)
//!   that plugs a context type into the machinery
//! - **`carrying`**: [`ContextRunnable`] / [`ContextCallable`], task decorators
//!   that install a bound context for the duration of one run
//! - **`scope`**: the [`ContextScope`] guard that restores the worker's prior
//!   context on every exit path, unwinding included
//! - **`delegating`** / **`scheduling`**: executor wrappers that decorate each
//!   submitted task and forward it to a delegate unchanged otherwise
//!
//! ```text
//! submit(task) -> ContextPropagation::wrap (snapshot on caller thread)
//!                        |
//!                        v
//!              delegate.execute(wrapped)  ->  worker: scope enter / run / restore
//! ```

pub mod carrying;
pub mod delegating;
pub mod error;
pub mod executor;
pub mod handle;
pub mod ops;
pub mod propagation;
pub mod scheduling;
pub mod scope;
pub mod task;

pub use carrying::{ContextCallable, ContextRunnable};
pub use delegating::{
    ContextAsyncTaskExecutor, ContextExecutor, ContextExecutorService,
    ContextScheduledExecutorService,
};
pub use error::{ExecutorError, TaskFailure};
pub use executor::{
    AsyncTaskExecutor, Executor, ExecutorService, Outcomes, ScheduledExecutorService,
    SchedulingTaskExecutor,
};
pub use handle::{CancelFlag, TaskCompleter, TaskHandle};
pub use ops::{ContextOps, ThreadLocalOps};
pub use propagation::ContextPropagation;
pub use scheduling::ContextSchedulingTaskExecutor;
pub use scope::ContextScope;
pub use task::{BoxCallable, Callable, Named, Runnable, Task, named};
