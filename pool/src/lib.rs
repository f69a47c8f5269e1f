//! Reference worker pool for Ferry.
//!
//! [`BlockingPool`] implements every executor shape `ferry-core` knows about,
//! so the propagating wrappers have something real to decorate. Tasks run on
//! the blocking threads of a private tokio runtime; delays and periodic
//! cadences are kept by that runtime's timer.
//!
//! The blocking methods (`invoke_*`, [`TaskHandle::wait`], `await_termination`)
//! park the calling thread and must not be called from async code.

mod future_task;
mod periodic;
mod state;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use ferry_config::PoolConfig;
use ferry_core::{
    AsyncTaskExecutor, BoxCallable, CancelFlag, Executor, ExecutorError, ExecutorService,
    Outcomes, ScheduledExecutorService, SchedulingTaskExecutor, Task, TaskFailure, TaskHandle,
};
use futures_util::future::select_ok;
use thiserror::Error;
use tokio::runtime::{Builder, Runtime};
use tokio::task::spawn_blocking;
use tokio::time::{self, Instant};
use tracing::{debug, warn};

use crate::future_task::{future_task, with_result};
use crate::periodic::{Cadence, run_periodic};
use crate::state::PoolState;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("pool needs at least one worker thread")]
    NoThreads,
    #[error("failed to start worker runtime")]
    Runtime(#[source] io::Error),
}

pub struct BlockingPool {
    runtime: Runtime,
    state: Arc<PoolState>,
    prefers_short_lived_tasks: bool,
}

impl BlockingPool {
    pub fn new(config: &PoolConfig) -> Result<Self, PoolError> {
        if config.max_threads == 0 {
            return Err(PoolError::NoThreads);
        }
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(config.max_threads)
            .thread_keep_alive(config.keep_alive())
            .thread_name(config.thread_name.clone())
            .enable_time()
            .build()
            .map_err(PoolError::Runtime)?;

        debug!(
            max_threads = config.max_threads,
            thread_name = %config.thread_name,
            "Started worker pool"
        );

        Ok(Self {
            runtime,
            state: Arc::new(PoolState::new()),
            prefers_short_lived_tasks: config.prefers_short_lived_tasks,
        })
    }

    /// A pool with default settings and `max_threads` workers.
    pub fn with_threads(max_threads: usize) -> Result<Self, PoolError> {
        Self::new(&PoolConfig {
            max_threads,
            ..PoolConfig::default()
        })
    }

    /// Queue `task`, optionally after `delay`.
    fn dispatch(&self, task: Task, delay: Option<Duration>) -> Result<(), ExecutorError> {
        let id = self.state.enqueue(task)?;
        let state = Arc::clone(&self.state);
        match delay {
            None => {
                self.runtime.spawn_blocking(move || state.run_pending(id));
            }
            Some(delay) => {
                self.runtime.spawn(async move {
                    time::sleep(delay).await;
                    let worker = Arc::clone(&state);
                    if let Err(err) = spawn_blocking(move || worker.run_pending(id)).await {
                        warn!("Delayed task did not run: {err}");
                        state.abandon(id);
                    }
                });
            }
        }
        Ok(())
    }

    fn submit_after<T: Send + 'static>(
        &self,
        task: BoxCallable<T>,
        delay: Option<Duration>,
    ) -> Result<TaskHandle<T>, ExecutorError> {
        let (task, handle) = future_task(task);
        self.dispatch(task, delay)?;
        Ok(handle)
    }

    /// Submit every task; on rejection, cancel the ones already accepted.
    fn submit_batch<T: Send + 'static>(
        &self,
        tasks: Option<Vec<BoxCallable<T>>>,
    ) -> Result<Vec<TaskHandle<T>>, ExecutorError> {
        let tasks = tasks.ok_or(ExecutorError::NoTasks)?;
        let mut handles = Vec::with_capacity(tasks.len());
        for task in tasks {
            match self.submit_after(task, None) {
                Ok(handle) => handles.push(handle),
                Err(err) => {
                    for handle in &handles {
                        handle.cancel();
                    }
                    return Err(err);
                }
            }
        }
        Ok(handles)
    }

    fn race<T: Send + 'static>(
        &self,
        tasks: Option<Vec<BoxCallable<T>>>,
        timeout: Option<Duration>,
    ) -> Result<T, ExecutorError> {
        let handles = self.submit_batch(tasks)?;
        if handles.is_empty() {
            return Err(ExecutorError::NoTasks);
        }
        let flags: Vec<CancelFlag> = handles.iter().map(TaskHandle::cancel_flag).collect();

        let first = async move {
            select_ok(handles)
                .await
                .map(|(value, _rest)| value)
                .map_err(ExecutorError::AllFailed)
        };
        let outcome = self.runtime.handle().block_on(async move {
            match timeout {
                Some(timeout) => time::timeout(timeout, first)
                    .await
                    .unwrap_or(Err(ExecutorError::Timeout)),
                None => first.await,
            }
        });

        for flag in flags {
            flag.cancel();
        }
        outcome
    }

    fn schedule_periodic(
        &self,
        task: Task,
        initial_delay: Duration,
        cadence: Cadence,
    ) -> Result<TaskHandle<()>, ExecutorError> {
        if cadence.interval().is_zero() {
            warn!(task = %task.describe(), "Rejecting periodic task with a zero period");
            return Err(ExecutorError::Rejected {
                reason: "period must be greater than zero".to_string(),
            });
        }
        self.state.begin()?;
        let (completer, handle) = TaskHandle::channel();
        let state = Arc::clone(&self.state);
        self.runtime.spawn(async move {
            let failure = run_periodic(&state, task, initial_delay, cadence, &completer).await;
            completer.complete(Err(failure));
            state.finish();
        });
        Ok(handle)
    }
}

impl Executor for BlockingPool {
    fn execute(&self, task: Task) -> Result<(), ExecutorError> {
        self.dispatch(task, None)
    }
}

impl ExecutorService for BlockingPool {
    fn submit<T: Send + 'static>(
        &self,
        task: BoxCallable<T>,
    ) -> Result<TaskHandle<T>, ExecutorError> {
        self.submit_after(task, None)
    }

    fn submit_runnable(&self, task: Task) -> Result<TaskHandle<()>, ExecutorError> {
        self.submit_with_result(task, ())
    }

    fn submit_with_result<T: Send + 'static>(
        &self,
        task: Task,
        result: T,
    ) -> Result<TaskHandle<T>, ExecutorError> {
        self.submit_after(with_result(task, result), None)
    }

    /// An empty batch yields no outcomes; an absent one is [`ExecutorError::NoTasks`].
    fn invoke_all<T: Send + 'static>(
        &self,
        tasks: Option<Vec<BoxCallable<T>>>,
    ) -> Result<Outcomes<T>, ExecutorError> {
        let handles = self.submit_batch(tasks)?;
        Ok(handles.into_iter().map(TaskHandle::wait).collect())
    }

    /// Tasks still unfinished at the deadline are cancelled and reported as such.
    fn invoke_all_timeout<T: Send + 'static>(
        &self,
        tasks: Option<Vec<BoxCallable<T>>>,
        timeout: Duration,
    ) -> Result<Outcomes<T>, ExecutorError> {
        let handles = self.submit_batch(tasks)?;
        let deadline = Instant::now() + timeout;
        let outcomes = self.runtime.handle().block_on(async move {
            let mut outcomes = Vec::with_capacity(handles.len());
            for mut handle in handles {
                match time::timeout_at(deadline, &mut handle).await {
                    Ok(outcome) => outcomes.push(outcome),
                    Err(_elapsed) => {
                        handle.cancel();
                        outcomes.push(Err(TaskFailure::Cancelled));
                    }
                }
            }
            outcomes
        });
        Ok(outcomes)
    }

    /// The first success wins; the others are cancelled if they have not started.
    fn invoke_any<T: Send + 'static>(
        &self,
        tasks: Option<Vec<BoxCallable<T>>>,
    ) -> Result<T, ExecutorError> {
        self.race(tasks, None)
    }

    fn invoke_any_timeout<T: Send + 'static>(
        &self,
        tasks: Option<Vec<BoxCallable<T>>>,
        timeout: Duration,
    ) -> Result<T, ExecutorError> {
        self.race(tasks, Some(timeout))
    }

    fn shutdown(&self) {
        if self.state.shutdown() {
            debug!("Worker pool shutting down");
        }
    }

    fn shutdown_now(&self) -> Vec<Task> {
        self.shutdown();
        let drained = self.state.drain();
        debug!(count = drained.len(), "Drained tasks that never started");
        drained
    }

    fn is_shutdown(&self) -> bool {
        self.state.is_shutdown()
    }

    fn is_terminated(&self) -> bool {
        self.state.is_terminated()
    }

    fn await_termination(&self, timeout: Duration) -> bool {
        self.state.await_termination(timeout)
    }
}

impl ScheduledExecutorService for BlockingPool {
    fn schedule(&self, task: Task, delay: Duration) -> Result<TaskHandle<()>, ExecutorError> {
        self.submit_after(with_result(task, ()), Some(delay))
    }

    fn schedule_callable<T: Send + 'static>(
        &self,
        task: BoxCallable<T>,
        delay: Duration,
    ) -> Result<TaskHandle<T>, ExecutorError> {
        self.submit_after(task, Some(delay))
    }

    fn schedule_at_fixed_rate(
        &self,
        task: Task,
        initial_delay: Duration,
        period: Duration,
    ) -> Result<TaskHandle<()>, ExecutorError> {
        self.schedule_periodic(task, initial_delay, Cadence::FixedRate(period))
    }

    fn schedule_with_fixed_delay(
        &self,
        task: Task,
        initial_delay: Duration,
        delay: Duration,
    ) -> Result<TaskHandle<()>, ExecutorError> {
        self.schedule_periodic(task, initial_delay, Cadence::FixedDelay(delay))
    }
}

impl AsyncTaskExecutor for BlockingPool {
    fn submit_task(&self, task: Task) -> Result<TaskHandle<()>, ExecutorError> {
        self.submit_runnable(task)
    }

    fn submit_callable<T: Send + 'static>(
        &self,
        task: BoxCallable<T>,
    ) -> Result<TaskHandle<T>, ExecutorError> {
        self.submit(task)
    }
}

impl SchedulingTaskExecutor for BlockingPool {
    fn prefers_short_lived_tasks(&self) -> bool {
        self.prefers_short_lived_tasks
    }
}
