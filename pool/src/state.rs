//! Bookkeeping shared between the pool and the work it has accepted.

use std::collections::BTreeMap;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use ferry_core::{ExecutorError, Task, TaskFailure};
use tokio::sync::watch;
use tracing::warn;

struct Inner {
    /// Accepted one-shot tasks that have not started yet, keyed in submission order.
    pending: BTreeMap<u64, Task>,
    /// Pending and running work, periodic loops included.
    outstanding: usize,
    shutdown: bool,
    next_id: u64,
}

pub(crate) struct PoolState {
    inner: Mutex<Inner>,
    idle: Condvar,
    stopped: watch::Sender<bool>,
}

impl PoolState {
    pub(crate) fn new() -> Self {
        let (stopped, _) = watch::channel(false);
        Self {
            inner: Mutex::new(Inner {
                pending: BTreeMap::new(),
                outstanding: 0,
                shutdown: false,
                next_id: 0,
            }),
            idle: Condvar::new(),
            stopped,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Park a task until a worker picks it up by id.
    pub(crate) fn enqueue(&self, task: Task) -> Result<u64, ExecutorError> {
        let mut inner = self.lock();
        if inner.shutdown {
            warn!(task = %task.describe(), "Rejecting task: pool is shut down");
            return Err(ExecutorError::Shutdown);
        }
        let id = inner.next_id;
        inner.next_id += 1;
        inner.pending.insert(id, task);
        inner.outstanding += 1;
        Ok(id)
    }

    /// Count work that never sits in the pending table.
    pub(crate) fn begin(&self) -> Result<(), ExecutorError> {
        let mut inner = self.lock();
        if inner.shutdown {
            warn!("Rejecting periodic task: pool is shut down");
            return Err(ExecutorError::Shutdown);
        }
        inner.outstanding += 1;
        Ok(())
    }

    pub(crate) fn finish(&self) {
        let mut inner = self.lock();
        inner.outstanding = inner.outstanding.saturating_sub(1);
        if inner.outstanding == 0 {
            self.idle.notify_all();
        }
    }

    /// Run the task parked under `id`, unless `shutdown_now` drained it first.
    pub(crate) fn run_pending(&self, id: u64) {
        let Some(mut task) = self.lock().pending.remove(&id) else {
            return;
        };
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| task.run())) {
            let failure = TaskFailure::from_panic(payload);
            warn!(task = %task.describe(), "{failure}");
        }
        self.finish();
    }

    /// Drop the task parked under `id` when no worker will ever run it.
    ///
    /// Its handle reads as cancelled. Does nothing if the task already started.
    pub(crate) fn abandon(&self, id: u64) {
        let Some(task) = self.lock().pending.remove(&id) else {
            return;
        };
        warn!(task = %task.describe(), "Dropping task that never reached a worker");
        drop(task);
        self.finish();
    }

    /// Returns `true` on the first call only.
    pub(crate) fn shutdown(&self) -> bool {
        let mut inner = self.lock();
        let first = !inner.shutdown;
        inner.shutdown = true;
        self.stopped.send_replace(true);
        self.idle.notify_all();
        first
    }

    pub(crate) fn drain(&self) -> Vec<Task> {
        let mut inner = self.lock();
        let drained: Vec<Task> = mem::take(&mut inner.pending).into_values().collect();
        inner.outstanding = inner.outstanding.saturating_sub(drained.len());
        if inner.outstanding == 0 {
            self.idle.notify_all();
        }
        drained
    }

    pub(crate) fn is_shutdown(&self) -> bool {
        self.lock().shutdown
    }

    pub(crate) fn is_terminated(&self) -> bool {
        let inner = self.lock();
        inner.shutdown && inner.outstanding == 0
    }

    /// Resolves once the pool is shut down; used to cut periodic sleeps short.
    pub(crate) fn subscribe(&self) -> watch::Receiver<bool> {
        self.stopped.subscribe()
    }

    pub(crate) fn await_termination(&self, timeout: Duration) -> bool {
        let inner = self.lock();
        let (inner, _) = self
            .idle
            .wait_timeout_while(inner, timeout, |inner| {
                !(inner.shutdown && inner.outstanding == 0)
            })
            .unwrap_or_else(PoisonError::into_inner);
        inner.shutdown && inner.outstanding == 0
    }
}
