use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use ferry_core::{Task, TaskCompleter, TaskFailure};
use tokio::select;
use tokio::task::spawn_blocking;
use tokio::time::{self, Instant};
use tracing::{debug, warn};

use crate::state::PoolState;

#[derive(Debug, Clone, Copy)]
pub(crate) enum Cadence {
    /// Each run is due `period` after the previous run was due.
    FixedRate(Duration),
    /// Each run is due `delay` after the previous run finished.
    FixedDelay(Duration),
}

impl Cadence {
    pub(crate) fn interval(self) -> Duration {
        match self {
            Self::FixedRate(period) => period,
            Self::FixedDelay(delay) => delay,
        }
    }
}

/// Repeat `task` until its handle is cancelled, the pool shuts down, or a run panics.
///
/// Runs happen on blocking threads; this loop only sleeps between them.
/// The outcome is always an error: a periodic task never completes normally.
pub(crate) async fn run_periodic(
    state: &PoolState,
    mut task: Task,
    initial_delay: Duration,
    cadence: Cadence,
    completer: &TaskCompleter<()>,
) -> TaskFailure {
    // A shutdown after this point wakes `changed`; one before it fails the check below.
    let mut stopped = state.subscribe();
    let mut due = Instant::now() + initial_delay;

    loop {
        if completer.is_cancelled() || state.is_shutdown() {
            debug!(task = %task.describe(), "Periodic task stopped");
            return TaskFailure::Cancelled;
        }
        select! {
            () = time::sleep_until(due) => {}
            _ = stopped.changed() => {
                debug!(task = %task.describe(), "Periodic task stopped by shutdown");
                return TaskFailure::Cancelled;
            }
        }
        if completer.is_cancelled() || state.is_shutdown() {
            debug!(task = %task.describe(), "Periodic task stopped");
            return TaskFailure::Cancelled;
        }

        let run = spawn_blocking(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| task.run()));
            (task, outcome)
        })
        .await;
        let (returned, outcome) = match run {
            Ok(finished) => finished,
            Err(err) => return TaskFailure::Panicked(err.to_string()),
        };
        task = returned;
        if let Err(payload) = outcome {
            let failure = TaskFailure::from_panic(payload);
            warn!(task = %task.describe(), "Periodic task stopped: {failure}");
            return failure;
        }

        due = match cadence {
            Cadence::FixedRate(period) => due + period,
            Cadence::FixedDelay(delay) => Instant::now() + delay,
        };
    }
}
