use std::sync::Arc;

use anyhow::{Context, Result, bail};
use ferry_config::PoolConfig;
use ferry_core::{BoxCallable, ExecutorService, TaskFailure, named};
use ferry_pool::BlockingPool;
use ferry_security::{
    Authentication, SecurityContext, SecurityContextHolder, delegating_executor,
};
use tracing::{info, warn};

/// The pool the scenarios run on.
///
/// One worker, so [`worker_state`] lands on the thread that ran the propagated task.
pub(crate) fn demo_pool(config: &PoolConfig) -> Result<Arc<BlockingPool>> {
    let config = PoolConfig {
        max_threads: 1,
        ..config.clone()
    };
    let pool = BlockingPool::new(&config).context("failed to start worker pool")?;
    Ok(Arc::new(pool))
}

fn print_current() -> BoxCallable<SecurityContext> {
    Box::new(named("print current", || -> anyhow::Result<SecurityContext> {
        let current = SecurityContextHolder::context();
        info!(principal = %current, "Task running");
        Ok(current)
    }))
}

/// What a pool thread holds once the propagated task is done.
fn worker_state(pool: &BlockingPool) -> Result<String> {
    let peek: BoxCallable<String> = Box::new(|| -> anyhow::Result<String> {
        Ok(if SecurityContextHolder::is_set() {
            SecurityContextHolder::context().to_string()
        } else {
            "<unset>".to_string()
        })
    });
    Ok(pool.submit(peek)?.wait()?)
}

pub(crate) fn ambient_guest(pool: &Arc<BlockingPool>) -> Result<()> {
    SecurityContextHolder::set_context(SecurityContext::for_principal("guest"));
    let executor = delegating_executor(Arc::clone(pool), None);

    let observed = executor
        .submit(print_current())
        .context("ambient submission was rejected")?
        .wait()?;
    let worker_after = worker_state(pool)?;
    info!(observed = %observed, worker_after = %worker_after, "Ambient capture");

    SecurityContextHolder::clear_context();
    Ok(())
}

pub(crate) fn explicit_admin(pool: &Arc<BlockingPool>) -> Result<()> {
    SecurityContextHolder::set_context(SecurityContext::for_principal("guest"));
    let admin = SecurityContext::authenticated(Authentication::new(
        "admin",
        vec!["ROLE_ADMIN".to_string()],
    ));
    let executor = delegating_executor(Arc::clone(pool), Some(admin));

    let first = executor.submit(print_current())?;
    let second = executor.submit(print_current())?;
    let (first, second) = (first.wait()?, second.wait()?);
    info!(
        first = %first,
        second = %second,
        submitter = %SecurityContextHolder::context(),
        "Explicit context"
    );

    SecurityContextHolder::clear_context();
    Ok(())
}

pub(crate) fn failing_task(pool: &Arc<BlockingPool>) -> Result<()> {
    SecurityContextHolder::set_context(SecurityContext::for_principal("auditor"));
    let executor = delegating_executor(Arc::clone(pool), None);

    let failing: BoxCallable<()> = Box::new(named("settle ledger", || -> anyhow::Result<()> {
        bail!("ledger unavailable for {}", SecurityContextHolder::context())
    }));
    match executor.submit(failing)?.wait() {
        Err(TaskFailure::Failed(err)) => {
            let worker_after = worker_state(pool)?;
            warn!(worker_after = %worker_after, "Task failed: {err:#}");
        }
        outcome => bail!("expected the task to fail, got {outcome:?}"),
    }

    SecurityContextHolder::clear_context();
    Ok(())
}
