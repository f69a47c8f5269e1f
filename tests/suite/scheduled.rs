//! Delayed, periodic and scheduling-adapter submissions through a real pool.

use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use ferry_config::PoolConfig;
use ferry_core::{
    AsyncTaskExecutor, ContextAsyncTaskExecutor, ContextOps, ContextScheduledExecutorService,
    ScheduledExecutorService, SchedulingTaskExecutor, TaskFailure,
};
use ferry_pool::BlockingPool;
use ferry_security::{
    DelegatingSecurityContextAsyncTaskExecutor, DelegatingSecurityContextScheduledExecutorService,
    SecurityContext, SecurityContextHolder, SecurityContextOps,
    delegating_scheduling_task_executor,
};

use crate::common::{WAIT, Tenant, principal, single_worker_pool, tenant_ops, worker_slot};

fn sweep_failed() {
    panic!("sweep failed for {}", SecurityContextHolder::context());
}

#[test]
fn delayed_task_runs_with_the_bound_context_after_the_delay() {
    let pool = single_worker_pool();
    let executor: DelegatingSecurityContextScheduledExecutorService<_> =
        ContextScheduledExecutorService::with_context(
            Arc::clone(&pool),
            SecurityContext::for_principal("nightly"),
            SecurityContextOps,
        );
    let (tx, rx) = mpsc::channel();
    let started = Instant::now();

    let handle = executor
        .schedule(
            Box::new(move || {
                tx.send(SecurityContextHolder::context().principal().map(str::to_string))
                    .unwrap();
            }),
            Duration::from_millis(80),
        )
        .unwrap();
    handle.wait().unwrap();

    assert!(started.elapsed() >= Duration::from_millis(80));
    assert_eq!(rx.recv_timeout(WAIT).unwrap().as_deref(), Some("nightly"));
    assert_eq!(worker_slot(&pool), None);
}

#[test]
fn fixed_rate_runs_keep_the_context_and_stop_on_cancel() {
    let pool = single_worker_pool();
    let ops = tenant_ops();
    ops.set_current(Tenant::new("billing"));
    let executor = ContextScheduledExecutorService::new(Arc::clone(&pool), ops);
    let (tx, rx) = mpsc::channel();

    let handle = executor
        .schedule_at_fixed_rate(
            Box::new(move || {
                let _ = tx.send(tenant_ops().current());
            }),
            Duration::from_millis(5),
            Duration::from_millis(10),
        )
        .unwrap();
    ops.clear_current();

    for _ in 0..3 {
        assert_eq!(rx.recv_timeout(WAIT).unwrap(), Tenant::new("billing"));
    }
    handle.cancel();
    assert!(matches!(handle.wait(), Err(TaskFailure::Cancelled)));
}

#[test]
fn periodic_panic_completes_the_handle_with_the_failure() {
    let pool = single_worker_pool();
    let executor = ContextScheduledExecutorService::with_context(
        Arc::clone(&pool),
        SecurityContext::for_principal("janitor"),
        SecurityContextOps,
    );

    let handle = executor
        .schedule_with_fixed_delay(
            Box::new(sweep_failed),
            Duration::ZERO,
            Duration::from_millis(5),
        )
        .unwrap();

    assert!(matches!(
        handle.wait(),
        Err(TaskFailure::Panicked(message)) if message == "sweep failed for janitor"
    ));
    assert_eq!(worker_slot(&pool), None);
}

#[test]
fn scheduling_adapter_over_the_pool() {
    let pool = BlockingPool::new(&PoolConfig {
        max_threads: 1,
        prefers_short_lived_tasks: false,
        ..PoolConfig::default()
    })
    .unwrap();
    SecurityContextHolder::set_context(SecurityContext::for_principal("operator"));
    let executor = delegating_scheduling_task_executor(pool, None);

    let seen = executor
        .submit_callable(principal())
        .unwrap()
        .wait()
        .unwrap();
    let (tx, rx) = mpsc::channel();
    executor
        .submit_task(Box::new(move || {
            tx.send(SecurityContextHolder::context().principal().map(str::to_string))
                .unwrap();
        }))
        .unwrap()
        .wait()
        .unwrap();
    SecurityContextHolder::clear_context();

    assert_eq!(seen.as_deref(), Some("operator"));
    assert_eq!(rx.recv_timeout(WAIT).unwrap().as_deref(), Some("operator"));
    assert!(!executor.prefers_short_lived_tasks());
}

#[test]
fn async_task_executor_over_the_pool() {
    let pool = single_worker_pool();
    let executor: DelegatingSecurityContextAsyncTaskExecutor<_> =
        ContextAsyncTaskExecutor::with_context(
            Arc::clone(&pool),
            SecurityContext::for_principal("uploader"),
            SecurityContextOps,
        );
    let (tx, rx) = mpsc::channel();

    let seen = executor
        .submit_callable(principal())
        .unwrap()
        .wait()
        .unwrap();
    executor
        .submit_task(Box::new(move || {
            tx.send(SecurityContextHolder::context().principal().map(str::to_string))
                .unwrap();
        }))
        .unwrap()
        .wait()
        .unwrap();

    assert_eq!(seen.as_deref(), Some("uploader"));
    assert_eq!(rx.recv_timeout(WAIT).unwrap().as_deref(), Some("uploader"));
    assert_eq!(worker_slot(&pool), None);
}
