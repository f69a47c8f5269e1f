//! What the wrappers hand to their delegate: decorated tasks, everything else untouched.

use std::sync::mpsc;
use std::time::Duration;

use ferry_core::{
    AsyncTaskExecutor, BoxCallable, ContextExecutor, ContextOps, ContextSchedulingTaskExecutor,
    Executor, ExecutorError, ExecutorService, ScheduledExecutorService, SchedulingTaskExecutor,
    Task, TaskFailure, named,
};

use crate::common::{Call, Recorder, Tenant, tenant_ops};

fn current_tenant() -> BoxCallable<Tenant> {
    Box::new(|| -> anyhow::Result<Tenant> { Ok(tenant_ops().current()) })
}

fn report_tenant(tx: &mpsc::Sender<Tenant>) -> Task {
    let tx = tx.clone();
    Box::new(move || tx.send(tenant_ops().current()).unwrap())
}

#[test]
fn absent_batch_is_forwarded_as_absent() {
    let executor = ContextExecutor::new(Recorder::default(), tenant_ops());

    executor.invoke_all::<Tenant>(None).unwrap();
    executor.invoke_all::<Tenant>(Some(Vec::new())).unwrap();
    let _ = executor.invoke_any::<Tenant>(None);

    assert_eq!(
        executor.delegate().calls(),
        vec![
            Call::InvokeAll(None, None),
            Call::InvokeAll(Some(0), None),
            Call::InvokeAny(None, None),
        ]
    );
}

#[test]
fn timeouts_pass_through_unchanged() {
    let executor = ContextExecutor::new(Recorder::default(), tenant_ops());
    let timeout = Duration::from_millis(1234);

    executor
        .invoke_all_timeout(Some(vec![current_tenant()]), timeout)
        .unwrap();
    executor
        .invoke_any_timeout(Some(vec![current_tenant(), current_tenant()]), timeout)
        .unwrap();

    assert_eq!(
        executor.delegate().calls(),
        vec![
            Call::InvokeAll(Some(1), Some(timeout)),
            Call::InvokeAny(Some(2), Some(timeout)),
        ]
    );
}

#[test]
fn bulk_elements_share_the_submission_snapshot() {
    let ops = tenant_ops();
    let executor = ContextExecutor::new(Recorder::default(), ops);
    ops.set_current(Tenant::new("acme"));

    let outcomes = executor
        .invoke_all(Some(vec![current_tenant(), current_tenant(), current_tenant()]))
        .unwrap();
    let any = executor
        .invoke_any(Some(vec![current_tenant()]))
        .unwrap();
    ops.clear_current();

    for outcome in outcomes {
        assert_eq!(outcome.unwrap(), Tenant::new("acme"));
    }
    assert_eq!(any, Tenant::new("acme"));
}

#[test]
fn lifecycle_calls_reach_the_delegate() {
    let recorder = Recorder::default();
    recorder.leave_behind(Box::new(named("unstarted", || {})));
    let executor = ContextExecutor::new(recorder, tenant_ops());

    assert!(!executor.is_shutdown());
    executor.shutdown();
    let leftover = executor.shutdown_now();
    assert!(executor.is_terminated());
    assert!(executor.await_termination(Duration::from_secs(3)));

    assert_eq!(leftover.len(), 1);
    assert_eq!(leftover[0].describe(), "unstarted");
    assert_eq!(
        executor.delegate().calls(),
        vec![
            Call::IsShutdown,
            Call::Shutdown,
            Call::ShutdownNow,
            Call::IsTerminated,
            Call::AwaitTermination(Duration::from_secs(3)),
        ]
    );
}

#[test]
fn single_submissions_are_decorated() {
    let ops = tenant_ops();
    let executor = ContextExecutor::with_context(Recorder::default(), Tenant::new("bound"), ops);
    let (tx, rx) = mpsc::channel();

    executor.execute(report_tenant(&tx)).unwrap();
    executor.submit_runnable(report_tenant(&tx)).unwrap().wait().unwrap();
    let marker = executor
        .submit_with_result(report_tenant(&tx), 7)
        .unwrap()
        .wait()
        .unwrap();
    let seen = executor.submit(current_tenant()).unwrap().wait().unwrap();

    assert_eq!(marker, 7);
    assert_eq!(seen, Tenant::new("bound"));
    assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![Tenant::new("bound"); 3]);
    assert!(!ops.is_set());
    assert_eq!(
        executor.delegate().calls(),
        vec![
            Call::Execute,
            Call::SubmitRunnable,
            Call::SubmitWithResult,
            Call::Submit,
        ]
    );
}

#[test]
fn scheduling_entry_points_forward_their_timing() {
    let executor = ContextExecutor::with_context(
        Recorder::default(),
        Tenant::new("cron"),
        tenant_ops(),
    );
    let (tx, rx) = mpsc::channel();
    let ms = Duration::from_millis;

    executor.schedule(report_tenant(&tx), ms(10)).unwrap();
    executor.schedule_callable(current_tenant(), ms(20)).unwrap();
    executor
        .schedule_at_fixed_rate(report_tenant(&tx), ms(1), ms(30))
        .unwrap();
    executor
        .schedule_with_fixed_delay(report_tenant(&tx), ms(2), ms(40))
        .unwrap();

    assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![Tenant::new("cron"); 3]);
    assert_eq!(
        executor.delegate().calls(),
        vec![
            Call::Schedule(ms(10)),
            Call::ScheduleCallable(ms(20)),
            Call::FixedRate(ms(1), ms(30)),
            Call::FixedDelay(ms(2), ms(40)),
        ]
    );
}

#[test]
fn rejection_is_not_intercepted() {
    let recorder = Recorder::default();
    recorder.reject_everything();
    let executor = ContextExecutor::new(recorder, tenant_ops());

    assert!(matches!(
        executor.execute(Box::new(|| {})),
        Err(ExecutorError::Rejected { .. })
    ));
    assert!(matches!(
        executor.submit(current_tenant()),
        Err(ExecutorError::Rejected { .. })
    ));
}

#[test]
fn task_failure_reaches_the_caller_unchanged() {
    let executor = ContextExecutor::new(Recorder::default(), tenant_ops());
    let failing: BoxCallable<Tenant> =
        Box::new(|| -> anyhow::Result<Tenant> { anyhow::bail!("tenant store offline") });

    let failure = executor.submit(failing).unwrap().wait().unwrap_err();

    assert!(matches!(
        failure,
        TaskFailure::Failed(err) if err.to_string() == "tenant store offline"
    ));
}

#[test]
fn scheduling_adapter_asks_the_delegate_every_time() {
    let executor = ContextSchedulingTaskExecutor::new(Recorder::default(), tenant_ops());

    executor.delegate().set_prefers_short_lived(false);
    assert!(!executor.prefers_short_lived_tasks());
    executor.delegate().set_prefers_short_lived(true);
    assert!(executor.prefers_short_lived_tasks());

    assert_eq!(
        executor.delegate().calls(),
        vec![Call::PrefersShortLived, Call::PrefersShortLived]
    );
}

#[test]
fn scheduling_adapter_decorates_submissions() {
    let ops = tenant_ops();
    ops.set_current(Tenant::new("caller"));
    let executor =
        ContextSchedulingTaskExecutor::with_context(Recorder::default(), Tenant::new("job"), ops);
    let (tx, rx) = mpsc::channel();

    executor.execute(report_tenant(&tx)).unwrap();
    executor.submit_task(report_tenant(&tx)).unwrap().wait().unwrap();
    let seen = executor
        .submit_callable(current_tenant())
        .unwrap()
        .wait()
        .unwrap();

    assert_eq!(seen, Tenant::new("job"));
    assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![Tenant::new("job"); 2]);
    assert_eq!(ops.current(), Tenant::new("caller"));
    assert_eq!(
        executor.delegate().calls(),
        vec![Call::Execute, Call::SubmitTask, Call::SubmitCallable]
    );
    ops.clear_current();
}
