
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use apdex::model::{AppGuid, ApplicationRecord, MetricKind, ThresholdPair, UpdateTask};
use scheduler::{ApplyStatus, BatchConfig, BatchError, BatchScheduler, apply_all};

use mock_client::MockConfigClient;

fn task(guid: &str, metric: MetricKind, target: f64) -> UpdateTask {
    UpdateTask {
        guid: AppGuid::new(guid),
        metric,
        target_value: target,
    }
}

fn tasks(n: usize) -> Vec<UpdateTask> {
    (0..n)
        .map(|i| {
            let metric = if i % 2 == 0 {
                MetricKind::Apm
            } else {
                MetricKind::Browser
            };
            task(&format!("app-{i}"), metric, 0.5 + i as f64 * 0.1)
        })
        .collect()
}

fn scheduler_with(client: MockConfigClient, limit: usize) -> (BatchScheduler<MockConfigClient>, Arc<MockConfigClient>) {
    let client = Arc::new(client);
    let engine = BatchScheduler::new(BatchConfig::new(limit), Arc::clone(&client));
    (engine, client)
}

#[tokio::test]
async fn seven_tasks_all_applied() {
    let (engine, client) =
        scheduler_with(MockConfigClient::new().with_latency(Duration::from_millis(5)), 3);

    let report = engine.run(tasks(7)).await.unwrap();

    assert_eq!(report.len(), 7);
    assert!(report.is_fully_applied());
    assert_eq!(client.calls.load(Ordering::SeqCst), 7);
}

#[tokio::test]
async fn in_flight_calls_never_exceed_the_limit() {
    let (engine, client) =
        scheduler_with(MockConfigClient::new().with_latency(Duration::from_millis(20)), 3);

    let report = engine.run(tasks(12)).await.unwrap();

    assert_eq!(report.len(), 12);
    assert!(
        client.peak_in_flight.load(Ordering::SeqCst) <= 3,
        "peak in-flight {} exceeded limit",
        client.peak_in_flight.load(Ordering::SeqCst)
    );
}

#[tokio::test]
async fn limit_of_one_serializes_all_calls() {
    let (engine, client) =
        scheduler_with(MockConfigClient::new().with_latency(Duration::from_millis(5)), 1);

    engine.run(tasks(5)).await.unwrap();

    assert_eq!(client.peak_in_flight.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn one_transport_failure_does_not_abort_the_batch() {
    let (engine, client) = scheduler_with(
        MockConfigClient::new()
            .with_latency(Duration::from_millis(5))
            .failing_on("app-1"),
        3,
    );

    let report = engine.run(tasks(4)).await.unwrap();

    assert_eq!(report.len(), 4, "failed task still produces an outcome");
    assert_eq!(report.count(ApplyStatus::Applied), 3);
    assert_eq!(report.count(ApplyStatus::Failed), 1);
    assert_eq!(client.calls.load(Ordering::SeqCst), 4);

    let failure = report
        .failures()
        .next()
        .expect("one failure expected");
    assert_eq!(failure.task.guid.as_str(), "app-1");
    assert!(
        failure
            .reason
            .as_deref()
            .unwrap()
            .contains("connection reset")
    );
}

#[tokio::test]
async fn multibyte_failure_text_still_yields_one_outcome_per_task() {
    // Byte 160 of the reason falls inside a multi-byte character; the
    // worker must survive truncation and still record the outcome.
    let long_reason = format!("{}не удалось обновить", "x".repeat(159));
    let (engine, client) = scheduler_with(
        MockConfigClient::new()
            .with_latency(Duration::from_millis(2))
            .failing_with("app-1", &long_reason),
        3,
    );

    let report = engine.run(tasks(3)).await.unwrap();

    assert_eq!(report.len(), 3);
    assert_eq!(report.count(ApplyStatus::Applied), 2);
    assert_eq!(report.count(ApplyStatus::Failed), 1);
    assert_eq!(client.calls.load(Ordering::SeqCst), 3);

    let failure = report.failures().next().unwrap();
    assert!(failure.reason.as_deref().unwrap().starts_with("ERR:"));
}

#[tokio::test]
async fn empty_batch_completes_without_remote_calls() {
    let (engine, client) = scheduler_with(MockConfigClient::new(), 3);

    let report = engine.run(Vec::new()).await.unwrap();

    assert!(report.is_empty());
    assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    assert!(engine.state().await.is_idle());
}

#[tokio::test]
async fn different_echo_is_reported_as_mismatch() {
    let (engine, _client) =
        scheduler_with(MockConfigClient::new().echoing("app-0", 0.5), 3);

    let report = engine
        .run(vec![task("app-0", MetricKind::Apm, 0.8)])
        .await
        .unwrap();

    assert_eq!(report.len(), 1);
    assert_eq!(report.outcomes()[0].status, ApplyStatus::Mismatch);
    assert_eq!(report.outcomes()[0].stored_value, Some(0.5));
}

#[tokio::test]
async fn service_rejection_is_reported_as_failed() {
    let (engine, _client) = scheduler_with(MockConfigClient::new().rejecting("app-0"), 3);

    let report = engine
        .run(vec![task("app-0", MetricKind::Browser, 2.5)])
        .await
        .unwrap();

    assert_eq!(report.outcomes()[0].status, ApplyStatus::Failed);
    assert!(
        report.outcomes()[0]
            .reason
            .as_deref()
            .unwrap()
            .contains("value out of range")
    );
}

#[tokio::test]
async fn outcome_count_matches_task_count_under_mixed_failures() {
    let (engine, _client) = scheduler_with(
        MockConfigClient::new()
            .with_latency(Duration::from_millis(2))
            .failing_on("app-2")
            .failing_on("app-7")
            .echoing("app-4", 99.0),
        3,
    );

    let report = engine.run(tasks(10)).await.unwrap();

    assert_eq!(report.len(), 10);
    assert_eq!(report.count(ApplyStatus::Failed), 2);
    assert_eq!(report.count(ApplyStatus::Mismatch), 1);
    assert_eq!(report.count(ApplyStatus::Applied), 7);

    let counters = engine.counters();
    assert_eq!(counters.applied.load(Ordering::SeqCst), 7);
    assert_eq!(counters.mismatched.load(Ordering::SeqCst), 1);
    assert_eq!(counters.failed.load(Ordering::SeqCst), 2);
    assert_eq!(counters.in_flight.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn second_run_is_rejected_while_a_batch_is_in_progress() {
    let (engine, _client) =
        scheduler_with(MockConfigClient::new().with_latency(Duration::from_millis(50)), 2);
    let engine = Arc::new(engine);

    let first = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move { engine.run(tasks(6)).await })
    };

    // Give the first batch time to enter Running.
    tokio::time::sleep(Duration::from_millis(10)).await;

    let second = engine.run(tasks(2)).await;
    assert!(matches!(second, Err(BatchError::NotIdle)));

    let report = first.await.unwrap().unwrap();
    assert_eq!(report.len(), 6);
}

#[tokio::test]
async fn scheduler_is_reusable_after_drain() {
    let (engine, client) =
        scheduler_with(MockConfigClient::new().with_latency(Duration::from_millis(2)), 3);

    let first = engine.run(tasks(3)).await.unwrap();
    assert_eq!(first.len(), 3);
    assert!(engine.state().await.is_idle());

    let second = engine.run(tasks(4)).await.unwrap();
    assert_eq!(second.len(), 4);
    assert_eq!(client.calls.load(Ordering::SeqCst), 7);
}

#[tokio::test]
async fn apply_all_evaluates_and_pushes_in_one_pass() {
    let records = vec![
        ApplicationRecord {
            guid: AppGuid::new("X"),
            language: "java".into(),
            apm: ThresholdPair {
                current: Some(0.5),
                suggested: Some(0.8),
            },
            browser: ThresholdPair::default(),
        },
        // php apm suggestion must be skipped, not pushed.
        ApplicationRecord {
            guid: AppGuid::new("Y"),
            language: "php".into(),
            apm: ThresholdPair {
                current: Some(0.5),
                suggested: Some(0.9),
            },
            browser: ThresholdPair {
                current: Some(7.0),
                suggested: Some(2.5),
            },
        },
    ];

    let client = Arc::new(MockConfigClient::new());
    let report = apply_all(Arc::clone(&client), &records, BatchConfig::default())
        .await
        .unwrap();

    assert_eq!(report.len(), 2);
    assert!(report.is_fully_applied());

    let mut applied: Vec<(String, MetricKind)> = report
        .outcomes()
        .iter()
        .map(|o| (o.task.guid.as_str().to_string(), o.task.metric))
        .collect();
    applied.sort_by(|a, b| a.0.cmp(&b.0));

    assert_eq!(
        applied,
        vec![
            ("X".to_string(), MetricKind::Apm),
            ("Y".to_string(), MetricKind::Browser),
        ]
    );
}
