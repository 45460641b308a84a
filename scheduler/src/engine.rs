//! The batch-apply engine.
//!
//! Responsibilities:
//! - attempt every queued update task exactly once against the remote
//!   configuration service
//! - cap in-flight calls at the configured ceiling
//! - isolate per-task failures so one bad call never stalls the rest
//! - resolve the batch exactly once, after the last outcome is recorded
//!
//! Non-responsibilities:
//! - deciding which tasks exist (the evaluator does that)
//! - user-facing notification (the caller maps the report)
//! - timeouts: a hung remote call occupies its worker slot for the
//!   remainder of the batch. Known gap; callers should bound requests
//!   at the client layer.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::sync::mpsc::{self, Sender};
use tracing::{Instrument, debug, info};

use apdex::model::UpdateTask;
use common::logger::{TraceId, batch_span, child_span};
use nerdgraph::ConfigClient;

use crate::apply::apply_suggestion;
use crate::counters::Counters;
use crate::errors::BatchError;
use crate::outcome::{ApplyStatus, BatchReport, TaskOutcome};
use crate::state::BatchState;
use crate::types::BatchConfig;

/// Pushes one batch of update tasks through a fixed-size worker pool.
///
/// The scheduler owns its queue and state; there is no process-wide
/// state. One instance runs one batch at a time and is reusable once
/// the previous batch has drained.
pub struct BatchScheduler<C: ConfigClient> {
    cfg: BatchConfig,
    client: Arc<C>,
    state: Arc<Mutex<BatchState>>,
    counters: Counters,
}

impl<C: ConfigClient> BatchScheduler<C> {
    pub fn new(cfg: BatchConfig, client: Arc<C>) -> Self {
        Self {
            cfg,
            client,
            state: Arc::new(Mutex::new(BatchState::Idle)),
            counters: Counters::default(),
        }
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    pub async fn state(&self) -> BatchState {
        *self.state.lock().await
    }

    /// Run one batch to completion.
    ///
    /// Every task is dispatched exactly once; the returned report holds
    /// exactly one outcome per input task, in completion order. Calling
    /// `run` while a batch is in progress is rejected.
    pub async fn run(&self, tasks: Vec<UpdateTask>) -> Result<BatchReport, BatchError> {
        {
            let mut state = self.state.lock().await;
            if !state.is_idle() {
                return Err(BatchError::NotIdle);
            }
            *state = BatchState::Running;
        }

        let report = self.drive(tasks).await;

        // Drain signal has fired; the scheduler can accept a new batch.
        *self.state.lock().await = BatchState::Idle;

        Ok(report)
    }

    async fn drive(&self, tasks: Vec<UpdateTask>) -> BatchReport {
        let total = tasks.len();
        let trace_id = TraceId::default();
        let span = batch_span("apply_batch", &trace_id);

        async {
            if total == 0 {
                info!("empty batch; nothing to apply");
                return BatchReport::empty();
            }

            let workers = self.cfg.concurrency_limit.max(1).min(total);
            let queue = Arc::new(Mutex::new(VecDeque::from(tasks)));
            let (out_tx, out_rx) = mpsc::channel::<TaskOutcome>(total);

            info!(total, workers, "starting apply batch");

            for worker_id in 0..workers {
                // Spawn loses the span context; re-attach the batch span
                // so worker events stay correlated to the trace_id.
                tokio::spawn(
                    worker_loop(
                        worker_id,
                        Arc::clone(&queue),
                        Arc::clone(&self.client),
                        Arc::clone(&self.state),
                        self.counters.clone(),
                        out_tx.clone(),
                    )
                    .instrument(tracing::Span::current()),
                );
            }

            // Workers hold the only senders; the channel closes when the
            // last worker exits, which is the drain signal.
            drop(out_tx);

            let report = BatchReport::collect(out_rx, total).await;

            info!(
                total,
                applied = report.count(ApplyStatus::Applied),
                mismatched = report.count(ApplyStatus::Mismatch),
                failed = report.count(ApplyStatus::Failed),
                "batch drained"
            );

            report
        }
        .instrument(span)
        .await
    }
}

/// One worker: dequeue, apply, record, repeat until the queue is empty.
///
/// Dequeue and outcome recording each happen atomically between await
/// points, so a task is never dispatched twice and never dropped.
async fn worker_loop<C: ConfigClient>(
    worker_id: usize,
    queue: Arc<Mutex<VecDeque<UpdateTask>>>,
    client: Arc<C>,
    state: Arc<Mutex<BatchState>>,
    counters: Counters,
    out_tx: Sender<TaskOutcome>,
) {
    loop {
        let task = { queue.lock().await.pop_front() };

        let Some(task) = task else {
            // Queue exhausted: the batch is draining while the remaining
            // in-flight calls finish.
            let mut st = state.lock().await;
            if *st == BatchState::Running {
                *st = BatchState::Draining;
            }
            break;
        };

        debug!(
            worker_id,
            guid = %task.guid,
            metric = %task.metric,
            target = task.target_value,
            "dispatching update"
        );

        counters.enter_flight();
        let outcome = apply_suggestion(client.as_ref(), &task)
            .instrument(child_span("apply_suggestion"))
            .await;
        counters.exit_flight();
        counters.record(outcome.status);

        debug!(
            worker_id,
            guid = %outcome.task.guid,
            metric = %outcome.task.metric,
            status = %outcome.status,
            "outcome recorded"
        );

        if out_tx.send(outcome).await.is_err() {
            // Collector gone; nothing left to report to.
            break;
        }
    }
}
