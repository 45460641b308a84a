//! Per-task outcomes and the aggregated batch report.

use std::fmt;

use tokio::sync::mpsc::Receiver;

use apdex::model::UpdateTask;

/// Classification of one attempted update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyStatus {
    /// The service echoed back exactly the requested value.
    Applied,
    /// The call completed but the service did not confirm the requested
    /// value (different echo, or no echo at all).
    Mismatch,
    /// The call could not complete, or the service rejected it.
    Failed,
}

impl ApplyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplyStatus::Applied => "applied",
            ApplyStatus::Mismatch => "mismatch",
            ApplyStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for ApplyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of attempting one update task. Every dispatched task produces
/// exactly one of these, failures included.
#[derive(Debug, Clone)]
pub struct TaskOutcome {
    pub task: UpdateTask,
    pub status: ApplyStatus,
    pub stored_value: Option<f64>,
    /// Normalized failure description for diagnostics.
    pub reason: Option<String>,
}

impl TaskOutcome {
    pub(crate) fn applied(task: UpdateTask, stored: f64) -> Self {
        Self {
            task,
            status: ApplyStatus::Applied,
            stored_value: Some(stored),
            reason: None,
        }
    }

    pub(crate) fn mismatch(task: UpdateTask, stored: Option<f64>) -> Self {
        Self {
            task,
            status: ApplyStatus::Mismatch,
            stored_value: stored,
            reason: None,
        }
    }

    pub(crate) fn failed(task: UpdateTask, reason: impl Into<String>) -> Self {
        Self {
            task,
            status: ApplyStatus::Failed,
            stored_value: None,
            reason: Some(reason.into()),
        }
    }
}

/// Aggregated outcomes of one drained batch.
///
/// Collection ends when the outcome channel closes, which happens only
/// after every worker has exited; that closure is the drain signal, so a
/// report is constructed exactly once per run and holds one outcome per
/// input task.
#[derive(Debug, Default)]
pub struct BatchReport {
    outcomes: Vec<TaskOutcome>,
}

impl BatchReport {
    pub(crate) fn empty() -> Self {
        Self::default()
    }

    pub(crate) async fn collect(mut rx: Receiver<TaskOutcome>, expected: usize) -> Self {
        let mut outcomes = Vec::with_capacity(expected);

        while let Some(outcome) = rx.recv().await {
            outcomes.push(outcome);
        }

        debug_assert_eq!(outcomes.len(), expected, "one outcome per task");

        Self { outcomes }
    }

    pub fn outcomes(&self) -> &[TaskOutcome] {
        &self.outcomes
    }

    pub fn into_outcomes(self) -> Vec<TaskOutcome> {
        self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn count(&self, status: ApplyStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    pub fn is_fully_applied(&self) -> bool {
        self.outcomes
            .iter()
            .all(|o| o.status == ApplyStatus::Applied)
    }

    /// Outcomes the caller should surface as failure notices
    /// (`mismatch` and `failed` alike).
    pub fn failures(&self) -> impl Iterator<Item = &TaskOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.status != ApplyStatus::Applied)
    }
}
