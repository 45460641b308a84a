//! Single-suggestion apply: dispatch one update, verify the echoed
//! value, classify the result.
//!
//! This function never fails. Transport errors, service rejections and
//! unconfirmed echoes all come back as a `TaskOutcome`; the caller gets
//! one outcome per task no matter what the remote side did.

use tracing::{debug, warn};

use apdex::model::{MetricKind, UpdateTask};
use nerdgraph::{ConfigClient, ThresholdUpdate};

use crate::outcome::TaskOutcome;

/// Apply one suggestion. Used by the batch engine for every dequeued
/// task and exposed standalone for the per-row "apply" action.
pub async fn apply_suggestion<C: ConfigClient>(client: &C, task: &UpdateTask) -> TaskOutcome {
    let result = match task.metric {
        MetricKind::Apm => client.set_apm_threshold(&task.guid, task.target_value).await,
        MetricKind::Browser => {
            client
                .set_browser_threshold(&task.guid, task.target_value)
                .await
        }
    };

    match result {
        Ok(update) => classify_update(task, update),
        Err(e) => {
            warn!(
                guid = %task.guid,
                metric = %task.metric,
                error = ?e,
                "threshold update call failed"
            );
            TaskOutcome::failed(task.clone(), normalize_reason(&e))
        }
    }
}

/// The echoed value decides the status. Values were coerced to numbers
/// at the deserialization boundary, so this comparison never trips over
/// string representations.
fn classify_update(task: &UpdateTask, update: ThresholdUpdate) -> TaskOutcome {
    if !update.errors.is_empty() {
        let reason = update
            .errors
            .iter()
            .map(|e| e.describe())
            .collect::<Vec<_>>()
            .join("; ");

        warn!(guid = %task.guid, metric = %task.metric, %reason, "service rejected update");
        return TaskOutcome::failed(task.clone(), reason);
    }

    match update.stored_value {
        Some(stored) if stored == task.target_value => {
            debug!(guid = %task.guid, metric = %task.metric, stored, "update applied");
            TaskOutcome::applied(task.clone(), stored)
        }
        stored => {
            warn!(
                guid = %task.guid,
                metric = %task.metric,
                requested = task.target_value,
                stored = ?stored,
                "service stored a different value"
            );
            TaskOutcome::mismatch(task.clone(), stored)
        }
    }
}

/// Normalizes transport errors into bounded strings.
fn normalize_reason(e: &anyhow::Error) -> String {
    const MAX: usize = 160;

    let s = e.to_string();
    if s.len() <= MAX {
        return s;
    }

    // Byte 160 may fall inside a multi-byte character; back up to the
    // nearest boundary so the slice cannot panic.
    let cut = (0..=MAX)
        .rev()
        .find(|&i| s.is_char_boundary(i))
        .unwrap_or(0);

    format!("ERR:{}", &s[..cut])
}
