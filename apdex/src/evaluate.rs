//! Decides which applications carry an actionable Apdex suggestion.
//
//  This module is deliberately pure: no async, no IO, never fails.
//  Absent or invalid fields are simply non-actionable.

use crate::model::{
    ApplicationRecord, MetricKind, SERVER_CONFIG_UNSUPPORTED_LANGUAGES, UpdateTask,
};

/// Result of an actionability check for one (record, metric) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actionability {
    Actionable,
    NoSuggestion,
    NotPositive,
    AlreadyApplied,
    AgentUnsupported,
}

impl Actionability {
    pub fn is_actionable(&self) -> bool {
        matches!(self, Actionability::Actionable)
    }
}

/// Check whether one metric family of a record has an applicable
/// suggestion.
///
/// A suggestion is actionable iff it is present, positive, and differs
/// from the currently configured value. APM additionally requires a
/// runtime whose agent accepts server-side configuration.
pub fn check_metric_actionability(record: &ApplicationRecord, metric: MetricKind) -> Actionability {
    let pair = record.thresholds(metric);

    let Some(suggested) = pair.suggested else {
        return Actionability::NoSuggestion;
    };

    // `!(> 0.0)` also rejects NaN.
    if !(suggested > 0.0) {
        return Actionability::NotPositive;
    }

    if metric == MetricKind::Apm
        && SERVER_CONFIG_UNSUPPORTED_LANGUAGES.contains(&record.language.as_str())
    {
        return Actionability::AgentUnsupported;
    }

    if pair.current == Some(suggested) {
        return Actionability::AlreadyApplied;
    }

    Actionability::Actionable
}

/// Derive the full batch of update tasks for a record set.
///
/// Emits zero, one, or two tasks per record, browser before apm within a
/// record, records in input order. The ordering exists for determinism;
/// the scheduler does not preserve it.
pub fn evaluate(records: &[ApplicationRecord]) -> Vec<UpdateTask> {
    let mut tasks = Vec::new();

    for record in records {
        for metric in [MetricKind::Browser, MetricKind::Apm] {
            if check_metric_actionability(record, metric).is_actionable() {
                // Actionable implies `suggested` is present.
                let Some(target_value) = record.thresholds(metric).suggested else {
                    continue;
                };

                tasks.push(UpdateTask {
                    guid: record.guid.clone(),
                    metric,
                    target_value,
                });
            }
        }
    }

    tasks
}
