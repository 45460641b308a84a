use thiserror::Error;

/// Batch-level failures. Per-task failures never surface here; they are
/// contained in their `TaskOutcome`.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("batch scheduler is not idle; a batch is already in progress")]
    NotIdle,
}
