pub mod apply;
pub mod counters;
pub mod engine;
pub mod errors;
pub mod outcome;
pub mod state;
pub mod types;

use std::sync::Arc;

use apdex::evaluate::evaluate;
use apdex::model::ApplicationRecord;
use nerdgraph::ConfigClient;

pub use apply::apply_suggestion;
pub use engine::BatchScheduler;
pub use errors::BatchError;
pub use outcome::{ApplyStatus, BatchReport, TaskOutcome};
pub use types::BatchConfig;

/// Evaluate a record set and push every actionable suggestion in one
/// bounded batch. This is the entry point the "apply all" action calls.
pub async fn apply_all<C: ConfigClient>(
    client: Arc<C>,
    records: &[ApplicationRecord],
    cfg: BatchConfig,
) -> Result<BatchReport, BatchError> {
    let tasks = evaluate(records);
    BatchScheduler::new(cfg, client).run(tasks).await
}
