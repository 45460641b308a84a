use tracing::{Span, field};

use super::TraceId;

/// Root span for one apply batch. Per-task fields are recorded later by
/// whoever owns the span.
pub fn batch_span(name: &'static str, trace_id: &TraceId) -> Span {
    tracing::info_span!(
        "batch",
        name = %name,
        trace_id = %trace_id.as_str(),
        guid = field::Empty,
        metric = field::Empty
    )
}

/// Child span (inherits trace_id from the current batch span).
pub fn child_span(name: &'static str) -> Span {
    tracing::info_span!("child", name = %name)
}
