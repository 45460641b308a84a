//! Shared configuration for the batch-apply subsystem.

/// Ceiling the downstream configuration service tolerates. Raising this
/// has historically produced timeouts and partial writes.
pub const DEFAULT_APPLY_CONCURRENCY: usize = 3;

#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Maximum number of update calls in flight simultaneously.
    /// Always at least 1.
    pub concurrency_limit: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: DEFAULT_APPLY_CONCURRENCY,
        }
    }
}

impl BatchConfig {
    pub fn new(concurrency_limit: usize) -> Self {
        Self {
            concurrency_limit: concurrency_limit.max(1),
        }
    }

    pub fn from_env() -> Self {
        let limit = std::env::var("APDEX_APPLY_CONCURRENCY")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_APPLY_CONCURRENCY);

        Self::new(limit)
    }
}
