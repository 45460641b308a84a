use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::outcome::ApplyStatus;

/// Minimal counters for operational visibility. Shared by clone; does
/// not affect scheduling behavior.
#[derive(Clone, Default)]
pub struct Counters {
    pub applied: Arc<AtomicU64>,
    pub mismatched: Arc<AtomicU64>,
    pub failed: Arc<AtomicU64>,

    pub in_flight: Arc<AtomicU64>,
    pub in_flight_peak: Arc<AtomicU64>,
}

impl Counters {
    pub(crate) fn enter_flight(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.in_flight_peak.fetch_max(now, Ordering::SeqCst);
    }

    pub(crate) fn exit_flight(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    pub(crate) fn record(&self, status: ApplyStatus) {
        let counter = match status {
            ApplyStatus::Applied => &self.applied,
            ApplyStatus::Mismatch => &self.mismatched,
            ApplyStatus::Failed => &self.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}
