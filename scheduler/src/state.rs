//! Batch lifecycle state.
//!
//! `Idle → Running` on the first dispatch, `Running → Draining` once the
//! queue is empty while workers finish their in-flight calls, and back
//! to `Idle` when the drain signal fires.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchState {
    #[default]
    Idle,
    Running,
    Draining,
}

impl BatchState {
    pub fn is_idle(&self) -> bool {
        matches!(self, BatchState::Idle)
    }
}
