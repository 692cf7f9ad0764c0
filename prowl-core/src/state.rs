//! Process-wide job lifecycle flag.

use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};

const IDLE: u8 = 0;
const RUNNING: u8 = 1;
const STOPPING: u8 = 2;

/// Lifecycle flag for the single sweep job, plus an epoch counter naming
/// which job instance owns execution.
///
/// At most one run loop may execute while the state is active.
/// [`JobState::try_activate`] is the single-flight gate: exactly one of any
/// number of racing callers wins. [`JobState::deactivate`] is the run loop's
/// sole way back to idle, taken on normal completion, cancellation, and
/// faults alike. The state is created idle, never destroyed, and reused
/// across jobs.
#[derive(Debug, Default)]
pub struct JobState {
    phase: AtomicU8,
    epoch: AtomicU64,
}

impl JobState {
    /// Creates an idle state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically transitions idle → running. Returns `false` when a job is
    /// already active, in which case nothing changes.
    pub fn try_activate(&self) -> bool {
        let won = self
            .phase
            .compare_exchange(IDLE, RUNNING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if won {
            self.epoch.fetch_add(1, Ordering::AcqRel);
        }
        won
    }

    /// Requests cooperative cancellation. Idempotent; no effect when idle.
    /// The run loop observes the flag at its checkpoints.
    pub fn request_stop(&self) {
        let _ = self.phase.compare_exchange(
            RUNNING,
            STOPPING,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    /// Unconditionally returns to idle. Called exactly once by the run loop
    /// as its final action.
    pub fn deactivate(&self) {
        self.phase.store(IDLE, Ordering::Release);
    }

    /// True while a job owns execution (running or winding down).
    pub fn is_active(&self) -> bool {
        self.phase.load(Ordering::Acquire) != IDLE
    }

    /// True once cancellation has been requested for the active job.
    pub fn is_stop_requested(&self) -> bool {
        self.phase.load(Ordering::Acquire) == STOPPING
    }

    /// Counter bumped on every successful activation.
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }
}
