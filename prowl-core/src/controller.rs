//! The job lifecycle controller and its run loop.

use std::fmt;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::ScanConfig;
use crate::error::ControlError;
use crate::log::{LogBuffer, LogEntry, Severity};
use crate::state::JobState;
use crate::sweep::{ProbeOutcome, ScanUnit};

/// Point-in-time view of the job handed to pollers. Pure read; taking one
/// has no side effects.
#[derive(Debug, Clone)]
pub struct JobSnapshot {
    /// Whether a run loop currently owns execution.
    pub running: bool,
    /// The log buffer contents at snapshot time, oldest first.
    pub entries: Vec<LogEntry>,
}

/// Orchestrates the single sweep job: start, stop, poll.
///
/// The controller owns exactly one [`JobState`] and one [`LogBuffer`], both
/// injected so tests can observe them directly. A start that wins the
/// activation gate resets the log and spawns the run loop as a detached
/// task; the caller never waits on it. The spawn is tied strictly to the
/// gate, and the previous loop's handle is only ever replaced under the
/// handle lock, so a second start can never own a second loop.
///
/// Stopping is cooperative: [`JobController::stop`] flips the cancellation
/// flag and returns, and the run loop exits at its next checkpoint. Callers
/// confirm termination by polling until `running` is false.
pub struct JobController {
    state: Arc<JobState>,
    logs: Arc<LogBuffer>,
    sweep: Arc<dyn ScanUnit>,
    run_handle: Mutex<Option<JoinHandle<()>>>,
}

impl JobController {
    /// Creates a controller with fresh state and a default-capacity log.
    #[must_use]
    pub fn new(sweep: Arc<dyn ScanUnit>) -> Self {
        Self::with_parts(
            Arc::new(JobState::new()),
            Arc::new(LogBuffer::new()),
            sweep,
        )
    }

    /// Creates a controller from explicitly owned parts.
    #[must_use]
    pub fn with_parts(
        state: Arc<JobState>,
        logs: Arc<LogBuffer>,
        sweep: Arc<dyn ScanUnit>,
    ) -> Self {
        Self {
            state,
            logs,
            sweep,
            run_handle: Mutex::new(None),
        }
    }

    /// The job state this controller drives.
    #[must_use]
    pub fn state(&self) -> &Arc<JobState> {
        &self.state
    }

    /// The log buffer this controller writes.
    #[must_use]
    pub fn logs(&self) -> &Arc<LogBuffer> {
        &self.logs
    }

    /// Starts a sweep job, or reports [`ControlError::AlreadyRunning`].
    ///
    /// On success the old log is cleared, a job-started entry summarizing
    /// the configuration is appended, and the run loop is spawned in the
    /// background; this method returns without waiting for any of the work.
    pub async fn start(&self, config: ScanConfig) -> Result<(), ControlError> {
        // Hold the handle slot across the gate so racing starts serialize
        // here and the spawn below is only ever reached by the gate winner.
        let mut run_handle = self.run_handle.lock().await;
        if !self.state.try_activate() {
            return Err(ControlError::AlreadyRunning);
        }

        self.logs.reset().await;
        self.logs
            .append(
                format!(
                    "sweep started: source={}, pages={}, from {}",
                    config.api_type, config.page_count, config.start_date
                ),
                Severity::Info,
            )
            .await;

        let epoch = self.state.epoch();
        debug!(epoch, pages = config.page_count, "spawning sweep run loop");

        let state = Arc::clone(&self.state);
        let logs = Arc::clone(&self.logs);
        let sweep = Arc::clone(&self.sweep);
        *run_handle = Some(tokio::spawn(async move {
            run_loop(state, logs, sweep, config, epoch).await;
        }));

        Ok(())
    }

    /// Requests cooperative cancellation and returns immediately.
    ///
    /// Idempotent, and a no-op success when no job is active. This is a
    /// request, not a guarantee of immediate halt: the run loop observes
    /// the flag at its next checkpoint.
    pub async fn stop(&self) {
        self.state.request_stop();
    }

    /// Snapshot of the running flag and the log buffer.
    pub async fn poll(&self) -> JobSnapshot {
        JobSnapshot {
            running: self.state.is_active(),
            entries: self.logs.snapshot().await,
        }
    }
}

impl fmt::Debug for JobController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobController")
            .field("active", &self.state.is_active())
            .finish_non_exhaustive()
    }
}

/// How the page walk ended.
enum RunOutcome {
    /// Every page was exhausted without a stop request.
    Completed,
    /// A stop request was observed at a checkpoint.
    Stopped,
    /// The scan unit raised an unrecoverable fault (already logged).
    Faulted,
}

/// Deactivates the job state when dropped, so the flag cannot be left stuck
/// active no matter how the run loop unwinds.
struct DeactivateOnExit<'a>(&'a JobState);

impl Drop for DeactivateOnExit<'_> {
    fn drop(&mut self) {
        self.0.deactivate();
    }
}

async fn run_loop(
    state: Arc<JobState>,
    logs: Arc<LogBuffer>,
    sweep: Arc<dyn ScanUnit>,
    config: ScanConfig,
    epoch: u64,
) {
    // Sole path back to idle, taken after the trailing log entry below.
    let _guard = DeactivateOnExit(&state);

    match walk_pages(&state, &logs, sweep.as_ref(), &config).await {
        RunOutcome::Completed => {
            info!(epoch, "sweep completed");
            logs.append("sweep complete", Severity::Success).await;
        }
        RunOutcome::Stopped => {
            info!(epoch, "sweep stopped by user");
            logs.append("sweep stopped by user", Severity::Warning).await;
        }
        // The fault entry is already the trailing log line.
        RunOutcome::Faulted => {}
    }
}

async fn walk_pages(
    state: &JobState,
    logs: &LogBuffer,
    sweep: &dyn ScanUnit,
    config: &ScanConfig,
) -> RunOutcome {
    for page in 1..=config.page_count {
        // Checkpoint A: between pages.
        if state.is_stop_requested() {
            return RunOutcome::Stopped;
        }

        logs.append(format!("fetching page {page}..."), Severity::Info)
            .await;

        let targets = match sweep.fetch_page(page, config).await {
            Ok(targets) => targets,
            Err(err) => {
                warn!(page, error = %err, "sweep page fetch faulted");
                logs.append(
                    format!("sweep failed on page {page}: {err}"),
                    Severity::Error,
                )
                .await;
                return RunOutcome::Faulted;
            }
        };

        logs.append(
            format!("found {} targets, probing...", targets.len()),
            Severity::Info,
        )
        .await;

        for target in &targets {
            // Checkpoint B: between probes.
            if state.is_stop_requested() {
                return RunOutcome::Stopped;
            }

            match sweep.probe(target).await {
                Ok(ProbeOutcome::Alive) => {
                    logs.append(format!("{target} ✓ (alive)"), Severity::Success)
                        .await;
                }
                Ok(ProbeOutcome::Dead) => {
                    logs.append(format!("{target} ✗ (dead)"), Severity::Error)
                        .await;
                }
                Err(err) => {
                    warn!(%target, error = %err, "probe faulted");
                    logs.append(
                        format!("probe fault on {target}: {err}"),
                        Severity::Error,
                    )
                    .await;
                    return RunOutcome::Faulted;
                }
            }
        }
    }

    RunOutcome::Completed
}
