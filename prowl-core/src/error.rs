use thiserror::Error;

/// Errors the controller reports synchronously to the control surface.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlError {
    /// A start request arrived while a job was still active. No state
    /// changes; the caller is expected to retry after the job finishes.
    #[error("task already running")]
    AlreadyRunning,
}

/// Unrecoverable faults raised by a [`ScanUnit`](crate::sweep::ScanUnit).
///
/// A target that fails its probe is an expected outcome and is *not* a
/// `SweepError`; these are for the unit of work itself breaking down. They
/// are caught at the run-loop boundary, logged, and end the job.
#[derive(Error, Debug)]
pub enum SweepError {
    /// The upstream source could not produce a page.
    #[error("upstream source failed: {0}")]
    Upstream(String),

    /// A probe could not be carried out at all.
    #[error("probe failed: {0}")]
    Probe(String),
}
