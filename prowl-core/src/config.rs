//! Per-job sweep parameters.

use serde::{Deserialize, Serialize};

/// Configuration for one sweep job.
///
/// Consumed once at start time and discarded when the job ends. The fields
/// are passed through to the [`ScanUnit`](crate::sweep::ScanUnit) unchanged;
/// validating them is the scan unit's concern, not the controller's.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Which upstream source to sweep.
    pub api_type: String,
    /// Number of source pages to walk, starting at page 1.
    pub page_count: u32,
    /// Date the sweep should cover from, as supplied by the caller.
    pub start_date: String,
}
