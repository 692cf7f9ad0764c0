//! # Prowl Core
//!
//! Job lifecycle for the prowl sweep service.
//!
//! A sweep job walks a paged upstream source, probes every target the source
//! lists, and reports progress through an in-memory log that pollers read.
//! This crate owns the parts with real invariants:
//!
//! - [`JobController`]: starts, cancels, and drives the single run loop
//! - [`JobState`]: the single-flight gate and cooperative cancellation flag
//! - [`LogBuffer`]: bounded, ordered progress log shared with pollers
//! - [`ScanUnit`]: the seam behind which the actual page/probe work lives
//!
//! The HTTP surface lives in `prowl-server`; nothing here touches the
//! network except through a [`ScanUnit`] implementation.

pub mod config;
pub mod controller;
pub mod error;
pub mod log;
pub mod state;
pub mod sweep;

pub use config::ScanConfig;
pub use controller::{JobController, JobSnapshot};
pub use error::{ControlError, SweepError};
pub use log::{LogBuffer, LogEntry, Severity};
pub use state::JobState;
pub use sweep::{ProbeOutcome, ScanUnit, SimulatedSweep, SweepTiming, Target};
