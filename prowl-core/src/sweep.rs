//! The unit-of-work seam and the simulated sweep behind it.

use std::fmt;
use std::ops::RangeInclusive;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use crate::config::ScanConfig;
use crate::error::SweepError;

/// An endpoint discovered on a sweep page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Host portion, dotted-quad or name.
    pub host: String,
    /// Service port to probe.
    pub port: u16,
}

impl Target {
    /// Creates a target from host and port.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Result of probing a single target.
///
/// A dead target is an expected outcome the controller logs and moves past;
/// only a [`SweepError`] ends the job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The target answered and is usable.
    Alive,
    /// The target did not answer or is unusable.
    Dead,
}

/// The opaque unit of work a sweep job iterates over.
///
/// The controller only needs cardinality and outcomes: how many targets a
/// page yields and whether each probe passes. Real network scanning, rate
/// limiting, and source-specific parsing all live behind this trait. Calls
/// are the run loop's suspension points, so cancellation latency is bounded
/// by one page's remaining per-target work.
#[async_trait]
pub trait ScanUnit: Send + Sync {
    /// Fetches one page of the source and returns the targets it lists.
    async fn fetch_page(
        &self,
        page: u32,
        config: &ScanConfig,
    ) -> Result<Vec<Target>, SweepError>;

    /// Checks a single target.
    async fn probe(&self, target: &Target) -> Result<ProbeOutcome, SweepError>;
}

/// Pacing for [`SimulatedSweep`].
#[derive(Debug, Clone)]
pub struct SweepTiming {
    /// Delay simulating the page fetch round trip.
    pub page_delay: Duration,
    /// Per-probe delay, sampled uniformly.
    pub probe_delay: RangeInclusive<Duration>,
}

impl Default for SweepTiming {
    fn default() -> Self {
        Self {
            page_delay: Duration::from_millis(1500),
            probe_delay: Duration::from_millis(100)..=Duration::from_millis(500),
        }
    }
}

impl SweepTiming {
    /// Zero-delay pacing, for tests.
    #[must_use]
    pub const fn immediate() -> Self {
        Self {
            page_delay: Duration::ZERO,
            probe_delay: Duration::ZERO..=Duration::ZERO,
        }
    }
}

/// Synthetic sweep standing in for a real page fetcher and prober.
///
/// Each page yields 5–20 random `a.b.c.d:8080` targets after a simulated
/// network delay, and each probe flips a coin. Useful for exercising the
/// whole control surface without touching the network.
#[derive(Debug, Clone, Default)]
pub struct SimulatedSweep {
    timing: SweepTiming,
}

impl SimulatedSweep {
    /// Creates a sweep with production pacing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sweep with explicit pacing.
    #[must_use]
    pub const fn with_timing(timing: SweepTiming) -> Self {
        Self { timing }
    }
}

#[async_trait]
impl ScanUnit for SimulatedSweep {
    async fn fetch_page(
        &self,
        _page: u32,
        _config: &ScanConfig,
    ) -> Result<Vec<Target>, SweepError> {
        tokio::time::sleep(self.timing.page_delay).await;

        let mut rng = rand::rng();
        let count = rng.random_range(5..=20);
        let targets = (0..count)
            .map(|_| {
                Target::new(
                    format!(
                        "{}.{}.{}.{}",
                        rng.random_range(1..=255u8),
                        rng.random_range(1..=255u8),
                        rng.random_range(1..=255u8),
                        rng.random_range(1..=255u8),
                    ),
                    8080,
                )
            })
            .collect();
        Ok(targets)
    }

    async fn probe(&self, _target: &Target) -> Result<ProbeOutcome, SweepError> {
        // Sample outside the await so the rng never crosses a suspension.
        let (delay, alive) = {
            let mut rng = rand::rng();
            (
                rng.random_range(self.timing.probe_delay.clone()),
                rng.random_bool(0.5),
            )
        };
        tokio::time::sleep(delay).await;

        Ok(if alive {
            ProbeOutcome::Alive
        } else {
            ProbeOutcome::Dead
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> ScanConfig {
        ScanConfig {
            api_type: "fofa".to_string(),
            page_count: 1,
            start_date: "2026-01-01".to_string(),
        }
    }

    #[tokio::test]
    async fn simulated_pages_stay_within_the_advertised_cardinality() {
        let sweep = SimulatedSweep::with_timing(SweepTiming::immediate());
        for page in 1..=5 {
            let targets = sweep.fetch_page(page, &test_config()).await.unwrap();
            assert!((5..=20).contains(&targets.len()));
            assert!(targets.iter().all(|t| t.port == 8080));
        }
    }

    #[tokio::test]
    async fn simulated_probe_always_yields_an_outcome() {
        let sweep = SimulatedSweep::with_timing(SweepTiming::immediate());
        let target = Target::new("10.0.0.1", 8080);
        for _ in 0..8 {
            sweep.probe(&target).await.unwrap();
        }
    }

    #[test]
    fn target_displays_as_host_port() {
        assert_eq!(Target::new("1.2.3.4", 8080).to_string(), "1.2.3.4:8080");
    }
}
