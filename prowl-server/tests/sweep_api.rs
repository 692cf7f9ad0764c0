//! End-to-end tests for the control surface, using deterministic scan
//! units so no test depends on simulated network pacing.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{Value, json};
use tokio::sync::{Mutex, mpsc};
use tokio::time::{sleep, timeout};

use prowl_core::{
    JobController, JobState, LogBuffer, ProbeOutcome, ScanConfig, ScanUnit,
    SweepError, Target,
};
use prowl_server::{
    infra::{app_state::AppState, config::Config},
    routes,
};

/// Immediate, deterministic scan unit: fixed targets per page, alternating
/// probe outcomes.
struct InstantSweep {
    targets_per_page: usize,
}

#[async_trait]
impl ScanUnit for InstantSweep {
    async fn fetch_page(
        &self,
        page: u32,
        _config: &ScanConfig,
    ) -> Result<Vec<Target>, SweepError> {
        Ok((0..self.targets_per_page)
            .map(|i| Target::new(format!("192.0.2.{page}"), 8000 + i as u16))
            .collect())
    }

    async fn probe(&self, target: &Target) -> Result<ProbeOutcome, SweepError> {
        Ok(if target.port % 2 == 0 {
            ProbeOutcome::Alive
        } else {
            ProbeOutcome::Dead
        })
    }
}

/// Scan unit whose page fetches block until the test sends a permit.
struct GatedSweep {
    gate: Mutex<mpsc::UnboundedReceiver<()>>,
}

impl GatedSweep {
    fn new() -> (Self, mpsc::UnboundedSender<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                gate: Mutex::new(rx),
            },
            tx,
        )
    }
}

#[async_trait]
impl ScanUnit for GatedSweep {
    async fn fetch_page(
        &self,
        page: u32,
        _config: &ScanConfig,
    ) -> Result<Vec<Target>, SweepError> {
        let _ = self.gate.lock().await.recv().await;
        Ok(vec![Target::new(format!("192.0.2.{page}"), 8080)])
    }

    async fn probe(&self, _target: &Target) -> Result<ProbeOutcome, SweepError> {
        Ok(ProbeOutcome::Alive)
    }
}

fn test_config() -> Arc<Config> {
    Arc::new(Config {
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        cors_allowed_origins: Vec::new(),
        log_capacity: 1000,
    })
}

fn test_server(sweep: Arc<dyn ScanUnit>) -> TestServer {
    let controller = Arc::new(JobController::with_parts(
        Arc::new(JobState::new()),
        Arc::new(LogBuffer::new()),
        sweep,
    ));
    let state = AppState::new(controller, test_config());
    TestServer::new(routes::create_router(state)).expect("test server")
}

fn start_body(page_count: u32) -> Value {
    json!({
        "api_type": "fofa",
        "page_count": page_count,
        "start_date": "2026-01-01",
    })
}

/// Polls `/api/logs` until `running` is false, returning the final body.
async fn wait_until_idle(server: &TestServer) -> Value {
    timeout(Duration::from_secs(5), async {
        loop {
            let body: Value = server.get("/api/logs").await.json();
            if body["running"] == json!(false) {
                return body;
            }
            sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .expect("job did not reach idle in time")
}

#[tokio::test(flavor = "multi_thread")]
async fn start_then_poll_shows_running_job() {
    let (sweep, permits) = GatedSweep::new();
    let server = test_server(Arc::new(sweep));

    let response = server.post("/api/start").json(&start_body(1)).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "success");

    let logs: Value = server.get("/api/logs").await.json();
    assert_eq!(logs["running"], json!(true));
    let first = logs["logs"][0].as_str().unwrap();
    assert!(first.contains("sweep started"));
    assert!(first.contains("pages=1"));

    permits.send(()).unwrap();
    wait_until_idle(&server).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_start_is_rejected_as_conflict() {
    let (sweep, permits) = GatedSweep::new();
    let server = test_server(Arc::new(sweep));

    server.post("/api/start").json(&start_body(1)).await.assert_status_ok();

    let response = server.post("/api/start").json(&start_body(3)).await;
    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "task already running");

    permits.send(()).unwrap();
    wait_until_idle(&server).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn stop_before_page_two_ends_with_user_stop() {
    let (sweep, permits) = GatedSweep::new();
    let server = test_server(Arc::new(sweep));

    server.post("/api/start").json(&start_body(2)).await.assert_status_ok();

    // Page 1 is in flight; request the stop, then let the fetch finish.
    let response = server.post("/api/stop").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "stopping");

    permits.send(()).unwrap();
    let logs = wait_until_idle(&server).await;

    let lines: Vec<&str> = logs["logs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|line| line.as_str().unwrap())
        .collect();
    assert!(lines.last().unwrap().ends_with("sweep stopped by user"));
    assert!(!lines.iter().any(|line| line.contains("fetching page 2")));
}

#[tokio::test(flavor = "multi_thread")]
async fn single_page_job_completes_naturally() {
    let server = test_server(Arc::new(InstantSweep { targets_per_page: 2 }));

    server.post("/api/start").json(&start_body(1)).await.assert_status_ok();
    let logs = wait_until_idle(&server).await;

    let lines = logs["logs"].as_array().unwrap();
    let last = lines.last().unwrap().as_str().unwrap();
    assert!(last.ends_with("sweep complete"));

    // Every line carries the "[HH:MM:SS] " prefix.
    for line in lines {
        let line = line.as_str().unwrap();
        assert_eq!(&line[0..1], "[");
        assert_eq!(&line[9..11], "] ");
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn stop_while_idle_is_an_acknowledged_no_op() {
    let server = test_server(Arc::new(InstantSweep { targets_per_page: 1 }));

    let response = server.post("/api/stop").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "stopping");

    let logs: Value = server.get("/api/logs").await.json();
    assert_eq!(logs["running"], json!(false));
    assert_eq!(logs["logs"].as_array().unwrap().len(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn restart_serves_only_the_new_job_log() {
    let server = test_server(Arc::new(InstantSweep { targets_per_page: 1 }));

    server.post("/api/start").json(&start_body(2)).await.assert_status_ok();
    wait_until_idle(&server).await;

    server.post("/api/start").json(&start_body(1)).await.assert_status_ok();
    let logs = wait_until_idle(&server).await;

    let lines: Vec<&str> = logs["logs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|line| line.as_str().unwrap())
        .collect();
    assert!(lines[0].contains("pages=1"));
    assert!(!lines.iter().any(|line| line.contains("fetching page 2")));
}
