//! Wire types for the control surface.

use prowl_core::ScanConfig;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/start`.
#[derive(Debug, Clone, Deserialize)]
pub struct StartRequest {
    pub api_type: String,
    pub page_count: u32,
    pub start_date: String,
}

impl From<StartRequest> for ScanConfig {
    fn from(request: StartRequest) -> Self {
        Self {
            api_type: request.api_type,
            page_count: request.page_count,
            start_date: request.start_date,
        }
    }
}

/// Uniform `{status, message}` envelope for the command endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct CommandResponse {
    pub status: String,
    pub message: String,
}

impl CommandResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
        }
    }
}

/// Response of `GET /api/logs`, polled by clients at arbitrary frequency.
#[derive(Debug, Clone, Serialize)]
pub struct LogsResponse {
    pub running: bool,
    pub logs: Vec<String>,
}
