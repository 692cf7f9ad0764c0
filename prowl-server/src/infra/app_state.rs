use std::{fmt, sync::Arc};

use prowl_core::JobController;

use crate::infra::config::Config;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<JobController>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(controller: Arc<JobController>, config: Arc<Config>) -> Self {
        Self { controller, config }
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
