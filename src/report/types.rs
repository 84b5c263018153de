use crate::runner::state::{CheckReport, RunState, RunStatus, RunSummary};
use serde::{Deserialize, Serialize};

/// Results of one bridged run, as saved and rendered
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResults {
    pub run_id: String,
    pub page: String,
    pub browser: String,
    pub status: RunStatus,
    pub checks: Vec<CheckReport>,
    pub summary: RunSummary,
    /// Why the session ended early, if it did
    pub error: Option<String>,
    pub generated_at: String,
}

impl TestResults {
    pub fn from_run(run: &RunState) -> Self {
        Self {
            run_id: run.run_id.clone(),
            page: run.page.clone(),
            browser: run.browser.clone(),
            status: run.status(),
            checks: run.checks.clone(),
            summary: run.summary(),
            error: run.error.clone(),
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}
