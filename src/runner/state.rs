use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::bridge::{Check, TestState};

/// Outcome of one reportable check
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CheckStatus {
    Passed,
    Failed { message: String },
}

/// A drained test together with its asserted outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport {
    pub index: usize,
    pub name: String,
    pub title: Option<String>,
    pub state: TestState,
    pub status: CheckStatus,
    /// Time spent waiting for this test to show up
    pub duration_ms: u64,
}

impl CheckReport {
    pub fn from_check(check: &Check, duration_ms: u64) -> Self {
        let status = match check.assert() {
            Ok(()) => CheckStatus::Passed,
            Err(failure) => CheckStatus::Failed {
                message: failure.to_string(),
            },
        };

        Self {
            index: check.index,
            name: check.name(),
            title: check.title.clone(),
            state: check.state.clone(),
            status,
            duration_ms,
        }
    }

    pub fn passed(&self) -> bool {
        matches!(self.status, CheckStatus::Passed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Passed,
    Failed { passed: u32, failed: u32 },
    /// The session ended early; checks drained before that are kept
    Aborted { error: String },
}

/// State of one bridged run: one page, one session
#[derive(Debug, Clone)]
pub struct RunState {
    pub run_id: String,
    pub page: String,
    pub browser: String,
    pub announced: Option<usize>,
    pub checks: Vec<CheckReport>,
    pub error: Option<String>,
    pub started_at: Option<Instant>,
    pub finished_at: Option<Instant>,
}

impl RunState {
    pub fn new(run_id: &str, page: &str, browser: &str) -> Self {
        Self {
            run_id: run_id.to_string(),
            page: page.to_string(),
            browser: browser.to_string(),
            announced: None,
            checks: Vec::new(),
            error: None,
            started_at: None,
            finished_at: None,
        }
    }

    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
    }

    pub fn announce(&mut self, total: usize) {
        self.announced = Some(total);
    }

    pub fn record(&mut self, report: CheckReport) {
        self.checks.push(report);
    }

    pub fn abort(&mut self, error: String) {
        self.error = Some(error);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Instant::now());
    }

    pub fn status(&self) -> RunStatus {
        if let Some(error) = &self.error {
            return RunStatus::Aborted {
                error: error.clone(),
            };
        }
        if self.finished_at.is_none() {
            return RunStatus::Running;
        }

        let (passed, failed) = self.counts();
        if failed == 0 {
            RunStatus::Passed
        } else {
            RunStatus::Failed { passed, failed }
        }
    }

    fn counts(&self) -> (u32, u32) {
        self.checks.iter().fold((0, 0), |(p, f), check| {
            if check.passed() {
                (p + 1, f)
            } else {
                (p, f + 1)
            }
        })
    }

    pub fn summary(&self) -> RunSummary {
        let (passed, failed) = self.counts();

        let total_duration_ms = self.started_at.map(|start| {
            millis(
                self.finished_at
                    .unwrap_or_else(Instant::now)
                    .duration_since(start),
            )
        });

        RunSummary {
            run_id: self.run_id.clone(),
            announced: saturating_u32(self.announced.unwrap_or(0)),
            total_checks: saturating_u32(self.checks.len()),
            passed,
            failed,
            aborted: self.error.is_some(),
            total_duration_ms,
        }
    }
}

/// Whole milliseconds in `duration`, clamped to `u64::MAX`
pub fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn saturating_u32(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub run_id: String,
    /// Tests the in-page runner said it would run
    pub announced: u32,
    /// Checks actually drained
    pub total_checks: u32,
    pub passed: u32,
    pub failed: u32,
    pub aborted: bool,
    pub total_duration_ms: Option<u64>,
}

impl RunSummary {
    pub fn success(&self) -> bool {
        !self.aborted && self.failed == 0
    }
}
