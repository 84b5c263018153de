use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::CheckFailure;

/// Execution state of an in-page test, as Mocha reports it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum TestState {
    Passed,
    Failed,
    /// Mocha leaves `state` unset for skipped and pending tests
    Pending,
    Other(String),
}

impl TestState {
    pub fn as_str(&self) -> &str {
        match self {
            TestState::Passed => "passed",
            TestState::Failed => "failed",
            TestState::Pending => "pending",
            TestState::Other(s) => s,
        }
    }
}

impl From<Option<String>> for TestState {
    fn from(state: Option<String>) -> Self {
        match state.as_deref() {
            Some("passed") => TestState::Passed,
            Some("failed") => TestState::Failed,
            Some("pending") | None => TestState::Pending,
            Some(other) => TestState::Other(other.to_string()),
        }
    }
}

impl From<TestState> for String {
    fn from(state: TestState) -> Self {
        state.as_str().to_string()
    }
}

impl fmt::Display for TestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One in-page test record as read through the page contract
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TestRecord {
    pub state: TestState,
    #[serde(default)]
    pub title: Option<String>,
}

/// A reportable check: one drained test, asserted on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Check {
    /// Position in the page's test collection
    pub index: usize,
    pub state: TestState,
    /// Test title, when the page provides one. Never affects the outcome.
    pub title: Option<String>,
}

impl Check {
    pub fn passed(&self) -> bool {
        self.state == TestState::Passed
    }

    /// Title for display, falling back to the index
    pub fn name(&self) -> String {
        match &self.title {
            Some(title) if !title.is_empty() => title.clone(),
            _ => format!("test #{}", self.index),
        }
    }

    /// Pass iff the state is `passed`
    pub fn assert(&self) -> Result<(), CheckFailure> {
        if self.passed() {
            Ok(())
        } else {
            Err(CheckFailure {
                title: self.name(),
                state: self.state.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(state: &str, title: Option<&str>) -> Check {
        Check {
            index: 0,
            state: TestState::from(Some(state.to_string())),
            title: title.map(String::from),
        }
    }

    #[test]
    fn test_only_passed_state_passes() {
        assert!(check("passed", None).assert().is_ok());
        assert!(check("failed", None).assert().is_err());
        assert!(check("pending", None).assert().is_err());
        assert!(check("skipped", None).assert().is_err());
    }

    #[test]
    fn test_title_does_not_affect_outcome() {
        assert!(check("passed", Some("should fail")).assert().is_ok());

        let failure = check("failed", Some("should return a rounded average"))
            .assert()
            .unwrap_err();
        assert_eq!(failure.title, "should return a rounded average");
        assert_eq!(failure.state, "failed");
        assert_eq!(
            failure.to_string(),
            "should return a rounded average: expected state `passed`, got `failed`"
        );
    }

    #[test]
    fn test_missing_state_is_pending() {
        let record: TestRecord =
            serde_json::from_value(serde_json::json!({ "state": null, "title": "todo" })).unwrap();
        assert_eq!(record.state, TestState::Pending);
        assert_eq!(record.title.as_deref(), Some("todo"));

        let record: TestRecord =
            serde_json::from_value(serde_json::json!({ "state": "weird" })).unwrap();
        assert_eq!(record.state, TestState::Other("weird".to_string()));
        assert_eq!(record.title, None);
    }

    #[test]
    fn test_name_falls_back_to_index() {
        let mut c = check("passed", Some(""));
        c.index = 4;
        assert_eq!(c.name(), "test #4");
    }
}
