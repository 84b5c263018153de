use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    /// A bounded wait ran out. Ends the session.
    #[error("Timed out after {}ms waiting for `{condition}`", timeout.as_millis())]
    Timeout { condition: String, timeout: Duration },

    /// The page returned something the bridge cannot interpret
    #[error("Unexpected value for `{expression}`: {value}")]
    Protocol { expression: String, value: Value },

    #[error("Session has not been started")]
    NotStarted,

    /// Navigation or evaluation failed inside the browser driver
    #[error(transparent)]
    Driver(#[from] anyhow::Error),
}

impl BridgeError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, BridgeError::Timeout { .. })
    }
}

pub type BridgeResult<T> = Result<T, BridgeError>;

/// A drained test whose state was not `passed`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{title}: expected state `passed`, got `{state}`")]
pub struct CheckFailure {
    pub title: String,
    pub state: String,
}
