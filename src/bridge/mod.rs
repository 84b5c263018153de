//! Bridge between an in-page Mocha runner and host-side test results.

pub mod check;
pub mod contract;
pub mod error;
pub mod session;

pub use check::{Check, TestState};
pub use contract::PageContract;
pub use error::{BridgeError, BridgeResult, CheckFailure};
pub use session::{Session, SessionOptions, SessionPhase};
