pub mod bridge;
pub mod driver;
pub mod report;
pub mod runner;
pub mod utils;

// Re-export common items
pub use bridge::{BridgeError, Check, PageContract, Session, SessionOptions, TestState};
pub use report::generate_report;
pub use runner::{run_page, RunOptions};
