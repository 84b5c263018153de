//! The bridge poller.
//!
//! A [`Session`] owns one page. It loads the test page, waits for the
//! in-page runner to announce itself, then drains the announced tests one
//! index at a time, polling for each record before reading it.
//!
//! Every wait is bounded by the same timeout and a timeout ends the session:
//! one test that never shows up aborts the rest of the drain.

use futures::stream::{self, Stream};
use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;

use super::check::{Check, TestRecord};
use super::contract::PageContract;
use super::error::{BridgeError, BridgeResult};
use crate::driver::traits::PageDriver;

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Created,
    PageLoading,
    AwaitingRunnerStart,
    Draining { next: usize, total: usize },
    Done,
    TimedOut,
    /// Ended by an evaluation or protocol error
    Failed,
}

impl SessionPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionPhase::Done | SessionPhase::TimedOut | SessionPhase::Failed
        )
    }
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Bound on every individual wait
    pub wait_timeout: Duration,
    /// Sleep between two evaluations of a wait predicate
    pub poll_interval: Duration,
    pub contract: PageContract,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            wait_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(100),
            contract: PageContract::default(),
        }
    }
}

pub struct Session<D> {
    driver: D,
    options: SessionOptions,
    phase: SessionPhase,
}

impl<D: PageDriver> Session<D> {
    pub fn new(driver: D, options: SessionOptions) -> Self {
        Self {
            driver,
            options,
            phase: SessionPhase::Created,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Navigate to `url`. Load failures are the driver's to report.
    pub async fn open(&mut self, url: &str) -> BridgeResult<()> {
        self.phase = SessionPhase::PageLoading;
        log::info!("opening {}", url);
        self.driver.open(url).await?;
        Ok(())
    }

    /// Evaluate `expression` in the page, unchanged
    pub async fn evaluate(&self, expression: &str) -> BridgeResult<Value> {
        Ok(self.driver.evaluate(expression).await?)
    }

    /// Poll `expression` until it is truthy or `timeout` elapses.
    ///
    /// The predicate is always evaluated at least once. Evaluation errors
    /// are returned immediately rather than retried.
    pub async fn wait_for(&self, expression: &str, timeout: Duration) -> BridgeResult<()> {
        let started = Instant::now();
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            let value = self.evaluate(expression).await?;
            if is_truthy(&value) {
                log::debug!("`{}` held after {} attempt(s)", expression, attempts);
                return Ok(());
            }

            let elapsed = started.elapsed();
            if elapsed >= timeout {
                log::debug!("`{}` still false after {} attempt(s)", expression, attempts);
                return Err(BridgeError::Timeout {
                    condition: expression.to_string(),
                    timeout,
                });
            }

            tokio::time::sleep(self.options.poll_interval.min(timeout - elapsed)).await;
        }
    }

    /// Load `url`, wait for the in-page runner and read the announced total.
    ///
    /// Returns the total; the session is then ready to drain. Any error ends
    /// the session.
    pub async fn start(&mut self, url: &str) -> BridgeResult<usize> {
        let result = self.try_start(url).await;
        self.settle(result)
    }

    async fn try_start(&mut self, url: &str) -> BridgeResult<usize> {
        self.open(url).await?;

        self.phase = SessionPhase::AwaitingRunnerStart;
        self.wait_for(&self.options.contract.ready, self.options.wait_timeout)
            .await?;

        let total_expr = self.options.contract.total.clone();
        let value = self.evaluate(&total_expr).await?;
        let total = parse_total(&value).ok_or_else(|| BridgeError::Protocol {
            expression: total_expr,
            value,
        })?;

        log::info!("runner started, {} test(s) announced", total);
        self.phase = SessionPhase::Draining { next: 0, total };
        Ok(total)
    }

    /// Drain the next announced test.
    ///
    /// Returns `Ok(None)` once every announced test has been read, or after
    /// the session has ended on an error. The first error is terminal.
    pub async fn next_check(&mut self) -> BridgeResult<Option<Check>> {
        let (index, total) = match self.phase {
            SessionPhase::Draining { next, total } => (next, total),
            phase if phase.is_terminal() => return Ok(None),
            _ => return Err(BridgeError::NotStarted),
        };

        let result = self.drain_one(index, total).await;
        self.settle(result)
    }

    async fn drain_one(&mut self, index: usize, total: usize) -> BridgeResult<Option<Check>> {
        if index >= total {
            self.phase = SessionPhase::Done;
            return Ok(None);
        }

        let exists = self.options.contract.record_exists(index);
        self.wait_for(&exists, self.options.wait_timeout).await?;

        let record_expr = self.options.contract.record(index);
        let value = self.evaluate(&record_expr).await?;
        let record: TestRecord = match serde_json::from_value(value.clone()) {
            Ok(record) => record,
            Err(_) => {
                return Err(BridgeError::Protocol {
                    expression: record_expr,
                    value,
                })
            }
        };

        self.phase = if index + 1 == total {
            SessionPhase::Done
        } else {
            SessionPhase::Draining {
                next: index + 1,
                total,
            }
        };

        log::debug!("test {} of {}: {}", index + 1, total, record.state);
        Ok(Some(Check {
            index,
            state: record.state,
            title: record.title,
        }))
    }

    /// Turn the session into a lazy stream of checks.
    ///
    /// The stream is finite: it ends after the last announced test, or right
    /// after yielding the first error.
    pub fn checks(self) -> impl Stream<Item = BridgeResult<Check>> {
        stream::unfold(Some(self), |session| async move {
            let mut session = session?;
            match session.next_check().await {
                Ok(Some(check)) => Some((Ok(check), Some(session))),
                Ok(None) => None,
                Err(e) => Some((Err(e), None)),
            }
        })
    }

    fn settle<T>(&mut self, result: BridgeResult<T>) -> BridgeResult<T> {
        if let Err(e) = &result {
            log::warn!("{}", e);
            self.phase = if e.is_timeout() {
                SessionPhase::TimedOut
            } else {
                SessionPhase::Failed
            };
        }
        result
    }
}

/// JavaScript truthiness of a returned value
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Accepts integral numbers and numeric strings, like `parseInt` would for
/// what Mocha puts in `runner.total`
fn parse_total(value: &Value) -> Option<usize> {
    match value {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                return usize::try_from(u).ok();
            }
            let f = n.as_f64()?;
            (f >= 0.0 && f.fract() == 0.0).then_some(f as usize)
        }
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
