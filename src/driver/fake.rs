//! Scripted in-memory page for exercising the bridge without a browser.
//!
//! The page follows a timeline measured from the last `open`: the runner
//! becomes ready after a delay and records are appended at their own offsets.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

use crate::bridge::PageContract;
use crate::driver::traits::PageDriver;

#[derive(Default)]
pub struct FakePage {
    contract: PageContract,
    ready_after: Option<Duration>,
    total: Option<Value>,
    records: Vec<(Duration, Value)>,
    fail_evaluations: bool,
    opened: Mutex<Option<(String, Instant)>>,
    log: Mutex<Vec<(String, Value)>>,
    out_of_bounds: Mutex<usize>,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contract(mut self, contract: PageContract) -> Self {
        self.contract = contract;
        self
    }

    pub fn ready_after(mut self, delay: Duration) -> Self {
        self.ready_after = Some(delay);
        self
    }

    pub fn total(mut self, total: Value) -> Self {
        self.total = Some(total);
        self
    }

    pub fn record(mut self, appears_after: Duration, record: Value) -> Self {
        self.records.push((appears_after, record));
        self
    }

    pub fn failing_evaluations(mut self) -> Self {
        self.fail_evaluations = true;
        self
    }

    pub fn opened(&self) -> Option<String> {
        self.opened.lock().unwrap().as_ref().map(|(url, _)| url.clone())
    }

    pub fn evaluations_of(&self, expression: &str) -> usize {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|(e, _)| e == expression)
            .count()
    }

    pub fn position_of(&self, expression: &str) -> Option<usize> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .position(|(e, _)| e == expression)
    }

    pub fn last_true_position_of(&self, expression: &str) -> Option<usize> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .rposition(|(e, v)| e == expression && *v == Value::Bool(true))
    }

    pub fn out_of_bounds_reads(&self) -> usize {
        *self.out_of_bounds.lock().unwrap()
    }

    fn elapsed(&self) -> Option<Duration> {
        self.opened
            .lock()
            .unwrap()
            .as_ref()
            .map(|(_, at)| at.elapsed())
    }

    /// Records are append-only: one shows up only after all earlier ones
    fn visible_count(&self, elapsed: Duration) -> usize {
        self.records
            .iter()
            .take_while(|(at, _)| *at <= elapsed)
            .count()
    }

    fn answer(&self, expression: &str) -> Result<Value> {
        let elapsed = self
            .elapsed()
            .ok_or_else(|| anyhow::anyhow!("page not loaded"))?;

        if expression == self.contract.ready {
            let ready = self.ready_after.map_or(false, |delay| elapsed >= delay);
            return Ok(Value::Bool(ready));
        }
        if expression == self.contract.total {
            return Ok(self.total.clone().unwrap_or(Value::Null));
        }

        let count = self.visible_count(elapsed);
        let exists_prefix = format!("({}).length > ", self.contract.records);
        if let Some(index) = expression.strip_prefix(&exists_prefix) {
            let index: usize = index.parse()?;
            return Ok(Value::Bool(count > index));
        }

        for index in 0..=self.records.len() {
            if expression == self.contract.record(index) {
                if index >= count {
                    *self.out_of_bounds.lock().unwrap() += 1;
                    return Ok(Value::Null);
                }
                return Ok(self.records[index].1.clone());
            }
        }

        anyhow::bail!("ReferenceError: cannot evaluate `{}`", expression)
    }
}

#[async_trait]
impl PageDriver for FakePage {
    fn browser_name(&self) -> &str {
        "fake"
    }

    async fn open(&self, url: &str) -> Result<()> {
        *self.opened.lock().unwrap() = Some((url.to_string(), Instant::now()));
        Ok(())
    }

    async fn evaluate(&self, expression: &str) -> Result<Value> {
        if self.fail_evaluations {
            self.log
                .lock()
                .unwrap()
                .push((expression.to_string(), Value::Null));
            anyhow::bail!("Evaluation failed: {}", expression);
        }

        let value = self.answer(expression)?;
        self.log
            .lock()
            .unwrap()
            .push((expression.to_string(), value.clone()));
        Ok(value)
    }
}
