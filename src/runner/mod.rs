pub mod events;
pub mod state;

use anyhow::Result;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use uuid::Uuid;

pub use events::*;
pub use state::*;

use crate::bridge::{PageContract, Session, SessionOptions};
use crate::driver::traits::PageDriver;
use crate::driver::web::{BrowserType, WebDriver, WebDriverConfig};
use crate::report::types::TestResults;
use crate::utils::config::Config;

/// Options for one bridged run
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub browser: BrowserType,
    pub headless: bool,
    pub install_browsers: bool,
    pub wait_timeout: Duration,
    pub poll_interval: Duration,
    pub contract: PageContract,
    /// Write `test-results.json` and `junit.xml` here
    pub report_dir: Option<PathBuf>,
}

impl From<&Config> for RunOptions {
    fn from(config: &Config) -> Self {
        Self {
            browser: config.browser,
            headless: config.headless,
            install_browsers: false,
            wait_timeout: Duration::from_millis(config.wait_timeout_ms),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            contract: PageContract::default(),
            report_dir: None,
        }
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl RunOptions {
    fn session_options(&self) -> SessionOptions {
        SessionOptions {
            wait_timeout: self.wait_timeout,
            poll_interval: self.poll_interval,
            contract: self.contract.clone(),
        }
    }
}

/// Run the Mocha suite at `page` in a real browser and report every test
pub async fn run_page(page: &str, options: &RunOptions) -> Result<RunSummary> {
    let url = crate::utils::paths::page_url(page)?;

    let driver = WebDriver::new(WebDriverConfig {
        browser_type: options.browser,
        headless: options.headless,
        install_browsers: options.install_browsers,
    })
    .await?;

    let (emitter, receiver) = EventEmitter::new();
    let listener = tokio::spawn(ConsoleEventListener::listen(receiver));

    let outcome = run_with_driver(&driver, &url, options, &emitter).await;

    drop(emitter);
    join_listener(listener).await;

    if let Err(e) = driver.close().await {
        log::warn!("{:#}", e);
    }

    let results = outcome?;
    if let Some(dir) = &options.report_dir {
        crate::report::write_reports(&results, dir)?;
    }

    Ok(results.summary)
}

/// Wait for the console listener to drain. A listener that panicked only
/// loses console output, so it is logged and the run goes on.
async fn join_listener(listener: tokio::task::JoinHandle<()>) {
    if let Err(e) = listener.await {
        log::warn!("console listener failed: {}", e);
    }
}

/// Drive one session on `driver` and collect its results.
///
/// Session errors (timeouts, evaluation failures) do not fail this call:
/// they end the run and are recorded in the results.
pub async fn run_with_driver<D: PageDriver>(
    driver: D,
    url: &str,
    options: &RunOptions,
    emitter: &EventEmitter,
) -> Result<TestResults> {
    let run_id = Uuid::new_v4().to_string();
    let mut run = RunState::new(&run_id, url, driver.browser_name());
    run.start();

    emitter.emit(TestEvent::SessionStarted {
        run_id,
        page: url.to_string(),
        browser: driver.browser_name().to_string(),
    });

    let mut session = Session::new(driver, options.session_options());

    match session.start(url).await {
        Ok(total) => {
            run.announce(total);
            emitter.emit(TestEvent::RunnerStarted { total });
            drain(session, total, &mut run, emitter).await;
        }
        Err(e) => {
            emitter.emit(TestEvent::SessionAborted {
                error: e.to_string(),
            });
            run.abort(e.to_string());
        }
    }

    run.finish();
    emitter.emit(TestEvent::SessionFinished {
        summary: run.summary(),
    });

    Ok(TestResults::from_run(&run))
}

async fn drain<D: PageDriver>(
    session: Session<D>,
    total: usize,
    run: &mut RunState,
    emitter: &EventEmitter,
) {
    let mut checks = Box::pin(session.checks());
    let mut waiting_since = Instant::now();

    if total > 0 {
        emitter.emit(TestEvent::CheckWaiting { index: 0, total });
    }

    while let Some(item) = checks.next().await {
        let check = match item {
            Ok(check) => check,
            Err(e) => {
                emitter.emit(TestEvent::SessionAborted {
                    error: e.to_string(),
                });
                run.abort(e.to_string());
                return;
            }
        };

        let report = CheckReport::from_check(&check, millis(waiting_since.elapsed()));
        match &report.status {
            CheckStatus::Passed => emitter.emit(TestEvent::CheckPassed {
                index: report.index,
                name: report.name.clone(),
                duration_ms: report.duration_ms,
            }),
            CheckStatus::Failed { message } => emitter.emit(TestEvent::CheckFailed {
                index: report.index,
                name: report.name.clone(),
                message: message.clone(),
                duration_ms: report.duration_ms,
            }),
        }
        run.record(report);

        if check.index + 1 < total {
            emitter.emit(TestEvent::CheckWaiting {
                index: check.index + 1,
                total,
            });
        }
        waiting_since = Instant::now();
    }

    log::info!("drained {} of {} test(s)", run.checks.len(), total);
}
