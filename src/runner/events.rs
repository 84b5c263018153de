use super::state::RunSummary;
use tokio::sync::broadcast;

/// Run events for real-time console output
#[derive(Debug, Clone)]
pub enum TestEvent {
    // Session events
    SessionStarted {
        run_id: String,
        page: String,
        browser: String,
    },
    RunnerStarted {
        total: usize,
    },
    SessionAborted {
        error: String,
    },
    SessionFinished {
        summary: RunSummary,
    },

    // Check events
    CheckWaiting {
        index: usize,
        total: usize,
    },
    CheckPassed {
        index: usize,
        name: String,
        duration_ms: u64,
    },
    CheckFailed {
        index: usize,
        name: String,
        message: String,
        duration_ms: u64,
    },
}

/// Event emitter for broadcasting run events
pub struct EventEmitter {
    sender: broadcast::Sender<TestEvent>,
}

impl EventEmitter {
    pub fn new() -> (Self, broadcast::Receiver<TestEvent>) {
        let (sender, receiver) = broadcast::channel(100);
        (Self { sender }, receiver)
    }

    pub fn emit(&self, event: TestEvent) {
        let _ = self.sender.send(event);
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(100);
        Self { sender }
    }
}

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration as StdDuration;

/// Console event listener for printing real-time updates.
///
/// Runs until every emitter is dropped.
pub struct ConsoleEventListener;

impl ConsoleEventListener {
    pub async fn listen(mut receiver: broadcast::Receiver<TestEvent>) {
        use colored::Colorize;
        use std::io::IsTerminal;

        let interactive = std::io::stdout().is_terminal();
        let mut spinner: Option<ProgressBar> = None;

        loop {
            let event = match receiver.recv().await {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    log::warn!("console listener skipped {} event(s)", skipped);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };

            match event {
                TestEvent::SessionStarted {
                    run_id,
                    page,
                    browser,
                } => {
                    println!(
                        "{} Session {} on {}",
                        "■".blue().bold(),
                        run_id.dimmed(),
                        browser.cyan()
                    );
                    println!("  Page: {}", page.cyan());
                }

                TestEvent::RunnerStarted { total } => {
                    println!(
                        "  {} Runner started: {} test(s) announced",
                        "→".blue(),
                        total.to_string().white().bold()
                    );
                }

                TestEvent::CheckWaiting { index, total } => {
                    if !interactive {
                        continue;
                    }
                    let pb = ProgressBar::with_draw_target(None, ProgressDrawTarget::stdout());
                    pb.set_style(
                        ProgressStyle::default_spinner()
                            .template("    {spinner} {msg}")
                            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                    );
                    pb.set_message(format!("waiting for test {}/{}", index + 1, total));
                    pb.enable_steady_tick(StdDuration::from_millis(80));
                    spinner = Some(pb);
                }

                TestEvent::CheckPassed {
                    index,
                    name,
                    duration_ms,
                } => {
                    if let Some(pb) = spinner.take() {
                        pb.finish_and_clear();
                    }
                    println!(
                        "    {} [{}] {} {}",
                        "✓".green(),
                        index,
                        name,
                        format!("({}ms)", duration_ms).dimmed()
                    );
                }

                TestEvent::CheckFailed {
                    index,
                    name,
                    message,
                    duration_ms,
                } => {
                    if let Some(pb) = spinner.take() {
                        pb.finish_and_clear();
                    }
                    println!(
                        "    {} [{}] {} {}",
                        "✗".red(),
                        index,
                        name.red(),
                        format!("({}ms)", duration_ms).dimmed()
                    );
                    println!("        {}", message.red());
                }

                TestEvent::SessionAborted { error } => {
                    if let Some(pb) = spinner.take() {
                        pb.finish_and_clear();
                    }
                    println!("  {} Session aborted: {}", "✗".red().bold(), error.red());
                }

                TestEvent::SessionFinished { summary } => {
                    if let Some(pb) = spinner.take() {
                        pb.finish_and_clear();
                    }

                    let status = if summary.aborted {
                        "ABORTED".red().bold()
                    } else if summary.failed > 0 {
                        "FAILED".red().bold()
                    } else {
                        "PASSED".green().bold()
                    };

                    println!("\n{} Test session finished [{}]", "■".blue().bold(), status);
                    println!(
                        "  {} of {} announced test(s) reported",
                        summary.total_checks, summary.announced
                    );
                    println!(
                        "  {} passed, {} failed",
                        summary.passed.to_string().green(),
                        summary.failed.to_string().red()
                    );
                    if let Some(duration) = summary.total_duration_ms {
                        println!("  Duration: {}ms", duration);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_emitter_delivers_in_order() {
        let (emitter, mut receiver) = EventEmitter::new();
        emitter.emit(TestEvent::RunnerStarted { total: 2 });
        emitter.emit(TestEvent::CheckWaiting { index: 0, total: 2 });

        assert!(matches!(
            receiver.recv().await.unwrap(),
            TestEvent::RunnerStarted { total: 2 }
        ));
        assert!(matches!(
            receiver.recv().await.unwrap(),
            TestEvent::CheckWaiting { index: 0, .. }
        ));
    }

    #[tokio::test]
    async fn test_listener_stops_when_emitter_dropped() {
        let (emitter, receiver) = EventEmitter::new();
        let handle = tokio::spawn(ConsoleEventListener::listen(receiver));

        emitter.emit(TestEvent::SessionAborted {
            error: "Timed out".to_string(),
        });
        drop(emitter);

        tokio::time::timeout(StdDuration::from_secs(5), handle)
            .await
            .expect("listener should exit")
            .unwrap();
    }
}
