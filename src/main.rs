use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::time::Duration;

use mocha_bridge::utils::config::Config;
use mocha_bridge::{report, runner, PageContract};

#[derive(Parser)]
#[command(name = "mocha-bridge")]
#[command(version)]
#[command(about = "Run an in-browser Mocha suite and report each test", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a test page and report every Mocha test in it
    Run {
        /// Path or URL of the test page
        page: String,

        /// Browser engine (webkit, chromium, firefox)
        #[arg(short, long)]
        browser: Option<String>,

        /// Show the browser window
        #[arg(long, default_value = "false")]
        headed: bool,

        /// Bound on each wait, in milliseconds
        #[arg(short, long)]
        timeout_ms: Option<u64>,

        /// Delay between two polls of the page, in milliseconds
        #[arg(long)]
        poll_ms: Option<u64>,

        /// Install Playwright's browsers before launching
        #[arg(long, default_value = "false")]
        install: bool,

        /// Output directory for reports
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Write JSON and JUnit reports
        #[arg(long, default_value = "false")]
        report: bool,

        /// Expression that is true once the in-page runner has started
        #[arg(long)]
        ready_expr: Option<String>,

        /// Expression for the announced number of tests
        #[arg(long)]
        total_expr: Option<String>,

        /// Expression for the array of finished test objects
        #[arg(long)]
        records_expr: Option<String>,
    },

    /// Render saved test results
    Report {
        /// Path to test results JSON
        results: PathBuf,

        /// Output format (json, junit)
        #[arg(short, long, default_value = "junit")]
        format: String,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            page,
            browser,
            headed,
            timeout_ms,
            poll_ms,
            install,
            output,
            report,
            ready_expr,
            total_expr,
            records_expr,
        } => {
            let mut config = Config::default();
            if let Some(b) = browser {
                config.browser = b.parse()?;
            }
            if headed {
                config.headless = false;
            }
            if let Some(ms) = timeout_ms {
                config.wait_timeout_ms = ms;
            }
            if let Some(ms) = poll_ms {
                config.poll_interval_ms = ms;
            }

            let defaults = PageContract::default();
            let contract = PageContract {
                ready: ready_expr.unwrap_or(defaults.ready),
                total: total_expr.unwrap_or(defaults.total),
                records: records_expr.unwrap_or(defaults.records),
            };

            let options = runner::RunOptions {
                install_browsers: install,
                contract,
                report_dir: report.then(|| output.clone()),
                ..runner::RunOptions::from(&config)
            };

            println!("{} Running suite from: {}", "▶".green().bold(), page);
            println!("  Browser: {}", config.browser.to_string().cyan());
            println!(
                "  Mode: {}",
                (if config.headless { "headless" } else { "headed" }).cyan()
            );
            println!(
                "  Timeout: {}",
                format!("{:?}", Duration::from_millis(config.wait_timeout_ms)).yellow()
            );
            if report {
                println!("  Reports: {}", output.display().to_string().cyan());
            }

            let summary = runner::run_page(&page, &options).await?;
            if !summary.success() {
                std::process::exit(1);
            }
        }

        Commands::Report {
            results,
            format,
            output,
        } => {
            println!(
                "{} Generating {} report from: {}",
                "📊".to_string().blue(),
                format.cyan(),
                results.display()
            );
            report::generate_report(&results, &format, output.as_deref())?;
        }
    }

    Ok(())
}
