//! Web Driver implementation using Playwright
//!
//! Launches a single browser page and exposes it to the bridge through
//! [`PageDriver`]. Webkit is the default engine since the suites this runs
//! were written against it.

use anyhow::{Context, Result};
use async_trait::async_trait;
use colored::Colorize;
use playwright::api::{Browser, BrowserContext, Page};
use playwright::Playwright;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tokio::sync::Mutex;

use crate::driver::traits::PageDriver;

/// Web browser type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BrowserType {
    Chromium,
    Firefox,
    #[default]
    Webkit,
}

impl BrowserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserType::Chromium => "chromium",
            BrowserType::Firefox => "firefox",
            BrowserType::Webkit => "webkit",
        }
    }
}

impl fmt::Display for BrowserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BrowserType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "chromium" | "chrome" => Ok(BrowserType::Chromium),
            "firefox" => Ok(BrowserType::Firefox),
            "webkit" | "safari" => Ok(BrowserType::Webkit),
            other => anyhow::bail!("Unknown browser: {}", other),
        }
    }
}

/// Web Driver configuration
#[derive(Debug, Clone)]
pub struct WebDriverConfig {
    pub browser_type: BrowserType,
    pub headless: bool,
    /// Download Playwright's browser builds before launching
    pub install_browsers: bool,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            browser_type: BrowserType::Webkit,
            headless: true,
            install_browsers: false,
        }
    }
}

/// Web Driver using Playwright
pub struct WebDriver {
    #[allow(dead_code)]
    playwright: Playwright,
    browser: Browser,
    #[allow(dead_code)]
    context: BrowserContext,
    page: Mutex<Page>,
    config: WebDriverConfig,
}

impl WebDriver {
    /// Launch a browser and open a blank page
    pub async fn new(config: WebDriverConfig) -> Result<Self> {
        let playwright = Playwright::initialize()
            .await
            .context("Failed to initialize Playwright")?;

        if config.install_browsers {
            println!("{} Installing Playwright browsers...", "📦".blue());
            playwright
                .prepare()
                .context("Failed to install Playwright browsers")?;
        }

        let browser_type = match config.browser_type {
            BrowserType::Chromium => playwright.chromium(),
            BrowserType::Firefox => playwright.firefox(),
            BrowserType::Webkit => playwright.webkit(),
        };

        log::info!(
            "launching {} (headless: {})",
            config.browser_type,
            config.headless
        );

        let browser = browser_type
            .launcher()
            .headless(config.headless)
            .launch()
            .await
            .with_context(|| format!("Failed to launch {}", config.browser_type))?;

        let context = browser.context_builder().build().await?;
        let page = context.new_page().await?;

        Ok(Self {
            playwright,
            browser,
            context,
            page: Mutex::new(page),
            config,
        })
    }

    /// Close the browser. Dropping the driver also tears it down, this just
    /// lets the caller see the error.
    pub async fn close(self) -> Result<()> {
        self.browser
            .close()
            .await
            .context("Failed to close browser")?;
        Ok(())
    }
}

#[async_trait]
impl PageDriver for WebDriver {
    fn browser_name(&self) -> &str {
        self.config.browser_type.as_str()
    }

    async fn open(&self, url: &str) -> Result<()> {
        let page = self.page.lock().await;

        page.goto_builder(url)
            .goto()
            .await
            .with_context(|| format!("Failed to navigate to {}", url))?;

        Ok(())
    }

    async fn evaluate(&self, expression: &str) -> Result<Value> {
        let page = self.page.lock().await;
        let value: Value = page
            .evaluate(expression, ())
            .await
            .with_context(|| format!("Failed to evaluate `{}`", expression))?;
        Ok(value)
    }
}
