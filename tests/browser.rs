//! Drives a real browser against `fixtures/index.html`.
//!
//! Needs Playwright's driver and browsers: `cargo test -- --ignored`.

use futures::StreamExt;
use mocha_bridge::driver::web::{BrowserType, WebDriver, WebDriverConfig};
use mocha_bridge::utils::paths::page_url;
use mocha_bridge::{Session, SessionOptions, TestState};
use std::time::Duration;

#[tokio::test]
#[ignore = "requires Playwright browsers"]
async fn test_fixture_page_in_webkit() {
    let page = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/index.html");
    let url = page_url(page).unwrap();

    let driver = WebDriver::new(WebDriverConfig {
        browser_type: BrowserType::Webkit,
        headless: true,
        install_browsers: true,
    })
    .await
    .expect("Failed to launch webkit");

    let mut session = Session::new(
        &driver,
        SessionOptions {
            wait_timeout: Duration::from_secs(10),
            ..Default::default()
        },
    );
    let total = session.start(&url).await.unwrap();
    assert_eq!(total, 3);

    let checks: Vec<_> = session
        .checks()
        .map(|item| item.unwrap())
        .collect()
        .await;

    let states: Vec<TestState> = checks.iter().map(|c| c.state.clone()).collect();
    assert_eq!(
        states,
        vec![TestState::Passed, TestState::Failed, TestState::Passed]
    );
    assert_eq!(
        checks[1].title.as_deref(),
        Some("should return a rounded integer position")
    );

    driver.close().await.unwrap();
}
