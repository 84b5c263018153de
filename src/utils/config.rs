use crate::driver::web::BrowserType;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bound on each wait: runner start, and each test appearing (ms)
    pub wait_timeout_ms: u64,

    /// Delay between two polls of the page (ms)
    pub poll_interval_ms: u64,

    /// Run the browser without a window
    pub headless: bool,

    /// Browser engine to launch
    pub browser: BrowserType,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

impl Config {
    /// Built-in defaults overridden by `MOCHA_BRIDGE_*` variables
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let headless = lookup("MOCHA_BRIDGE_HEADLESS")
            .map(|v| !(v == "false" || v == "0"))
            .unwrap_or(true);

        let browser = lookup("MOCHA_BRIDGE_BROWSER")
            .and_then(|v| match v.parse() {
                Ok(b) => Some(b),
                Err(e) => {
                    log::warn!("ignoring MOCHA_BRIDGE_BROWSER: {}", e);
                    None
                }
            })
            .unwrap_or_default();

        let wait_timeout_ms = lookup("MOCHA_BRIDGE_TIMEOUT_MS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(10_000);

        Self {
            wait_timeout_ms,
            poll_interval_ms: 100,
            headless,
            browser,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[]));
        assert_eq!(config.wait_timeout_ms, 10_000);
        assert_eq!(config.poll_interval_ms, 100);
        assert!(config.headless);
        assert_eq!(config.browser, BrowserType::Webkit);
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("MOCHA_BRIDGE_HEADLESS", "0"),
            ("MOCHA_BRIDGE_BROWSER", "chromium"),
            ("MOCHA_BRIDGE_TIMEOUT_MS", "20000"),
        ]));
        assert!(!config.headless);
        assert_eq!(config.browser, BrowserType::Chromium);
        assert_eq!(config.wait_timeout_ms, 20_000);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = Config::from_lookup(lookup(&[
            ("MOCHA_BRIDGE_BROWSER", "lynx"),
            ("MOCHA_BRIDGE_TIMEOUT_MS", "soon"),
        ]));
        assert_eq!(config.browser, BrowserType::Webkit);
        assert_eq!(config.wait_timeout_ms, 10_000);
    }
}
