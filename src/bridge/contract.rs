/// The globals a test page exposes to the bridge.
///
/// Defaults match a Mocha page that registers `isMochaRunning()`,
/// `__mocha_runner__` and `__mocha_tests__` before the suite starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContract {
    /// Boolean expression, true once the in-page runner has started
    pub ready: String,
    /// Expression for the number of tests the runner announced
    pub total: String,
    /// Array of test objects, appended to as tests finish
    pub records: String,
}

impl Default for PageContract {
    fn default() -> Self {
        Self {
            ready: "isMochaRunning()".to_string(),
            total: "__mocha_runner__.total".to_string(),
            records: "__mocha_tests__".to_string(),
        }
    }
}

impl PageContract {
    /// Boolean expression, true once record `index` exists.
    ///
    /// `records` may be any expression, so it is always parenthesized.
    pub fn record_exists(&self, index: usize) -> String {
        format!("({}).length > {}", self.records, index)
    }

    /// Expression projecting record `index` onto `{ state, title }`.
    ///
    /// Mocha test objects link back to their suite, so they are never
    /// returned whole.
    pub fn record(&self, index: usize) -> String {
        format!(
            "(() => {{ const t = ({})[{}]; return t == null ? null : \
             {{ state: t.state == null ? null : String(t.state), \
             title: t.title == null ? null : String(t.title) }}; }})()",
            self.records, index
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_expressions() {
        let contract = PageContract::default();
        assert_eq!(contract.ready, "isMochaRunning()");
        assert_eq!(contract.total, "__mocha_runner__.total");
        assert_eq!(contract.record_exists(3), "(__mocha_tests__).length > 3");
    }

    #[test]
    fn test_record_projection_uses_custom_collection() {
        let contract = PageContract {
            records: "window.results".to_string(),
            ..Default::default()
        };
        let expr = contract.record(7);
        assert!(expr.contains("(window.results)[7]"));
        assert!(expr.contains("state:"));
        assert!(expr.contains("title:"));
        assert_ne!(expr, contract.record(8));
    }

    #[test]
    fn test_compound_collection_is_parenthesized() {
        let contract = PageContract {
            records: "window.done || []".to_string(),
            ..Default::default()
        };
        assert_eq!(contract.record_exists(3), "(window.done || []).length > 3");
        assert!(contract.record(0).contains("const t = (window.done || [])[0];"));
        assert!(!contract.record(0).contains("|| [][0]"));
    }
}
