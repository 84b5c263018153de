use anyhow::{Context, Result};
use std::path::Path;

/// Turn a page argument into something the browser can open.
///
/// URLs pass through untouched; anything else is taken as a local file and
/// becomes an absolute `file://` URL.
pub fn page_url(page: &str) -> Result<String> {
    if has_scheme(page) {
        return Ok(page.to_string());
    }

    let path = Path::new(page);
    let absolute = path
        .canonicalize()
        .with_context(|| format!("Test page not found: {}", path.display()))?;

    Ok(format!("file://{}", absolute.display()))
}

fn has_scheme(page: &str) -> bool {
    match page.split_once(':') {
        Some((scheme, rest)) => {
            scheme.len() > 1
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.')
                && (rest.starts_with("//") || matches!(scheme, "about" | "data"))
        }
        None => false,
    }
}
