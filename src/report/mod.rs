pub mod json;
pub mod junit;
pub mod types;

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

/// Re-render saved test results in another format
pub fn generate_report(results_path: &Path, format: &str, output: Option<&Path>) -> Result<()> {
    let results = std::fs::read_to_string(results_path)
        .with_context(|| format!("Failed to read {}", results_path.display()))?;
    let test_results: types::TestResults = serde_json::from_str(&results)?;

    match format {
        "json" => json::generate(&test_results, output),
        "junit" | "xml" => {
            let xml = junit::generate_junit_xml(&test_results)?;
            if let Some(path) = output {
                std::fs::write(path, xml)?;
                println!("JUnit report saved to: {}", path.display());
            } else {
                println!("{}", xml);
            }
            Ok(())
        }
        _ => anyhow::bail!("Unknown format: {}", format),
    }
}

/// Save `test-results.json` and `junit.xml` into `output_dir`
pub fn write_reports(results: &types::TestResults, output_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let report_path = output_dir.join("test-results.json");
    let json = serde_json::to_string_pretty(results)?;
    std::fs::write(&report_path, json)?;

    println!(
        "\n{} JSON report saved to: {}",
        "📄".to_string().blue(),
        report_path.display().to_string().cyan()
    );

    junit::write_report(results, output_dir)?;
    Ok(())
}
