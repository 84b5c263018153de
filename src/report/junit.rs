use super::types::TestResults;
use crate::runner::state::{CheckReport, CheckStatus};
use anyhow::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;
use std::path::Path;

/// Generate JUnit XML report string from TestResults
pub fn generate_junit_xml(results: &TestResults) -> Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let errors = usize::from(results.error.is_some());
    let total_tests = results.checks.len() + errors;
    let failures = results.checks.iter().filter(|c| !c.passed()).count();
    let time = seconds(results.summary.total_duration_ms.unwrap_or(0));

    // <testsuites>
    let mut suites_start = BytesStart::new("testsuites");
    suites_start.push_attribute(("name", "mocha-bridge-run"));
    suites_start.push_attribute(("tests", total_tests.to_string().as_str()));
    suites_start.push_attribute(("failures", failures.to_string().as_str()));
    suites_start.push_attribute(("errors", errors.to_string().as_str()));
    suites_start.push_attribute(("time", time.as_str()));
    writer.write_event(Event::Start(suites_start))?;

    // One <testsuite> per page
    let mut suite_start = BytesStart::new("testsuite");
    suite_start.push_attribute(("name", results.page.as_str()));
    suite_start.push_attribute(("tests", total_tests.to_string().as_str()));
    suite_start.push_attribute(("failures", failures.to_string().as_str()));
    suite_start.push_attribute(("errors", errors.to_string().as_str()));
    suite_start.push_attribute(("id", results.run_id.as_str()));
    suite_start.push_attribute(("time", time.as_str()));
    suite_start.push_attribute(("timestamp", results.generated_at.as_str()));
    suite_start.push_attribute(("hostname", results.browser.as_str()));
    writer.write_event(Event::Start(suite_start))?;

    let classname = classname(&results.page);
    for check in &results.checks {
        write_test_case(&mut writer, check, &classname)?;
    }

    if let Some(error) = &results.error {
        let mut case_start = BytesStart::new("testcase");
        case_start.push_attribute(("name", "session"));
        case_start.push_attribute(("classname", classname.as_str()));
        writer.write_event(Event::Start(case_start))?;

        let mut error_start = BytesStart::new("error");
        error_start.push_attribute(("message", error.as_str()));
        error_start.push_attribute(("type", "SessionAborted"));
        writer.write_event(Event::Empty(error_start))?;

        writer.write_event(Event::End(BytesEnd::new("testcase")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("testsuite")))?;
    writer.write_event(Event::End(BytesEnd::new("testsuites")))?;

    let result = writer.into_inner().into_inner();
    let xml = String::from_utf8(result)?;
    Ok(xml)
}

fn write_test_case<W: std::io::Write>(
    writer: &mut Writer<W>,
    check: &CheckReport,
    classname: &str,
) -> Result<()> {
    let mut case_start = BytesStart::new("testcase");
    case_start.push_attribute(("name", check.name.as_str()));
    case_start.push_attribute(("classname", classname));
    case_start.push_attribute(("time", seconds(check.duration_ms).as_str()));

    writer.write_event(Event::Start(case_start))?;

    if let CheckStatus::Failed { message } = &check.status {
        let mut fail_start = BytesStart::new("failure");
        fail_start.push_attribute(("message", message.as_str()));
        fail_start.push_attribute(("type", "AssertionError"));
        writer.write_event(Event::Start(fail_start))?;
        writer.write_event(Event::Text(BytesText::new(&format!(
            "state: {}",
            check.state
        ))))?;
        writer.write_event(Event::End(BytesEnd::new("failure")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("testcase")))?;
    Ok(())
}

/// `file:///srv/app/test/index.html` -> `srv.app.test.index`
fn classname(page: &str) -> String {
    let without_scheme = page.split_once("://").map_or(page, |(_, rest)| rest);
    let without_ext = without_scheme
        .strip_suffix(".html")
        .or_else(|| without_scheme.strip_suffix(".htm"))
        .unwrap_or(without_scheme);

    without_ext
        .split(['/', '\\'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}

fn seconds(ms: u64) -> String {
    (ms as f64 / 1000.0).to_string()
}

/// Write report to file
pub fn write_report(results: &TestResults, output_dir: &Path) -> Result<()> {
    let xml = generate_junit_xml(results)?;
    let path = output_dir.join("junit.xml");
    std::fs::write(&path, xml)?;
    println!("    Generated JUnit report: {}", path.display());
    Ok(())
}
