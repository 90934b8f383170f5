use super::types::TestResults;
use anyhow::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use std::io::Cursor;
use std::path::Path;

/// Generate JUnit XML report string from TestResults
pub fn generate_junit_xml(results: &TestResults) -> Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    // Write XML declaration
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let summary = &results.summary;
    let total_duration: u64 = summary
        .results
        .iter()
        .map(|r| r.duration_ms.unwrap_or(0))
        .sum();

    // <testsuites>
    let mut suites_start = BytesStart::new("testsuites");
    suites_start.push_attribute(("name", "wirecheck-run"));
    suites_start.push_attribute(("tests", summary.total_tests.to_string().as_str()));
    suites_start.push_attribute(("failures", summary.failed_tests.to_string().as_str()));
    suites_start.push_attribute((
        "time",
        (total_duration as f64 / 1000.0).to_string().as_str(),
    ));
    writer.write_event(Event::Start(suites_start))?;

    // Single <testsuite>: one run is one ordered sequence of checks
    let mut suite_start = BytesStart::new("testsuite");
    suite_start.push_attribute(("name", "conformance"));
    suite_start.push_attribute(("tests", summary.total_tests.to_string().as_str()));
    suite_start.push_attribute(("failures", summary.failed_tests.to_string().as_str()));
    suite_start.push_attribute(("id", results.session_id.as_str()));
    suite_start.push_attribute((
        "time",
        (total_duration as f64 / 1000.0).to_string().as_str(),
    ));
    suite_start.push_attribute(("timestamp", results.generated_at.as_str()));
    writer.write_event(Event::Start(suite_start))?;

    for result in &summary.results {
        let mut case_start = BytesStart::new("testcase");
        case_start.push_attribute(("name", result.test.as_str()));
        case_start.push_attribute(("classname", "wirecheck.conformance"));
        case_start.push_attribute((
            "time",
            (result.duration_ms.unwrap_or(0) as f64 / 1000.0)
                .to_string()
                .as_str(),
        ));
        writer.write_event(Event::Start(case_start))?;

        if !result.success {
            let mut fail_start = BytesStart::new("failure");
            fail_start.push_attribute(("message", result.details.as_str()));
            fail_start.push_attribute(("type", "CheckFailure"));
            writer.write_event(Event::Start(fail_start))?;
            writer.write_event(Event::Text(quick_xml::events::BytesText::new(
                &result.details,
            )))?;
            writer.write_event(Event::End(BytesEnd::new("failure")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("testcase")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("testsuite")))?;
    writer.write_event(Event::End(BytesEnd::new("testsuites")))?;

    let result = writer.into_inner().into_inner();
    let xml = String::from_utf8(result)?;
    Ok(xml)
}

/// Write report to file
pub fn write_report(results: &TestResults, output_dir: &Path) -> Result<()> {
    let xml = generate_junit_xml(results)?;
    let path = output_dir.join("junit.xml");
    std::fs::write(&path, xml)?;
    println!("    Generated JUnit report: {}", path.display());
    Ok(())
}
