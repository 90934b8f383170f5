pub mod json;
pub mod junit;
pub mod types;

use anyhow::Result;
use std::path::Path;

/// Generate report from a saved results artifact
pub async fn generate_report(
    results_path: &Path,
    format: &str,
    output: Option<&Path>,
) -> Result<()> {
    let results = std::fs::read_to_string(results_path)?;
    let test_results: types::TestResults = serde_json::from_str(&results)?;

    match format {
        "json" => json::generate(&test_results, output).await,
        "junit" => {
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
