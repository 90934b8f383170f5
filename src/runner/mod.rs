pub mod context;
pub mod events;
pub mod executor;
pub mod state;

use anyhow::Result;
use colored::Colorize;
use std::path::{Path, PathBuf};

pub use events::*;
pub use state::*;

use crate::client::ApiClient;
use crate::parser::builtin::builtin_suite;
use crate::parser::types::CheckSuite;
use crate::parser::yaml::parse_suite_file;
use crate::utils::config::HarnessConfig;

/// Options for a conformance run, resolved from CLI flags and config.
pub struct RunOptions {
    pub base_url: String,
    /// Suite file or directory; the built-in sequence when absent.
    pub suite_path: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub default_timeout_ms: u64,
    /// Also emit junit.xml alongside the results artifact.
    pub report: bool,
    /// Only run suites carrying all of these tags.
    pub tags: Option<Vec<String>>,
}

/// Run the configured check sequence and return the summary.
///
/// Everything check-level is isolated inside the executor; an error out of
/// here means the run itself could not be set up or persisted.
pub async fn run_checks(config: &HarnessConfig, options: &RunOptions) -> Result<RunSummary> {
    // 1. Resolve the suites to execute, in deterministic order
    let suites = match &options.suite_path {
        Some(path) => {
            let files = collect_suite_files(path)?;
            if files.is_empty() {
                anyhow::bail!("No suite files found under {}", path.display());
            }
            let mut suites = Vec::new();
            for file in files {
                suites.push(parse_suite_file(&file)?);
            }
            suites
        }
        None => vec![builtin_suite(config)],
    };

    // 2. Tag filtering happens before execution so summary invariants hold
    let suites: Vec<CheckSuite> = match &options.tags {
        Some(required) => {
            let (kept, skipped): (Vec<_>, Vec<_>) = suites
                .into_iter()
                .partition(|s| required.iter().all(|tag| s.tags.contains(tag)));
            for suite in &skipped {
                println!(
                    "{} Skipping suite `{}` (tags {:?} do not match {:?})",
                    "ℹ".blue(),
                    suite.display_name(),
                    suite.tags,
                    required
                );
            }
            kept
        }
        None => suites,
    };

    if suites.is_empty() {
        anyhow::bail!("No suites left to run after tag filtering");
    }

    // 3. Execute strictly sequentially
    let client = ApiClient::new(&options.base_url, options.default_timeout_ms)?;
    let mut executor = executor::CheckExecutor::new(
        client,
        &options.output_dir,
        options.default_timeout_ms,
        options.report,
    );

    for suite in &suites {
        executor.run_suite(suite).await?;
    }

    executor.finish().await
}

/// Collect suite files from a path (single file or a directory walk).
fn collect_suite_files(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.exists() {
        anyhow::bail!("Suite path does not exist: {}", path.display());
    }

    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path()
                .extension()
                .map_or(false, |ext| ext == "yaml" || ext == "yml")
        })
        .map(|e| e.path().to_path_buf())
        .collect();

    // Directory iteration order is platform-dependent; declared order must not be.
    files.sort();

    Ok(files)
}
