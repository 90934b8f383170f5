use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use wirecheck::{mock, report, runner, utils};

#[derive(Parser)]
#[command(name = "wirecheck")]
#[command(version = "0.1.0")]
#[command(about = "HTTP API conformance test harness", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the conformance checks against a deployment
    Run {
        /// Base URL of the API under test (overrides config)
        #[arg(short, long)]
        base_url: Option<String>,

        /// YAML suite file or directory (built-in sequence if omitted)
        #[arg(short, long)]
        suite: Option<PathBuf>,

        /// Harness configuration file (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output directory for the results artifact and reports
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Per-request timeout in milliseconds (overrides config)
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Also generate a JUnit XML report
        #[arg(long, default_value = "false")]
        report: bool,

        /// Only run suites carrying all of these tags (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        tags: Option<Vec<String>>,
    },

    /// Generate report from a saved results artifact
    Report {
        /// Path to the results JSON
        results: PathBuf,

        /// Output format (json, junit)
        #[arg(short, long, default_value = "json")]
        format: String,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Serve canned happy-path responses for every built-in endpoint
    Mock {
        /// Server port
        #[arg(short, long, default_value = "8001")]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            base_url,
            suite,
            config,
            output,
            timeout_ms,
            report,
            tags,
        } => {
            let harness_config = utils::config::HarnessConfig::load(config.as_deref())?;

            let base_url = base_url.unwrap_or_else(|| harness_config.base_url.clone());
            let default_timeout_ms = timeout_ms.unwrap_or(harness_config.default_timeout_ms);

            println!(
                "{} Running conformance checks against: {}",
                "▶".green().bold(),
                base_url.cyan()
            );
            if let Some(ref path) = suite {
                println!("  Suite: {}", path.display().to_string().cyan());
            } else {
                println!("  Suite: {}", "builtin".cyan());
            }
            println!("  Output: {}", output.display().to_string().cyan());
            println!("  Timeout: {}ms", default_timeout_ms);
            if let Some(ref tags_list) = tags {
                println!("  Tags: {}", tags_list.join(", ").yellow());
            }
            if report {
                println!("  Reports: {}", "Enabled".green());
            }

            let options = runner::RunOptions {
                base_url,
                suite_path: suite,
                output_dir: output,
                default_timeout_ms,
                report,
                tags,
            };

            let summary = runner::run_checks(&harness_config, &options).await?;

            // Non-zero exit signals overall failure to the invoking process
            if !summary.all_passed() {
                std::process::exit(1);
            }
        }

        Commands::Report {
            results,
            format,
            output,
        } => {
            println!(
                "{} Generating {} report from: {}",
                "📊".to_string().blue(),
                format.cyan(),
                results.display()
            );
            report::generate_report(&results, &format, output.as_deref()).await?;
        }

        Commands::Mock { port } => {
            let server = mock::MockServer::new(mock::MockConfig { port });
            server.start().await?;
        }
    }

    Ok(())
}
