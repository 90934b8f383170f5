use super::state::RunSummary;
use tokio::sync::broadcast;

/// Run execution events for real-time console updates
#[derive(Debug, Clone)]
pub enum RunEvent {
    // Session events
    SessionStarted {
        session_id: String,
        base_url: String,
    },
    SessionFinished {
        summary: RunSummary,
    },

    // Suite events
    SuiteStarted {
        suite_name: String,
        check_count: usize,
    },

    // Check events
    CheckStarted {
        index: usize,
        name: String,
    },
    CheckPassed {
        index: usize,
        detail: String,
        duration_ms: u64,
    },
    CheckFailed {
        index: usize,
        error: String,
        duration_ms: u64,
    },

    // Log event for coordinated output
    Log {
        message: String,
    },
}

/// Event emitter for broadcasting run events
pub struct EventEmitter {
    sender: broadcast::Sender<RunEvent>,
}

impl EventEmitter {
    pub fn new() -> (Self, broadcast::Receiver<RunEvent>) {
        let (sender, receiver) = broadcast::channel(100);
        (Self { sender }, receiver)
    }

    pub fn emit(&self, event: RunEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RunEvent> {
        self.sender.subscribe()
    }
}

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration as StdDuration;

/// Console event listener for printing real-time updates
pub struct ConsoleEventListener;

impl ConsoleEventListener {
    pub async fn listen(mut receiver: broadcast::Receiver<RunEvent>) {
        use colored::Colorize;
        use indicatif::ProgressDrawTarget;
        use std::io::IsTerminal;

        // When not a TTY (piped output), hide the spinner to avoid escape codes
        let multi = if std::io::stdout().is_terminal() {
            MultiProgress::new()
        } else {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        };

        // Checks run strictly sequentially, so a single spinner is enough
        let mut spinner: Option<ProgressBar> = None;
        let mut check_text = String::new();

        while let Ok(event) = receiver.recv().await {
            match event {
                RunEvent::SessionStarted {
                    session_id,
                    base_url,
                } => {
                    multi
                        .println(format!(
                            "\n{} Conformance session started: {}",
                            "▶".green().bold(),
                            session_id.cyan()
                        ))
                        .ok();
                    multi
                        .println(format!("  Target: {}", base_url.cyan()))
                        .ok();
                }

                RunEvent::SessionFinished { summary } => {
                    if let Some(pb) = spinner.take() {
                        pb.finish();
                    }

                    // Small delay so a just-finished spinner renders first
                    tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;

                    println!("\n{} Conformance session finished", "■".blue().bold());
                    println!("  Total checks: {}", summary.total_tests);
                    println!(
                        "  {} passed, {} failed",
                        summary.passed_tests.to_string().green(),
                        summary.failed_tests.to_string().red()
                    );
                    println!("  Success rate: {:.1}%", summary.success_rate);
                }

                RunEvent::SuiteStarted {
                    suite_name,
                    check_count,
                } => {
                    println!(
                        "\n  {} Suite: {} ({} checks)",
                        "→".blue(),
                        suite_name.white().bold(),
                        check_count
                    );
                }

                RunEvent::CheckStarted { index, name } => {
                    let pb = multi.add(ProgressBar::new_spinner());
                    let style = ProgressStyle::default_spinner()
                        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
                        .template("    {spinner} {msg}")
                        .unwrap();
                    pb.set_style(style);

                    let body = format!("[{}] {}... ", index, name.dimmed());
                    pb.set_message(body.clone());
                    pb.enable_steady_tick(StdDuration::from_millis(100));

                    spinner = Some(pb);
                    check_text = body;
                }

                RunEvent::CheckPassed {
                    detail,
                    duration_ms,
                    ..
                } => {
                    let done_msg = format!(
                        "    {} {}{} ({}ms)",
                        "✓".green(),
                        check_text,
                        detail.dimmed(),
                        duration_ms
                    );

                    if let Some(pb) = spinner.take() {
                        // Clear the animated line before printing the final one
                        pb.finish_and_clear();
                        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
                        println!("{}", done_msg);
                    } else {
                        println!("{}", done_msg);
                    }
                }

                RunEvent::CheckFailed {
                    error, duration_ms, ..
                } => {
                    let done_msg = format!(
                        "    {} {}({}ms)\n      {}",
                        "✗".red(),
                        check_text,
                        duration_ms,
                        error.red()
                    );

                    if let Some(pb) = spinner.take() {
                        pb.finish_and_clear();
                        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
                        println!("{}", done_msg);
                    } else {
                        println!("{}", done_msg);
                    }
                }

                RunEvent::Log { message } => {
                    multi.println(format!("      {}", message)).ok();
                }
            }
        }
    }
}
