use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Check execution status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CheckStatus {
    Pending,
    Running,
    Passed,
    Failed { error: String },
}

/// State for a single check execution
#[derive(Debug, Clone)]
pub struct CheckState {
    pub index: usize,
    pub name: String,
    pub status: CheckStatus,
    /// Human-readable outcome, e.g. "status 200, 4 csv rows".
    pub detail: String,
    /// RFC 3339, set when the check reaches a terminal status.
    pub timestamp: Option<String>,
    pub started_at: Option<Instant>,
    pub finished_at: Option<Instant>,
    pub duration_ms: Option<u64>,
}

impl CheckState {
    pub fn new(index: usize, name: &str) -> Self {
        Self {
            index,
            name: name.to_string(),
            status: CheckStatus::Pending,
            detail: String::new(),
            timestamp: None,
            started_at: None,
            finished_at: None,
            duration_ms: None,
        }
    }

    pub fn start(&mut self) {
        self.status = CheckStatus::Running;
        self.started_at = Some(Instant::now());
    }

    pub fn pass(&mut self, detail: String) {
        self.detail = detail;
        self.finish(CheckStatus::Passed);
    }

    pub fn fail(&mut self, error: String) {
        self.detail = error.clone();
        self.finish(CheckStatus::Failed { error });
    }

    fn finish(&mut self, status: CheckStatus) {
        self.status = status;
        self.finished_at = Some(Instant::now());
        self.timestamp = Some(chrono::Utc::now().to_rfc3339());
        if let Some(start) = self.started_at {
            self.duration_ms = Some(start.elapsed().as_millis() as u64);
        }
    }

    /// Serialize state for reporting (without Instant which isn't serializable)
    pub fn to_result(&self) -> CheckResult {
        CheckResult {
            test: self.name.clone(),
            success: self.status == CheckStatus::Passed,
            details: self.detail.clone(),
            timestamp: self.timestamp.clone().unwrap_or_default(),
            duration_ms: self.duration_ms,
        }
    }
}

/// One recorded result, in the shape downstream reporting tools consume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub test: String,
    pub success: bool,
    pub details: String,
    pub timestamp: String,
    pub duration_ms: Option<u64>,
}

/// Aggregate pass/fail report for a full run. Field names are the artifact
/// contract; do not rename them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_tests: u32,
    pub passed_tests: u32,
    pub failed_tests: u32,
    /// Percentage in [0, 100]; 0 when no checks ran.
    pub success_rate: f64,
    pub results: Vec<CheckResult>,
}

impl RunSummary {
    pub fn all_passed(&self) -> bool {
        self.failed_tests == 0 && self.total_tests == self.passed_tests
    }
}

/// Global session state for one run
#[derive(Debug, Clone)]
pub struct SessionState {
    pub session_id: String,
    pub checks: Vec<CheckState>,
    pub started_at: Option<Instant>,
    pub finished_at: Option<Instant>,
}

impl SessionState {
    pub fn new(session_id: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            checks: Vec::new(),
            started_at: None,
            finished_at: None,
        }
    }

    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
    }

    pub fn add_check(&mut self, check: CheckState) {
        self.checks.push(check);
    }

    pub fn next_index(&self) -> usize {
        self.checks.len()
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Instant::now());
    }

    pub fn summary(&self) -> RunSummary {
        let mut passed = 0u32;
        let mut failed = 0u32;

        for check in &self.checks {
            match check.status {
                CheckStatus::Passed => passed += 1,
                // A run summary only exists once every check is terminal, so
                // anything not passed counts against the total.
                _ => failed += 1,
            }
        }

        let total = passed + failed;
        let success_rate = if total > 0 {
            f64::from(passed) / f64::from(total) * 100.0
        } else {
            0.0
        };

        RunSummary {
            total_tests: total,
            passed_tests: passed,
            failed_tests: failed,
            success_rate,
            results: self.checks.iter().map(|c| c.to_result()).collect(),
        }
    }
}
