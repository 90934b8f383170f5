use crate::runner::state::RunSummary;
use serde::{Deserialize, Serialize};

/// The persisted results artifact, consumed by downstream reporting tools.
///
/// The flattened summary keeps the `total_tests`/`passed_tests`/
/// `failed_tests`/`success_rate`/`results` keys at the top level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResults {
    pub session_id: String,
    pub generated_at: String,
    #[serde(flatten)]
    pub summary: RunSummary,
}
