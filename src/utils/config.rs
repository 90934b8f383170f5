use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Harness configuration
///
/// Everything the built-in suite needs to know about the deployment under
/// test. Loadable from a YAML file; every field has a working default for
/// a local deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HarnessConfig {
    /// Base URL of the API under test
    pub base_url: String,

    /// Default per-request timeout (ms)
    pub default_timeout_ms: u64,

    /// Admin credentials for the login check
    pub admin_username: String,
    pub admin_password: String,

    /// Dealer storefront exercised by the public checks
    pub dealer_id: String,
    pub dealer_passcode: String,

    /// Email used by the passcode reset check
    pub reset_email: String,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001".to_string(),
            default_timeout_ms: 10_000,
            admin_username: "admin@example.com".to_string(),
            admin_password: "admin123".to_string(),
            dealer_id: "DEALER-0001".to_string(),
            dealer_passcode: "123456".to_string(),
            reset_email: "test@example.com".to_string(),
        }
    }
}

impl HarnessConfig {
    /// Load configuration from a YAML file, or defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => {
                let content = std::fs::read_to_string(p)
                    .with_context(|| format!("Failed to read config: {}", p.display()))?;
                serde_yaml::from_str(&content)
                    .with_context(|| format!("Failed to parse config: {}", p.display()))
            }
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_target_local_deployment() {
        let config = HarnessConfig::default();
        assert_eq!(config.base_url, "http://localhost:8001");
        assert_eq!(config.default_timeout_ms, 10_000);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "baseUrl: http://staging.example.com\ndealerId: DEALER-0042\n";
        let config: HarnessConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.base_url, "http://staging.example.com");
        assert_eq!(config.dealer_id, "DEALER-0042");
        // Untouched fields fall back to defaults
        assert_eq!(config.default_timeout_ms, 10_000);
    }
}
