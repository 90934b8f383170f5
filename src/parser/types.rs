use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A parsed conformance suite: run defaults plus an ordered list of checks.
///
/// Declared order is execution order; dependent checks (login before
/// exports) rely on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckSuite {
    #[serde(default)]
    pub name: Option<String>,

    /// Overrides the CLI base URL when set in a suite file.
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default, alias = "defaultTimeout")]
    pub default_timeout_ms: Option<u64>,

    /// Seed variables for `${...}` substitution in paths, bodies and headers.
    #[serde(default)]
    pub vars: Option<HashMap<String, String>>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub checks: Vec<CheckSpec>,
}

impl CheckSuite {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("unnamed suite")
    }
}

/// One declared HTTP request plus its expected-outcome validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckSpec {
    pub name: String,

    /// HTTP method, parsed at execution time ("GET", "POST", ...).
    #[serde(default = "default_method")]
    pub method: String,

    /// Path relative to the base URL. May contain `${...}` placeholders.
    pub path: String,

    /// JSON request body; placeholders are substituted before sending.
    #[serde(default)]
    pub body: Option<serde_json::Value>,

    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,

    /// Context slot holding a bearer token. An empty slot fails the check
    /// before any request is made.
    #[serde(default)]
    pub auth: Option<String>,

    #[serde(default)]
    pub expect: Expect,

    /// Values to pull out of a 200 response into the runner context.
    #[serde(default)]
    pub capture: Vec<Capture>,

    #[serde(default)]
    pub timeout_ms: Option<u64>,

    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_method() -> String {
    "GET".to_string()
}

/// Expected-outcome predicate for one check.
///
/// Status is always verified; body rules only apply on a 200 response, so a
/// tolerated 404 never trips a field assertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expect {
    /// Accepted status codes.
    #[serde(default = "default_status")]
    pub status: Vec<u16>,

    /// Required value of the body's `ok` convention flag.
    #[serde(default)]
    pub ok: Option<bool>,

    /// Fields that must be present (dot paths into the JSON body).
    #[serde(default)]
    pub fields: Vec<String>,

    /// Array fields that must contain every listed member.
    #[serde(default)]
    pub contains: HashMap<String, Vec<serde_json::Value>>,

    /// Parse the body as CSV instead of JSON.
    #[serde(default)]
    pub csv: bool,
}

fn default_status() -> Vec<u16> {
    vec![200]
}

impl Default for Expect {
    fn default() -> Self {
        Self {
            status: default_status(),
            ok: None,
            fields: Vec::new(),
            contains: HashMap::new(),
            csv: false,
        }
    }
}

impl Expect {
    /// Whether the response body must be fetched and validated.
    pub fn wants_body(&self) -> bool {
        self.ok.is_some() || !self.fields.is_empty() || !self.contains.is_empty() || self.csv
    }
}

/// A value extracted from a successful response into the runner context,
/// typically a login token replayed as a bearer credential later.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capture {
    /// Context variable to store into (e.g. `admin_token`).
    pub var: String,

    /// Dot path into the response body (e.g. `token` or `data.token`).
    pub field: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expect_defaults_accept_only_200() {
        let expect = Expect::default();
        assert_eq!(expect.status, vec![200]);
        assert!(!expect.wants_body());
    }

    #[test]
    fn test_expect_wants_body_when_ok_flag_set() {
        let expect = Expect {
            ok: Some(true),
            ..Default::default()
        };
        assert!(expect.wants_body());
    }
}
