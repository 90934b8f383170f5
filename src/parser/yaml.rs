use super::types::CheckSuite;
use anyhow::{Context, Result};
use std::path::Path;

/// Parse a YAML suite file into a CheckSuite
pub fn parse_suite_file(path: &Path) -> Result<CheckSuite> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    parse_suite_content(&content)
        .with_context(|| format!("Failed to parse suite: {}", path.display()))
}

/// Parse YAML content into a CheckSuite
pub fn parse_suite_content(content: &str) -> Result<CheckSuite> {
    let suite: CheckSuite =
        serde_yaml::from_str(content).context("Failed to parse YAML content")?;

    if suite.checks.is_empty() {
        anyhow::bail!("Suite declares no checks");
    }

    Ok(suite)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_suite() {
        let yaml = r#"
name: smoke
baseUrl: http://localhost:9000
checks:
  - name: health endpoint
    path: /health
    expect:
      ok: true
"#;
        let suite = parse_suite_content(yaml).expect("should parse");
        assert_eq!(suite.display_name(), "smoke");
        assert_eq!(suite.base_url.as_deref(), Some("http://localhost:9000"));
        assert_eq!(suite.checks.len(), 1);

        let check = &suite.checks[0];
        assert_eq!(check.method, "GET");
        assert_eq!(check.path, "/health");
        assert_eq!(check.expect.status, vec![200]);
        assert_eq!(check.expect.ok, Some(true));
    }

    #[test]
    fn test_parse_check_with_capture_and_auth() {
        let yaml = r#"
checks:
  - name: admin login
    method: POST
    path: /api/admin/login
    body:
      username: a@b.com
      password: secret
    expect:
      ok: true
      fields: [token]
    capture:
      - var: admin_token
        field: token
  - name: export
    path: /api/admin/export/dealers
    auth: admin_token
    expect:
      csv: true
"#;
        let suite = parse_suite_content(yaml).expect("should parse");
        assert_eq!(suite.checks.len(), 2);
        assert_eq!(suite.checks[0].capture[0].var, "admin_token");
        assert_eq!(suite.checks[0].capture[0].field, "token");
        assert_eq!(suite.checks[1].auth.as_deref(), Some("admin_token"));
        assert!(suite.checks[1].expect.csv);
    }

    #[test]
    fn test_parse_status_set() {
        let yaml = r#"
checks:
  - name: maybe missing
    path: /api/public/dealer/D-1
    expect:
      status: [200, 404]
"#;
        let suite = parse_suite_content(yaml).expect("should parse");
        assert_eq!(suite.checks[0].expect.status, vec![200, 404]);
    }

    #[test]
    fn test_empty_suite_rejected() {
        let yaml = "name: empty\nchecks: []\n";
        assert!(parse_suite_content(yaml).is_err());
    }
}
