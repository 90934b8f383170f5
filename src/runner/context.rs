use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Run-scoped state shared across checks: the output location, seed
/// variables, and any tokens captured along the way.
pub struct RunContext {
    /// Output directory for the results artifact and generated reports
    pub output_dir: PathBuf,

    /// Variables: suite seeds plus values captured from responses
    pub vars: HashMap<String, String>,

    /// Default timeout for requests without a per-check override
    pub default_timeout_ms: u64,
}

impl RunContext {
    pub fn new(output_dir: &Path, default_timeout_ms: u64) -> Self {
        // Always ensure output directory exists
        let _ = std::fs::create_dir_all(output_dir);

        Self {
            output_dir: output_dir.to_path_buf(),
            vars: HashMap::new(),
            default_timeout_ms,
        }
    }

    /// Get the output path for a file
    pub fn output_path(&self, filename: &str) -> PathBuf {
        self.output_dir.join(filename)
    }

    /// Get a variable from vars or the process environment
    pub fn get_var(&self, name: &str) -> Option<String> {
        self.vars
            .get(name)
            .cloned()
            .or_else(|| std::env::var(name).ok())
    }

    /// Set a variable
    pub fn set_var(&mut self, name: &str, value: &str) {
        // Substitute any ${varname} in the value
        let substituted = self.substitute_vars(value);
        self.vars.insert(name.to_string(), substituted);
    }

    /// Store a value verbatim, without placeholder substitution. Captured
    /// response values go through here so a token containing `${` survives.
    pub fn set_raw_var(&mut self, name: &str, value: &str) {
        self.vars.insert(name.to_string(), value.to_string());
    }

    /// Merge seed variables from a suite header
    pub fn merge_vars(&mut self, vars: &HashMap<String, String>) {
        for (k, v) in vars {
            let substituted = self.substitute_vars(v);
            self.vars.insert(k.clone(), substituted);
        }
    }

    /// Substitute ${varname} or ${varname.json.path} patterns in a string
    pub fn substitute_vars(&self, text: &str) -> String {
        // Regex to match ${key} where key can contain dots
        let re = Regex::new(r"\$\{([a-zA-Z0-9_.]+)\}").unwrap();
        let result = re
            .replace_all(text, |caps: &regex::Captures| {
                let full_key = &caps[1];

                // 1. Try explicit full match first
                if let Some(val) = self.get_var(full_key) {
                    return val;
                }

                // 1b. Handle dynamic time variables
                match full_key {
                    "time" => return chrono::Local::now().format("%H:%M:%S").to_string(),
                    "date" => return chrono::Local::now().format("%Y-%m-%d").to_string(),
                    "timestamp" => return chrono::Utc::now().timestamp().to_string(),
                    _ => {}
                }

                // 2. Try splitting by first dot to access JSON object
                if full_key.contains('.') {
                    let parts: Vec<&str> = full_key.splitn(2, '.').collect();
                    if parts.len() == 2 {
                        let var_name = parts[0];
                        let json_path = parts[1];

                        if let Some(json_str) = self.get_var(var_name) {
                            // Try to parse variable content as JSON
                            if let Ok(value) = serde_json::from_str::<serde_json::Value>(&json_str)
                            {
                                // JSON pointer requires / separator instead of .
                                let pointer = format!("/{}", json_path.replace('.', "/"));

                                if let Some(target) = value.pointer(&pointer) {
                                    // Return string representation
                                    if let Some(s) = target.as_str() {
                                        return s.to_string();
                                    }
                                    return target.to_string();
                                }
                            }
                        }
                    }
                }

                // 3. Keep original if not found
                format!("${{{}}}", full_key)
            })
            .to_string();

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> RunContext {
        RunContext::new(Path::new("/tmp/wirecheck-test-output"), 10_000)
    }

    #[test]
    fn test_substitute_simple_var() {
        let mut ctx = context();
        ctx.set_var("dealer_id", "DEALER-0001");
        assert_eq!(
            ctx.substitute_vars("/api/public/qrcode/${dealer_id}"),
            "/api/public/qrcode/DEALER-0001"
        );
    }

    #[test]
    fn test_substitute_unknown_var_is_kept() {
        let ctx = context();
        assert_eq!(ctx.substitute_vars("${nope}/x"), "${nope}/x");
    }

    #[test]
    fn test_substitute_json_path() {
        let mut ctx = context();
        ctx.set_raw_var("login", r#"{"data":{"token":"abc123"}}"#);
        assert_eq!(ctx.substitute_vars("${login.data.token}"), "abc123");
    }

    #[test]
    fn test_raw_var_skips_substitution() {
        let mut ctx = context();
        ctx.set_raw_var("odd_token", "${not.a.var}");
        assert_eq!(ctx.get_var("odd_token").unwrap(), "${not.a.var}");
    }
}
