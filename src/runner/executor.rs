use anyhow::{Context, Result};
use colored::Colorize;
use std::collections::HashMap;
use std::path::Path;
use uuid::Uuid;

use super::context::RunContext;
use super::events::{ConsoleEventListener, EventEmitter, RunEvent};
use super::state::{CheckState, RunSummary, SessionState};
use crate::client::{ApiClient, CheckError};
use crate::parser::types::{CheckSpec, CheckSuite, Expect};

/// Executes suites check by check, strictly in declared order.
///
/// A failing check is recorded and the loop moves on; nothing a single
/// check does can abort the run.
pub struct CheckExecutor {
    client: ApiClient,
    context: RunContext,
    session: SessionState,
    emitter: EventEmitter,
    report_enabled: bool,
}

impl CheckExecutor {
    pub fn new(
        client: ApiClient,
        output_dir: &Path,
        default_timeout_ms: u64,
        report_enabled: bool,
    ) -> Self {
        let (emitter, receiver) = EventEmitter::new();

        // Start console listener in background
        tokio::spawn(ConsoleEventListener::listen(receiver));

        Self {
            client,
            context: RunContext::new(output_dir, default_timeout_ms),
            session: SessionState::new(&Uuid::new_v4().to_string()),
            emitter,
            report_enabled,
        }
    }

    /// Subscribe to run events
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<RunEvent> {
        self.emitter.subscribe()
    }

    /// Run every check in a suite, appending to the current session.
    pub async fn run_suite(&mut self, suite: &CheckSuite) -> Result<()> {
        if self.session.started_at.is_none() {
            self.session.start();
            self.emitter.emit(RunEvent::SessionStarted {
                session_id: self.session.session_id.clone(),
                base_url: self.client.base_url().to_string(),
            });
        }

        if let Some(ref url) = suite.base_url {
            self.client.set_base_url(url);
        }
        if let Some(timeout) = suite.default_timeout_ms {
            self.context.default_timeout_ms = timeout;
        }
        if let Some(ref vars) = suite.vars {
            self.context.merge_vars(vars);
        }

        self.emitter.emit(RunEvent::SuiteStarted {
            suite_name: suite.display_name().to_string(),
            check_count: suite.checks.len(),
        });

        for spec in &suite.checks {
            let index = self.session.next_index();
            let mut state = CheckState::new(index, &spec.name);
            state.start();

            self.emitter.emit(RunEvent::CheckStarted {
                index,
                name: spec.name.clone(),
            });

            // Failure isolation: every error becomes a recorded result.
            match self.perform(spec).await {
                Ok(detail) => {
                    state.pass(detail.clone());
                    let duration = state.duration_ms.unwrap_or(0);

                    self.emitter.emit(RunEvent::CheckPassed {
                        index,
                        detail,
                        duration_ms: duration,
                    });
                }
                Err(err) => {
                    let error_msg = err.to_string();
                    state.fail(error_msg.clone());
                    let duration = state.duration_ms.unwrap_or(0);

                    self.emitter.emit(RunEvent::CheckFailed {
                        index,
                        error: error_msg,
                        duration_ms: duration,
                    });
                }
            }

            self.session.add_check(state);
        }

        Ok(())
    }

    /// Execute a single check against the target API.
    async fn perform(&mut self, spec: &CheckSpec) -> std::result::Result<String, CheckError> {
        // Token slots must be resolvable before anything goes on the wire.
        let bearer = match &spec.auth {
            Some(slot) => Some(
                self.context
                    .get_var(slot)
                    .ok_or_else(|| CheckError::MissingPrerequisite(slot.clone()))?,
            ),
            None => None,
        };

        let method = spec
            .method
            .parse::<reqwest::Method>()
            .map_err(|_| CheckError::InvalidRequest(format!("invalid HTTP method: {}", spec.method)))?;

        let path = self.context.substitute_vars(&spec.path);

        let body = match &spec.body {
            Some(value) => {
                let raw = serde_json::to_string(value)
                    .map_err(|e| CheckError::InvalidRequest(e.to_string()))?;
                let substituted = self.context.substitute_vars(&raw);
                let rebuilt: serde_json::Value = serde_json::from_str(&substituted)
                    .map_err(|e| {
                        CheckError::InvalidRequest(format!("body after substitution: {}", e))
                    })?;
                Some(rebuilt)
            }
            None => None,
        };

        let headers: Option<HashMap<String, String>> = spec.headers.as_ref().map(|map| {
            map.iter()
                .map(|(k, v)| (k.clone(), self.context.substitute_vars(v)))
                .collect()
        });

        let timeout_ms = spec.timeout_ms.unwrap_or(self.context.default_timeout_ms);

        let response = self
            .client
            .send(
                method,
                &path,
                body.as_ref(),
                headers.as_ref(),
                bearer.as_deref(),
                Some(timeout_ms),
            )
            .await?;

        let status = response.status().as_u16();
        if !spec.expect.status.contains(&status) {
            return Err(CheckError::UnexpectedStatus {
                actual: status,
                accepted: format!("{:?}", spec.expect.status),
            });
        }

        let mut detail = format!("status {}", status);

        // Body rules and captures apply only on 200 so a tolerated 404 or
        // 401 never trips a field assertion.
        if status == 200 && (spec.expect.wants_body() || !spec.capture.is_empty()) {
            if spec.expect.csv {
                let text = response
                    .text()
                    .await
                    .map_err(|e| CheckError::MalformedBody(e.to_string()))?;
                let rows = validate_csv(&text)?;
                detail = format!("status {}, {} csv rows", status, rows);
            } else {
                let json: serde_json::Value = response
                    .json()
                    .await
                    .map_err(|e| CheckError::MalformedBody(e.to_string()))?;

                validate_body(&spec.expect, &json)?;

                for capture in &spec.capture {
                    let value = lookup_string(&json, &capture.field)
                        .ok_or_else(|| CheckError::MissingField(capture.field.clone()))?;
                    self.context.set_raw_var(&capture.var, &value);
                }
            }
        }

        Ok(detail)
    }

    /// Finish the session, persist the results artifact, and return the
    /// summary. Artifact persistence is the one fatal error in the harness.
    pub async fn finish(&mut self) -> Result<RunSummary> {
        self.session.finish();

        let summary = self.session.summary();

        self.emitter.emit(RunEvent::SessionFinished {
            summary: summary.clone(),
        });

        // Small delay so the listener drains before we print file paths
        tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;

        let artifact = crate::report::types::TestResults {
            session_id: self.session.session_id.clone(),
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            summary: summary.clone(),
        };

        let report_path = self.context.output_path("results.json");
        let json = serde_json::to_string_pretty(&artifact)?;
        std::fs::write(&report_path, json).with_context(|| {
            format!("Failed to write results artifact: {}", report_path.display())
        })?;

        println!(
            "\n{} Results saved to: {}",
            "📄".to_string().blue(),
            report_path.display().to_string().cyan()
        );

        if self.report_enabled {
            crate::report::junit::write_report(&artifact, &self.context.output_dir)?;
        }

        Ok(summary)
    }
}

/// Validate a JSON body against the declared expectations.
fn validate_body(expect: &Expect, json: &serde_json::Value) -> std::result::Result<(), CheckError> {
    if let Some(expected) = expect.ok {
        match lookup_value(json, "ok") {
            Some(serde_json::Value::Bool(actual)) if *actual == expected => {}
            Some(other) => {
                return Err(CheckError::UnexpectedValue {
                    field: "ok".to_string(),
                    expected: expected.to_string(),
                    actual: other.to_string(),
                })
            }
            None => return Err(CheckError::MissingField("ok".to_string())),
        }
    }

    for field in &expect.fields {
        if lookup_value(json, field).is_none() {
            return Err(CheckError::MissingField(field.clone()));
        }
    }

    for (field, members) in &expect.contains {
        let value =
            lookup_value(json, field).ok_or_else(|| CheckError::MissingField(field.clone()))?;
        let array = value.as_array().ok_or_else(|| CheckError::UnexpectedValue {
            field: field.clone(),
            expected: "an array".to_string(),
            actual: value.to_string(),
        })?;

        for member in members {
            if !array.contains(member) {
                return Err(CheckError::UnexpectedValue {
                    field: field.clone(),
                    expected: format!("to contain {}", member),
                    actual: value.to_string(),
                });
            }
        }
    }

    Ok(())
}

/// Resolve a dot path against a JSON body ("data.token" -> /data/token),
/// falling back to plain key access for keys that contain dots.
fn lookup_value<'a>(json: &'a serde_json::Value, path: &str) -> Option<&'a serde_json::Value> {
    let pointer = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path.replace('.', "/"))
    };

    json.pointer(&pointer).or_else(|| json.get(path))
}

fn lookup_string(json: &serde_json::Value, path: &str) -> Option<String> {
    lookup_value(json, path).map(|val| {
        if let Some(s) = val.as_str() {
            s.to_string()
        } else {
            val.to_string()
        }
    })
}

/// Parse a CSV export body, returning the number of data rows.
fn validate_csv(text: &str) -> std::result::Result<usize, CheckError> {
    let mut rdr = csv::Reader::from_reader(text.as_bytes());

    let headers = rdr
        .headers()
        .map_err(|e| CheckError::MalformedBody(format!("csv: {}", e)))?;
    if headers.is_empty() {
        return Err(CheckError::MalformedBody("csv: empty header row".to_string()));
    }

    let mut rows = 0usize;
    for record in rdr.records() {
        record.map_err(|e| CheckError::MalformedBody(format!("csv: {}", e)))?;
        rows += 1;
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::builtin::{builtin_suite, ADMIN_TOKEN};
    use crate::parser::types::{CheckSuite, Expect};
    use crate::utils::config::HarnessConfig;
    use serde_json::json;

    fn temp_output() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("wirecheck-test-{}", Uuid::new_v4()))
    }

    fn single_check_suite(spec: CheckSpec) -> CheckSuite {
        CheckSuite {
            name: Some("test".to_string()),
            base_url: None,
            default_timeout_ms: None,
            vars: None,
            tags: Vec::new(),
            checks: vec![spec],
        }
    }

    fn health_check() -> CheckSpec {
        CheckSpec {
            name: "Health endpoint".to_string(),
            method: "GET".to_string(),
            path: "/health".to_string(),
            body: None,
            headers: None,
            auth: None,
            expect: Expect {
                ok: Some(true),
                ..Default::default()
            },
            capture: Vec::new(),
            timeout_ms: None,
            tags: Vec::new(),
        }
    }

    async fn spawn_router(app: axum::Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });
        format!("http://{}", addr)
    }

    /// Reserve a port nobody is listening on.
    fn dead_base_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("local addr");
        drop(listener);
        format!("http://{}", addr)
    }

    #[test]
    fn test_validate_body_ok_flag() {
        let expect = Expect {
            ok: Some(true),
            ..Default::default()
        };
        assert!(validate_body(&expect, &json!({"ok": true})).is_ok());
        assert!(matches!(
            validate_body(&expect, &json!({"ok": false})),
            Err(CheckError::UnexpectedValue { .. })
        ));
        assert!(matches!(
            validate_body(&expect, &json!({})),
            Err(CheckError::MissingField(_))
        ));
    }

    #[test]
    fn test_validate_body_contains() {
        let expect = Expect {
            contains: HashMap::from([(
                "routes".to_string(),
                vec![json!("/api/public"), json!("/api/admin")],
            )]),
            ..Default::default()
        };

        let full = json!({"routes": ["/api/public", "/api/dealer", "/api/admin"]});
        assert!(validate_body(&expect, &full).is_ok());

        let partial = json!({"routes": ["/api/public"]});
        assert!(matches!(
            validate_body(&expect, &partial),
            Err(CheckError::UnexpectedValue { .. })
        ));
    }

    #[test]
    fn test_lookup_value_dot_path() {
        let json = json!({"data": {"token": "abc"}});
        assert_eq!(
            lookup_string(&json, "data.token").as_deref(),
            Some("abc")
        );
        assert!(lookup_value(&json, "data.missing").is_none());
    }

    #[test]
    fn test_validate_csv_counts_rows() {
        let rows = validate_csv("id,name\nD-1,Alpha\nD-2,Beta\n").expect("valid csv");
        assert_eq!(rows, 2);
    }

    #[tokio::test]
    async fn test_health_check_passes_against_mock() {
        let base_url = spawn_router(crate::mock::router()).await;
        let client = ApiClient::new(&base_url, 5_000).unwrap();
        let mut executor = CheckExecutor::new(client, &temp_output(), 5_000, false);

        executor
            .run_suite(&single_check_suite(health_check()))
            .await
            .unwrap();
        let summary = executor.finish().await.unwrap();

        assert_eq!(summary.total_tests, 1);
        assert_eq!(summary.passed_tests, 1);
        assert!(summary.results[0].success);
    }

    #[tokio::test]
    async fn test_server_error_fails_check() {
        use axum::http::StatusCode;
        use axum::routing::get;

        let app = axum::Router::new()
            .route("/health", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }));
        let base_url = spawn_router(app).await;

        let client = ApiClient::new(&base_url, 5_000).unwrap();
        let mut executor = CheckExecutor::new(client, &temp_output(), 5_000, false);

        executor
            .run_suite(&single_check_suite(health_check()))
            .await
            .unwrap();
        let summary = executor.finish().await.unwrap();

        assert_eq!(summary.failed_tests, 1);
        assert!(summary.results[0].details.contains("unexpected status 500"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_does_not_halt_the_run() {
        let base_url = dead_base_url();
        let client = ApiClient::new(&base_url, 2_000).unwrap();
        let mut executor = CheckExecutor::new(client, &temp_output(), 2_000, false);

        let mut suite = single_check_suite(health_check());
        suite.checks.push(CheckSpec {
            name: "API status endpoint".to_string(),
            path: "/api".to_string(),
            ..health_check()
        });

        executor.run_suite(&suite).await.unwrap();
        let summary = executor.finish().await.unwrap();

        // Both checks ran; neither aborted the sequence.
        assert_eq!(summary.total_tests, 2);
        assert_eq!(summary.failed_tests, 2);
        for result in &summary.results {
            assert!(!result.success);
            assert!(!result.details.is_empty());
        }
    }

    #[tokio::test]
    async fn test_missing_token_short_circuits_without_request() {
        // Dead base URL: if the check hit the network the detail would be a
        // connection error, not the missing-token message.
        let client = ApiClient::new(&dead_base_url(), 2_000).unwrap();
        let mut executor = CheckExecutor::new(client, &temp_output(), 2_000, false);

        let mut spec = health_check();
        spec.name = "CSV export dealers".to_string();
        spec.path = "/api/admin/export/dealers".to_string();
        spec.auth = Some(ADMIN_TOKEN.to_string());
        spec.expect = Expect {
            csv: true,
            ..Default::default()
        };

        executor.run_suite(&single_check_suite(spec)).await.unwrap();
        let summary = executor.finish().await.unwrap();

        assert_eq!(summary.failed_tests, 1);
        assert!(summary.results[0].details.contains("no token available"));
    }

    #[tokio::test]
    async fn test_builtin_suite_end_to_end_against_mock() {
        let base_url = spawn_router(crate::mock::router()).await;
        let output = temp_output();

        let config = HarnessConfig {
            base_url: base_url.clone(),
            ..Default::default()
        };

        let client = ApiClient::new(&base_url, 5_000).unwrap();
        let mut executor = CheckExecutor::new(client, &output, 5_000, false);

        let suite = builtin_suite(&config);
        let declared = suite.checks.len();
        executor.run_suite(&suite).await.unwrap();
        let summary = executor.finish().await.unwrap();

        assert_eq!(summary.total_tests as usize, declared);
        assert_eq!(summary.results.len(), declared);
        assert!(
            summary.all_passed(),
            "failures: {:?}",
            summary
                .results
                .iter()
                .filter(|r| !r.success)
                .map(|r| format!("{}: {}", r.test, r.details))
                .collect::<Vec<_>>()
        );
        assert_eq!(summary.success_rate, 100.0);

        // The artifact is on disk and round-trips.
        let raw = std::fs::read_to_string(output.join("results.json")).unwrap();
        let artifact: crate::report::types::TestResults = serde_json::from_str(&raw).unwrap();
        assert_eq!(artifact.summary.total_tests as usize, declared);
        assert_eq!(
            artifact.summary.passed_tests + artifact.summary.failed_tests,
            artifact.summary.total_tests
        );
    }

    #[tokio::test]
    async fn test_events_emitted_in_order() {
        let base_url = spawn_router(crate::mock::router()).await;
        let client = ApiClient::new(&base_url, 5_000).unwrap();
        let mut executor = CheckExecutor::new(client, &temp_output(), 5_000, false);
        let mut receiver = executor.subscribe();

        executor
            .run_suite(&single_check_suite(health_check()))
            .await
            .unwrap();
        executor.finish().await.unwrap();

        let mut kinds = Vec::new();
        while let Ok(event) = receiver.try_recv() {
            kinds.push(match event {
                RunEvent::SessionStarted { .. } => "session_started",
                RunEvent::SuiteStarted { .. } => "suite_started",
                RunEvent::CheckStarted { .. } => "check_started",
                RunEvent::CheckPassed { .. } => "check_passed",
                RunEvent::CheckFailed { .. } => "check_failed",
                RunEvent::SessionFinished { .. } => "session_finished",
                RunEvent::Log { .. } => "log",
            });
        }

        assert_eq!(
            kinds,
            vec![
                "session_started",
                "suite_started",
                "check_started",
                "check_passed",
                "session_finished",
            ]
        );
    }

    #[tokio::test]
    async fn test_capture_flows_into_later_check() {
        let base_url = spawn_router(crate::mock::router()).await;
        let client = ApiClient::new(&base_url, 5_000).unwrap();
        let mut executor = CheckExecutor::new(client, &temp_output(), 5_000, false);

        let config = HarnessConfig::default();
        let login = CheckSpec {
            name: "Admin login".to_string(),
            method: "POST".to_string(),
            path: "/api/admin/login".to_string(),
            body: Some(json!({
                "username": config.admin_username,
                "password": config.admin_password,
            })),
            capture: vec![crate::parser::types::Capture {
                var: ADMIN_TOKEN.to_string(),
                field: "token".to_string(),
            }],
            ..health_check()
        };
        let export = CheckSpec {
            name: "CSV export dealers".to_string(),
            path: "/api/admin/export/dealers".to_string(),
            auth: Some(ADMIN_TOKEN.to_string()),
            expect: Expect {
                csv: true,
                ..Default::default()
            },
            ..health_check()
        };

        let mut suite = single_check_suite(login);
        suite.checks.push(export);

        executor.run_suite(&suite).await.unwrap();
        let summary = executor.finish().await.unwrap();

        assert!(summary.all_passed(), "results: {:?}", summary.results);
    }
}
