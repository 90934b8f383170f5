use thiserror::Error;

/// Failure taxonomy for a single conformance check.
///
/// Every variant is rendered into the failed check's detail string by the
/// executor; none of these propagate past the check that produced them.
#[derive(Debug, Error)]
pub enum CheckError {
    /// Connection refused, DNS failure, timeout, broken transfer.
    #[error("network error: {0}")]
    Network(String),

    /// Response status was outside the accepted set for this check.
    #[error("unexpected status {actual} (accepted: {accepted})")]
    UnexpectedStatus { actual: u16, accepted: String },

    /// Body could not be parsed as the expected format (JSON or CSV).
    #[error("malformed body: {0}")]
    MalformedBody(String),

    /// A required field was absent from the response body.
    #[error("missing field `{0}` in response body")]
    MissingField(String),

    /// A required field was present but held the wrong value.
    #[error("field `{field}` was {actual}, expected {expected}")]
    UnexpectedValue {
        field: String,
        expected: String,
        actual: String,
    },

    /// The check needs a bearer token that no earlier check captured.
    #[error("no token available in slot `{0}`")]
    MissingPrerequisite(String),

    /// The check declaration itself is unusable (bad method, bad body).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for CheckError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CheckError::Network(format!("request timed out: {}", err))
        } else {
            CheckError::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_prerequisite_detail_mentions_token() {
        let err = CheckError::MissingPrerequisite("admin_token".to_string());
        let msg = err.to_string();
        assert!(msg.contains("no token available"));
        assert!(msg.contains("admin_token"));
    }

    #[test]
    fn test_unexpected_status_detail() {
        let err = CheckError::UnexpectedStatus {
            actual: 500,
            accepted: "[200]".to_string(),
        };
        assert_eq!(err.to_string(), "unexpected status 500 (accepted: [200])");
    }
}
