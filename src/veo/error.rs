//! Errors raised by the Veo client and generation workflow, and the typed
//! classification the calling layer reports to the user.

use std::time::Duration;

use serde::Deserialize;

/// Structured error code the service uses for exhausted quota.
pub const QUOTA_EXCEEDED_CODE: u16 = 429;

/// Errors that can occur while generating videos.
#[derive(Debug, thiserror::Error)]
pub enum VeoError {
    #[error("API key not configured")]
    MissingApiKey,

    #[error("Enter a prompt or choose a reference image")]
    EmptyRequest,

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Non-success response whose body was not a structured service error.
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Quota exceeded: {message}")]
    QuotaExceeded { message: String },

    #[error("{message}")]
    Service { code: Option<u16>, message: String },

    #[error("No videos generated")]
    NoVideosGenerated,

    #[error("Generated video {index} has no resource locator")]
    MissingVideoUri { index: usize },

    #[error("Invalid resource locator: {uri}")]
    InvalidResourceUri { uri: String },

    #[error("Generation timed out after {polls} status checks ({elapsed:?})")]
    TimedOut { polls: u32, elapsed: Duration },

    #[error("Generation cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// `{"error": {...}}` envelope returned by the service on failure.
#[derive(Debug, Deserialize)]
pub struct ApiErrorEnvelope {
    pub error: ApiStatus,
}

/// Structured service status carried by error responses and failed operations.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiStatus {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl From<ApiStatus> for VeoError {
    fn from(status: ApiStatus) -> Self {
        let message = if status.message.is_empty() {
            status.status.unwrap_or_else(|| "Unknown error".to_string())
        } else {
            status.message
        };
        if status.code == Some(QUOTA_EXCEEDED_CODE) {
            VeoError::QuotaExceeded { message }
        } else {
            VeoError::Service {
                code: status.code,
                message,
            }
        }
    }
}

/// Turn a non-success response body into a `VeoError`.
///
/// Only a body shaped like `{"error": {...}}` is classified, with or without a
/// code; anything else stays an unstructured `ApiError`.
pub fn error_from_response(status: reqwest::StatusCode, body: &str) -> VeoError {
    match serde_json::from_str::<ApiErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.into(),
        Err(_) => VeoError::ApiError(format!("request failed with status {}: {}", status, body)),
    }
}

/// How a failed submission is reported.
#[derive(Debug, Clone, PartialEq)]
pub enum Failure {
    QuotaExceeded,
    Service { message: String },
    /// Any unstructured failure: transport, IO, missing results.
    Transport { message: String },
    TimedOut { polls: u32 },
    Cancelled,
}

impl Failure {
    /// Status line shown to the user.
    pub fn status_message(&self) -> String {
        match self {
            Failure::QuotaExceeded => "Quota exceeded.".to_string(),
            Failure::Service { message } | Failure::Transport { message } => {
                format!("Error: {}", message)
            }
            Failure::TimedOut { polls } => {
                format!("Error: Generation timed out after {} status checks", polls)
            }
            Failure::Cancelled => "Generation cancelled.".to_string(),
        }
    }
}

impl From<&VeoError> for Failure {
    fn from(error: &VeoError) -> Self {
        match error {
            VeoError::QuotaExceeded { .. } => Failure::QuotaExceeded,
            VeoError::Service { message, .. } => Failure::Service {
                message: message.clone(),
            },
            VeoError::TimedOut { polls, .. } => Failure::TimedOut { polls: *polls },
            VeoError::Cancelled => Failure::Cancelled,
            other => Failure::Transport {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_429_body_is_quota_exceeded() {
        let error = error_from_response(
            reqwest::StatusCode::TOO_MANY_REQUESTS,
            r#"{"error":{"code":429,"message":"Resource has been exhausted","status":"RESOURCE_EXHAUSTED"}}"#,
        );
        assert!(matches!(error, VeoError::QuotaExceeded { .. }));
        assert_eq!(Failure::from(&error), Failure::QuotaExceeded);
        assert_eq!(Failure::from(&error).status_message(), "Quota exceeded.");
    }

    #[test]
    fn test_500_body_reports_service_message() {
        let error = error_from_response(
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"error":{"code":500,"message":"X"}}"#,
        );
        let failure = Failure::from(&error);
        assert_eq!(
            failure,
            Failure::Service {
                message: "X".to_string()
            }
        );
        assert_eq!(failure.status_message(), "Error: X");
    }

    #[test]
    fn test_structured_code_wins_over_http_status() {
        // The body code decides, not the transport status.
        let error = error_from_response(
            reqwest::StatusCode::BAD_REQUEST,
            r#"{"error":{"code":429,"message":"quota"}}"#,
        );
        assert!(matches!(error, VeoError::QuotaExceeded { .. }));
    }

    #[test]
    fn test_unstructured_body_is_generic() {
        let error = error_from_response(reqwest::StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert!(matches!(error, VeoError::ApiError(_)));
        match Failure::from(&error) {
            Failure::Transport { message } => assert!(message.contains("bad gateway")),
            other => panic!("Expected Transport failure, got {:?}", other),
        }
    }

    #[test]
    fn test_no_videos_is_reported_generically() {
        let failure = Failure::from(&VeoError::NoVideosGenerated);
        assert_eq!(failure.status_message(), "Error: No videos generated");
    }

    #[test]
    fn test_timeout_and_cancel_are_distinct() {
        let timed_out = Failure::from(&VeoError::TimedOut {
            polls: 3,
            elapsed: Duration::from_secs(3),
        });
        assert_eq!(timed_out, Failure::TimedOut { polls: 3 });
        assert!(timed_out.status_message().contains("timed out"));
        assert_eq!(Failure::from(&VeoError::Cancelled), Failure::Cancelled);
    }

    #[test]
    fn test_api_status_message_defaults_to_empty() {
        let status: ApiStatus = serde_json::from_str(r#"{"code":503}"#).unwrap();
        assert_eq!(status.code, Some(503));
        assert!(status.message.is_empty());
    }

    #[test]
    fn test_envelope_without_code_reports_message() {
        let error = error_from_response(
            reqwest::StatusCode::BAD_REQUEST,
            r#"{"error":{"message":"bad prompt"}}"#,
        );
        assert!(matches!(error, VeoError::Service { code: None, .. }));
        assert_eq!(Failure::from(&error).status_message(), "Error: bad prompt");
    }
}
