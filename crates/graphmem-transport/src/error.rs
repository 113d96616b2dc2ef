use thiserror::Error;

const MAX_ERROR_BODY_CHARS: usize = 512;

#[derive(Debug, Error)]
/// Failures raised while executing one request/response exchange.
///
/// Every variant is connectivity-class: the service or the transport is
/// unusable, as opposed to a specific tool call being rejected.
pub enum TransportError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
    #[error("memory service returned non-success status {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("json-rpc error {code}: {message}")]
    JsonRpc { code: i64, message: String },
    #[error("response body has no SSE data line")]
    MissingDataLine,
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl TransportError {
    pub(crate) fn http_status(status: u16, body: &str) -> Self {
        let trimmed = body.trim();
        let body = if trimmed.chars().count() > MAX_ERROR_BODY_CHARS {
            let mut truncated = trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect::<String>();
            truncated.push_str("...");
            truncated
        } else {
            trimmed.to_string()
        };
        Self::HttpStatus { status, body }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Failure half of an operation outcome.
pub enum OperationError {
    /// The service or transport is unusable; callers may queue and retry later.
    #[error("{message}")]
    Connectivity { message: String },
    /// The service processed the request and rejected it.
    #[error("{message}")]
    Application { message: String },
}

impl OperationError {
    pub fn connectivity(message: impl Into<String>) -> Self {
        Self::Connectivity {
            message: message.into(),
        }
    }

    pub fn application(message: impl Into<String>) -> Self {
        Self::Application {
            message: message.into(),
        }
    }

    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connectivity { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Connectivity { message } | Self::Application { message } => message,
        }
    }
}

impl From<TransportError> for OperationError {
    fn from(error: TransportError) -> Self {
        Self::connectivity(error.to_string())
    }
}

/// Tagged outcome of a memory operation.
pub type OperationResult<T> = Result<T, OperationError>;

#[cfg(test)]
mod tests {
    use super::{OperationError, TransportError};

    #[test]
    fn unit_transport_errors_convert_to_connectivity_failures() {
        let error = OperationError::from(TransportError::Timeout { timeout_ms: 250 });
        assert!(error.is_connectivity());
        assert_eq!(error.message(), "request timed out after 250ms");

        let error = OperationError::from(TransportError::JsonRpc {
            code: -32600,
            message: "Bad Request: Missing session ID".to_string(),
        });
        assert!(error.is_connectivity());
        assert!(error.message().contains("Missing session ID"));
    }

    #[test]
    fn unit_application_errors_are_not_connectivity() {
        let error = OperationError::application("group not found");
        assert!(!error.is_connectivity());
        assert_eq!(error.to_string(), "group not found");
    }

    #[test]
    fn regression_http_status_body_is_truncated() {
        let body = "x".repeat(2_000);
        let TransportError::HttpStatus { status, body } = TransportError::http_status(502, &body)
        else {
            panic!("expected http status error");
        };
        assert_eq!(status, 502);
        assert_eq!(body.len(), 515);
        assert!(body.ends_with("..."));
    }
}
