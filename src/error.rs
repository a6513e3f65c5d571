//! Error types of the client and their display-oriented categorization.

use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;

use crate::time::{parse_backend_time, relative_format};

/// Backend code signalling scheduled maintenance inside a 500 response.
pub const MAINTENANCE_CODE: i64 = 500;

/// Failure of a single API request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The request was sent but nothing came back (timeout, refused connection).
    #[error("server did not respond: {0}")]
    NoResponse(String),

    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid request url: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// HTTP status of the response, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether this is a 401 from the server.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

/// Error body the backend attaches to 400 and 500 responses.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendError {
    pub code: i64,
    #[serde(default)]
    pub cause: String,
    #[serde(default)]
    pub content: String,
}

/// What a caller shows the user about a failed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub code: i64,
    pub cause: String,
    pub content: String,
    /// The request itself was wrong, as opposed to the server failing.
    pub is_client_error: bool,
}

impl Default for ErrorInfo {
    fn default() -> Self {
        Self {
            code: -1,
            cause: String::new(),
            content: "unexpected error".to_string(),
            is_client_error: false,
        }
    }
}

impl ErrorInfo {
    pub fn from_error(error: Option<&ApiError>) -> Self {
        let mut info = Self::default();
        let Some(error) = error else {
            return info;
        };

        match error {
            ApiError::Status { status: 400, body } => match backend_error(body) {
                Some(backend) => {
                    info = Self {
                        code: backend.code,
                        cause: backend.cause,
                        content: backend.content,
                        is_client_error: true,
                    };
                }
                None => {
                    info.content = body.clone();
                    info.is_client_error = true;
                }
            },
            ApiError::Status { status: 500, body } => match backend_error(body) {
                Some(backend) => {
                    let content = if backend.code == MAINTENANCE_CODE {
                        maintenance_message(&backend.content)
                    } else {
                        backend.content
                    };
                    info = Self {
                        code: backend.code,
                        cause: backend.cause,
                        content,
                        is_client_error: false,
                    };
                }
                None => info.content = body.clone(),
            },
            ApiError::Status { status: 503, .. } => {
                info.content = "too many requests, please try again later".to_string();
            }
            ApiError::Status { body, .. } => info.content = body.clone(),
            ApiError::NoResponse(_) => info.content = "server did not respond".to_string(),
            ApiError::Network(e) if e.is_timeout() || e.is_connect() => {
                info.content = "server did not respond".to_string();
            }
            other => info.content = format!("unexpected error: {}", other),
        }

        info
    }

    /// Whether the failure is scheduled maintenance rather than a rejection.
    pub fn is_maintenance(&self) -> bool {
        self.code == MAINTENANCE_CODE
    }
}

fn backend_error(body: &str) -> Option<BackendError> {
    serde_json::from_str(body).ok()
}

fn maintenance_message(finish_at: &str) -> String {
    match parse_backend_time(finish_at) {
        Some(at) => format!(
            "server under maintenance, expected to finish {}",
            relative_format(at, Utc::now(), true)
        ),
        None => "server under maintenance".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(status: u16, body: &str) -> ApiError {
        ApiError::Status { status, body: body.to_string() }
    }

    #[test]
    fn missing_error_is_unexpected() {
        let info = ErrorInfo::from_error(None);
        assert_eq!(info.code, -1);
        assert_eq!(info.content, "unexpected error");
        assert!(!info.is_client_error);
    }

    #[test]
    fn bad_request_is_client_error() {
        let err = status(400, r#"{"code":1003,"cause":"password","content":"wrong password"}"#);
        let info = ErrorInfo::from_error(Some(&err));
        assert_eq!(info.code, 1003);
        assert_eq!(info.cause, "password");
        assert_eq!(info.content, "wrong password");
        assert!(info.is_client_error);
    }

    #[test]
    fn maintenance_mentions_finish_time() {
        let finish = (Utc::now() + chrono::Duration::hours(2))
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();
        let body = format!(r#"{{"code":500,"cause":"maintenance","content":"{}"}}"#, finish);
        let info = ErrorInfo::from_error(Some(&status(500, &body)));
        assert!(info.is_maintenance());
        assert!(!info.is_client_error);
        assert!(info.content.starts_with("server under maintenance, expected to finish in"));
    }

    #[test]
    fn maintenance_with_unreadable_finish_time() {
        let body = r#"{"code":500,"cause":"maintenance","content":"2022-05-01 13:45:07.12é"}"#;
        let info = ErrorInfo::from_error(Some(&status(500, body)));
        assert!(info.is_maintenance());
        assert_eq!(info.content, "server under maintenance");
    }

    #[test]
    fn server_error_keeps_backend_content() {
        let body = r#"{"code":2001,"cause":"db","content":"database unavailable"}"#;
        let info = ErrorInfo::from_error(Some(&status(500, body)));
        assert_eq!(info.code, 2001);
        assert_eq!(info.content, "database unavailable");
        assert!(!info.is_maintenance());
    }

    #[test]
    fn rate_limit_and_other_statuses() {
        let info = ErrorInfo::from_error(Some(&status(503, "")));
        assert_eq!(info.content, "too many requests, please try again later");
        assert_eq!(info.code, -1);

        let info = ErrorInfo::from_error(Some(&status(404, "not found")));
        assert_eq!(info.content, "not found");
    }

    #[test]
    fn no_response() {
        let info = ErrorInfo::from_error(Some(&ApiError::NoResponse("timeout".into())));
        assert_eq!(info.content, "server did not respond");
    }

    #[test]
    fn unauthorized_status() {
        assert!(status(401, "").is_unauthorized());
        assert!(!status(403, "").is_unauthorized());
        assert_eq!(ApiError::NoResponse("x".into()).status(), None);
    }
}
