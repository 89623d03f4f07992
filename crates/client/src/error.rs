// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};
use std::fmt;

/// Machine-readable error codes surfaced by the API client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    SessionExpired,
    TooManyRefreshAttempts,
    TokenUnchanged,
    MissingRefreshToken,
    Unauthorized,
    BadRequest,
    NotFound,
    UpstreamError,
    Network,
    Decode,
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SessionExpired => "SESSION_EXPIRED",
            Self::TooManyRefreshAttempts => "TOO_MANY_REFRESH_ATTEMPTS",
            Self::TokenUnchanged => "TOKEN_UNCHANGED",
            Self::MissingRefreshToken => "MISSING_REFRESH_TOKEN",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::BadRequest => "BAD_REQUEST",
            Self::NotFound => "NOT_FOUND",
            Self::UpstreamError => "UPSTREAM_ERROR",
            Self::Network => "NETWORK",
            Self::Decode => "DECODE",
            Self::Internal => "INTERNAL",
        }
    }

    /// Map a backend HTTP status onto a code.
    pub fn from_http_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::Unauthorized,
            404 => Self::NotFound,
            400..=499 => Self::BadRequest,
            500..=599 => Self::UpstreamError,
            _ => Self::Internal,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized error body with machine-readable code and human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// Shapes the backend uses for error payloads.
#[derive(Debug, Deserialize)]
struct BackendError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
}

impl ErrorBody {
    /// Normalize a non-success response body.
    ///
    /// Reads `{ "message", "code" | "error" }` when the body is JSON and falls
    /// back to the raw text (or the status reason) otherwise.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let fallback_code = ErrorCode::from_http_status(status).as_str().to_owned();
        if let Ok(parsed) = serde_json::from_slice::<BackendError>(body) {
            let code = match parsed.code {
                Some(serde_json::Value::String(s)) if !s.is_empty() => s,
                Some(serde_json::Value::Number(n)) => n.to_string(),
                _ => parsed.error.clone().unwrap_or_else(|| fallback_code.clone()),
            };
            let message = parsed
                .message
                .or(parsed.error)
                .unwrap_or_else(|| format!("request failed with status {status}"));
            return Self { code, message };
        }

        let text = String::from_utf8_lossy(body).trim().to_owned();
        let message =
            if text.is_empty() { format!("request failed with status {status}") } else { text };
        Self { code: fallback_code, message }
    }
}

/// Errors returned to callers of the API client.
///
/// Cloneable: a single refresh outcome is delivered to every queued request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The refresh endpoint failed or rejected the refresh token.
    SessionExpired(String),
    /// The refresh ceiling was hit inside the reset window.
    TooManyRefreshAttempts,
    /// The refresh call succeeded but returned the token already in use.
    TokenUnchanged,
    /// No refresh token is stored locally.
    MissingRefreshToken,
    /// Non-success HTTP response, normalized.
    Http { status: u16, body: ErrorBody },
    /// Transport failure (connect, timeout, body read).
    Network(String),
    /// Response body could not be decoded.
    Decode(String),
    /// Local failure (building a request, invalid header value).
    Internal(String),
}

impl ClientError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::SessionExpired(_) => ErrorCode::SessionExpired,
            Self::TooManyRefreshAttempts => ErrorCode::TooManyRefreshAttempts,
            Self::TokenUnchanged => ErrorCode::TokenUnchanged,
            Self::MissingRefreshToken => ErrorCode::MissingRefreshToken,
            Self::Http { status, .. } => ErrorCode::from_http_status(*status),
            Self::Network(_) => ErrorCode::Network,
            Self::Decode(_) => ErrorCode::Decode,
            Self::Internal(_) => ErrorCode::Internal,
        }
    }

    /// HTTP status of the backend response, if this error carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this error ended the session (tokens cleared, login required).
    pub fn is_session_terminal(&self) -> bool {
        matches!(
            self,
            Self::SessionExpired(_)
                | Self::TooManyRefreshAttempts
                | Self::TokenUnchanged
                | Self::MissingRefreshToken
        )
    }

    pub fn to_error_body(&self) -> ErrorBody {
        match self {
            Self::Http { body, .. } => body.clone(),
            other => ErrorBody { code: other.code().as_str().to_owned(), message: other.to_string() },
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SessionExpired(reason) => write!(f, "session expired: {reason}"),
            Self::TooManyRefreshAttempts => f.write_str("too many refresh attempts"),
            Self::TokenUnchanged => f.write_str("token unchanged after refresh"),
            Self::MissingRefreshToken => f.write_str("no refresh token available"),
            Self::Http { status, body } => {
                write!(f, "request failed ({status} {}): {}", body.code, body.message)
            }
            Self::Network(e) => write!(f, "network error: {e}"),
            Self::Decode(e) => write!(f, "decode error: {e}"),
            Self::Internal(e) => write!(f, "internal error: {e}"),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else if e.is_builder() {
            Self::Internal(e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
