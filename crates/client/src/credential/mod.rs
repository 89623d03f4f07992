// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential handling: the token store, its file persistence, and the auth
//! service that logs in, refreshes and logs out.
//!
//! Only two strings are kept: the short-lived access token attached to every
//! request and the refresh token exchanged for a new pair when the access
//! token is rejected.

pub mod auth;
pub mod persist;
pub mod store;

use serde::{Deserialize, Serialize};

/// An access/refresh token pair.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self { access_token: access_token.into(), refresh_token }
    }
}

// Tokens never reach log output.
impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Token payload returned by the login, register and refresh endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Some deployments wrap the result in a success flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl TokenResponse {
    /// Convert into a token pair when the payload reports success.
    pub fn into_pair(self) -> Option<TokenPair> {
        if self.success == Some(false) {
            return None;
        }
        match self.auth_token {
            Some(token) if !token.is_empty() => Some(TokenPair::new(token, self.refresh_token)),
            _ => None,
        }
    }
}

/// Session lifecycle events broadcast by the refresh coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A refresh produced a new access token.
    Refreshed,
    /// The session ended and local credentials were cleared.
    Expired { reason: String },
}
