// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Replayable request descriptors and auth route classification.

use reqwest::Method;
use serde::Serialize;

use crate::error::ClientError;

/// A request that can be sent more than once (original + replay after refresh).
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API base URL, including any query string.
    pub path: String,
    pub body: Option<serde_json::Value>,
    /// Correlates the original send and its replay in logs.
    pub id: uuid::Uuid,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), body: None, id: uuid::Uuid::new_v4() }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ClientError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Path with the query string removed.
    pub fn route(&self) -> &str {
        self.path.split(['?', '#']).next().unwrap_or_default()
    }
}

/// How a 401 on a given path is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    /// The refresh-token endpoint itself: a 401 ends the session.
    Refresh,
    /// Login/register and other auth endpoints: a 401 is returned as-is.
    AuthExempt,
    /// Everything else: a 401 goes through the refresh coordinator.
    General,
}

/// Path segments that mark an endpoint as authentication-related.
const AUTH_SEGMENTS: &[&str] = &["auths", "auth"];

/// Classifies request paths against the configured refresh endpoint.
#[derive(Debug, Clone)]
pub struct AuthRoutes {
    refresh_path: String,
}

impl AuthRoutes {
    pub fn new(refresh_path: impl Into<String>) -> Self {
        let refresh_path = refresh_path.into();
        let refresh_path = refresh_path.trim_end_matches('/').to_owned();
        Self { refresh_path }
    }

    pub fn refresh_path(&self) -> &str {
        &self.refresh_path
    }

    pub fn classify(&self, request: &ApiRequest) -> RouteKind {
        self.classify_path(request.route())
    }

    pub fn classify_path(&self, route: &str) -> RouteKind {
        let route = route.trim_end_matches('/');
        if route == self.refresh_path {
            return RouteKind::Refresh;
        }
        if route.split('/').any(|segment| AUTH_SEGMENTS.contains(&segment)) {
            return RouteKind::AuthExempt;
        }
        RouteKind::General
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
