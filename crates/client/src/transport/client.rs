// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP client for the fleetdesk REST API with transparent token refresh.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ClientError, ErrorBody};
use crate::transport::interceptor::BearerAuth;
use crate::transport::refresh::RefreshCoordinator;
use crate::transport::request::{ApiRequest, AuthRoutes, RouteKind};

/// Install the ring crypto provider for rustls. Safe to call repeatedly.
pub fn install_crypto_provider() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}

/// Build the shared `reqwest::Client` with JSON defaults and a per-call timeout.
pub fn build_http_client(timeout: Duration) -> Result<Client, ClientError> {
    install_crypto_provider();
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
    Client::builder().default_headers(headers).timeout(timeout).build().map_err(ClientError::from)
}

/// Read a response body, turning non-success statuses into a normalized error.
pub(crate) async fn checked_body(resp: reqwest::Response) -> Result<Vec<u8>, ClientError> {
    let status = resp.status();
    let body = resp.bytes().await?;
    if status.is_success() {
        Ok(body.to_vec())
    } else {
        Err(ClientError::Http {
            status: status.as_u16(),
            body: ErrorBody::from_response(status.as_u16(), &body),
        })
    }
}

/// API client. Every request carries the current access token; a 401 on a
/// general endpoint is recovered through the [`RefreshCoordinator`] and the
/// request replayed once.
pub struct ApiClient {
    base_url: String,
    http: Client,
    auth: BearerAuth,
    routes: AuthRoutes,
    coordinator: Arc<RefreshCoordinator>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        http: Client,
        auth: BearerAuth,
        routes: AuthRoutes,
        coordinator: Arc<RefreshCoordinator>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { base_url, http, auth, routes, coordinator }
    }

    pub fn coordinator(&self) -> &Arc<RefreshCoordinator> {
        &self.coordinator
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send `request`, refreshing and replaying once on 401. Returns the raw
    /// body of the successful response.
    pub async fn send(&self, request: &ApiRequest) -> Result<Vec<u8>, ClientError> {
        let resp = self.dispatch(request).await?;
        if resp.status() != StatusCode::UNAUTHORIZED {
            return checked_body(resp).await;
        }

        match self.routes.classify(request) {
            RouteKind::AuthExempt => checked_body(resp).await,
            RouteKind::Refresh => {
                let status = resp.status().as_u16();
                let body = resp.bytes().await.unwrap_or_default();
                let err = ErrorBody::from_response(status, &body);
                Err(self.coordinator.expire_session(ClientError::SessionExpired(format!(
                    "refresh token rejected: {}",
                    err.message
                ))))
            }
            RouteKind::General => {
                tracing::debug!(
                    id = %request.id,
                    method = %request.method,
                    path = %request.path,
                    "unauthorized, recovering session"
                );
                self.coordinator.recover().await?;
                let replay = self.dispatch(request).await?;
                checked_body(replay).await
            }
        }
    }

    async fn dispatch(&self, request: &ApiRequest) -> Result<reqwest::Response, ClientError> {
        let mut req = self.http.request(request.method.clone(), self.url(&request.path));
        if let Some(ref body) = request.body {
            req = req.json(body);
        }
        let req = self.auth.apply(req);

        tracing::debug!(id = %request.id, method = %request.method, path = %request.path, "sending");
        match req.send().await {
            Ok(resp) => {
                tracing::debug!(id = %request.id, status = %resp.status(), "response");
                Ok(resp)
            }
            Err(e) => {
                tracing::warn!(id = %request.id, path = %request.path, err = %e, "request failed");
                Err(e.into())
            }
        }
    }

    /// Send `request` and decode the JSON response. An empty body decodes as
    /// JSON `null`.
    pub async fn send_json<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T, ClientError> {
        let body = self.send(request).await?;
        if body.is_empty() {
            return Ok(serde_json::from_value(serde_json::Value::Null)?);
        }
        Ok(serde_json::from_slice(&body)?)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send_json(&ApiRequest::get(path)).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        self.send_json(&ApiRequest::new(Method::POST, path).json(body)?).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        self.send_json(&ApiRequest::new(Method::PUT, path).json(body)?).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        self.send_json(&ApiRequest::new(Method::PATCH, path).json(body)?).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send_json(&ApiRequest::delete(path)).await
    }
}
