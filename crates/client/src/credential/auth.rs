// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Auth service: login, registration, token refresh and logout against the
//! backend's `/auths` endpoints.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::credential::store::TokenStore;
use crate::credential::{TokenPair, TokenResponse};
use crate::error::{ClientError, ErrorBody};
use crate::transport::client::checked_body;

/// Operations the refresh coordinator needs from the auth layer.
///
/// Injected into the coordinator at construction time.
pub trait AuthService: Send + Sync {
    /// Exchange the stored refresh token for a new pair and store it.
    fn refresh(&self) -> Pin<Box<dyn Future<Output = Result<TokenPair, ClientError>> + Send + '_>>;

    /// Clear all stored credentials.
    fn logout(&self);
}

/// Backend locations of the auth endpoints.
#[derive(Debug, Clone)]
pub struct AuthEndpoints {
    pub base_url: String,
    pub refresh_path: String,
    pub login_path: String,
    pub register_path: String,
}

impl AuthEndpoints {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Login form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Registration form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// Auth service backed by the REST API.
///
/// Talks to the backend with a plain `reqwest::Client` rather than the
/// refresh-aware [`ApiClient`](crate::transport::client::ApiClient), so a
/// rejected refresh never re-enters the refresh flow.
pub struct HttpAuthService {
    http: reqwest::Client,
    endpoints: AuthEndpoints,
    store: Arc<TokenStore>,
}

impl HttpAuthService {
    pub fn new(http: reqwest::Client, endpoints: AuthEndpoints, store: Arc<TokenStore>) -> Self {
        Self { http, endpoints, store }
    }

    pub fn store(&self) -> &Arc<TokenStore> {
        &self.store
    }

    pub fn endpoints(&self) -> &AuthEndpoints {
        &self.endpoints
    }

    /// Authenticate and store the returned token pair.
    pub async fn login(&self, form: &LoginRequest) -> Result<TokenPair, ClientError> {
        let resp =
            self.http.post(self.endpoints.url(&self.endpoints.login_path)).json(form).send().await?;
        let status = resp.status().as_u16();
        let body = checked_body(resp).await?;
        let payload: TokenResponse = serde_json::from_slice(&body)?;
        let message = payload.message.clone();
        let pair = payload.into_pair().ok_or_else(|| ClientError::Http {
            status,
            body: ErrorBody {
                code: "LOGIN_REJECTED".to_owned(),
                message: message.unwrap_or_else(|| "login response carried no token".to_owned()),
            },
        })?;

        self.store.replace(pair.clone());
        tracing::info!(username = %form.username, "logged in");
        Ok(pair)
    }

    /// Create an account. Stores the token pair when the backend returns one.
    pub async fn register(&self, form: &RegisterRequest) -> Result<serde_json::Value, ClientError> {
        let resp = self
            .http
            .post(self.endpoints.url(&self.endpoints.register_path))
            .json(form)
            .send()
            .await?;
        let body = checked_body(resp).await?;
        if body.is_empty() {
            return Ok(serde_json::Value::Null);
        }
        let value: serde_json::Value = serde_json::from_slice(&body)?;

        let tokens = serde_json::from_value::<TokenResponse>(value.clone()).ok();
        if let Some(pair) = tokens.and_then(TokenResponse::into_pair) {
            self.store.replace(pair);
            tracing::info!(username = %form.username, "registered and logged in");
        } else {
            tracing::info!(username = %form.username, "registered");
        }
        Ok(value)
    }

    /// Perform a single refresh request.
    pub async fn do_refresh(&self) -> Result<TokenPair, ClientError> {
        let refresh_token = self.store.refresh_token().ok_or(ClientError::MissingRefreshToken)?;

        let resp = self
            .http
            .post(self.endpoints.url(&self.endpoints.refresh_path))
            .json(&RefreshRequest { refresh_token: &refresh_token })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.bytes().await.unwrap_or_default();
            let err = ErrorBody::from_response(status.as_u16(), &body);
            return Err(ClientError::SessionExpired(format!(
                "refresh rejected ({status}): {}",
                err.message
            )));
        }

        let payload: TokenResponse = resp.json().await?;
        let message = payload.message.clone();
        let pair = payload.into_pair().ok_or_else(|| {
            ClientError::SessionExpired(
                message.unwrap_or_else(|| "refresh response carried no token".to_owned()),
            )
        })?;

        self.store.replace(pair.clone());
        Ok(pair)
    }
}

impl AuthService for HttpAuthService {
    fn refresh(&self) -> Pin<Box<dyn Future<Output = Result<TokenPair, ClientError>> + Send + '_>> {
        Box::pin(self.do_refresh())
    }

    fn logout(&self) {
        self.store.clear();
        tracing::info!("logged out, credentials cleared");
    }
}
