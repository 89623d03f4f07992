// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fleetdesk: API client for the fleetdesk trucking backend with
//! single-flight token refresh.

pub mod config;
pub mod credential;
pub mod error;
pub mod transport;

use std::sync::Arc;

use reqwest::Method;

use crate::config::{Cli, ClientConfig, Command};
use crate::credential::auth::{
    AuthEndpoints, AuthService, HttpAuthService, LoginRequest, RegisterRequest,
};
use crate::credential::store::TokenStore;
use crate::transport::client::build_http_client;
use crate::transport::interceptor::BearerAuth;
use crate::transport::{
    ApiClient, ApiRequest, AuthRoutes, Location, Navigator, RefreshCoordinator, RefreshLimits,
};

/// A wired-up client: token store, auth service, refresh coordinator and API
/// client sharing one HTTP connection pool.
pub struct Session {
    pub api: ApiClient,
    pub auth: Arc<HttpAuthService>,
    pub store: Arc<TokenStore>,
    pub location: Arc<Location>,
}

impl Session {
    /// Build a session from config, loading persisted tokens when enabled.
    pub fn connect(config: &ClientConfig) -> anyhow::Result<Self> {
        let store = match config.token_path() {
            Some(path) => TokenStore::with_file(path)?,
            None => TokenStore::in_memory(),
        };
        Self::with_store(config, Arc::new(store), Arc::new(Location::default()))
    }

    /// Build a session around an existing store and location.
    pub fn with_store(
        config: &ClientConfig,
        store: Arc<TokenStore>,
        location: Arc<Location>,
    ) -> anyhow::Result<Self> {
        let http = build_http_client(config.timeout())?;
        let base_url = config.base_url().to_owned();

        let auth = Arc::new(HttpAuthService::new(
            http.clone(),
            AuthEndpoints {
                base_url: base_url.clone(),
                refresh_path: config.refresh_path.clone(),
                login_path: config.login_path.clone(),
                register_path: config.register_path.clone(),
            },
            Arc::clone(&store),
        ));

        let coordinator = Arc::new(RefreshCoordinator::new(
            Arc::clone(&auth) as Arc<dyn AuthService>,
            Arc::clone(&store),
            Arc::clone(&location) as Arc<dyn Navigator>,
            config.login_route.clone(),
            RefreshLimits {
                max_attempts: config.max_refresh_attempts,
                window: config.refresh_window(),
            },
        ));

        let api = ApiClient::new(
            base_url,
            http,
            BearerAuth::new(Arc::clone(&store)),
            AuthRoutes::new(config.refresh_path.clone()),
            coordinator,
        );

        Ok(Self { api, auth, store, location })
    }
}

/// Run one CLI command.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let session = Session::connect(&cli.client)?;

    match cli.command {
        Command::Login { username, password } => {
            session.auth.login(&LoginRequest { username, password }).await?;
            println!("logged in");
        }
        Command::Register { username, password, email, full_name, phone } => {
            let form = RegisterRequest { username, password, email, full_name, phone };
            let value = session.auth.register(&form).await?;
            print_json(&value)?;
        }
        Command::Logout => {
            session.auth.logout();
            println!("logged out");
        }
        Command::Status => {
            let status = serde_json::json!({
                "authenticated": session.store.is_authenticated(),
                "hasRefreshToken": session.store.refresh_token().is_some(),
                "tokenFile": session.store.path().map(|p| p.display().to_string()),
            });
            print_json(&status)?;
        }
        Command::Request { method, path, data } => {
            let method = Method::from_bytes(method.to_uppercase().as_bytes())
                .map_err(|_| anyhow::anyhow!("invalid HTTP method: {method}"))?;
            let mut request = ApiRequest::new(method, path);
            if let Some(data) = data {
                let body: serde_json::Value = serde_json::from_str(&data)?;
                request = request.json(&body)?;
            }
            let value: serde_json::Value = session.api.send_json(&request).await?;
            print_json(&value)?;
        }
    }

    Ok(())
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
