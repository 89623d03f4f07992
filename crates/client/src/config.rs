// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

/// Command-line client for the fleetdesk logistics API.
#[derive(Debug, Parser)]
#[command(name = "fleetdesk", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub client: ClientConfig,

    /// Log filter (tracing `EnvFilter` syntax).
    #[arg(long, env = "FLEETDESK_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log format (text or json).
    #[arg(long, env = "FLEETDESK_LOG_FORMAT", default_value = "text")]
    pub log_format: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and store the returned tokens.
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "FLEETDESK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account.
    Register {
        #[arg(long)]
        username: String,
        #[arg(long, env = "FLEETDESK_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Clear stored credentials.
    Logout,
    /// Show whether credentials are stored.
    Status,
    /// Send a request through the refresh-aware client and print the JSON response.
    Request {
        /// HTTP method (GET, POST, PUT, PATCH, DELETE).
        method: String,
        /// Path relative to the API URL, e.g. `/orders?page=1`.
        path: String,
        /// JSON request body.
        #[arg(long)]
        data: Option<String>,
    },
}

/// Configuration for the fleetdesk API client.
#[derive(Debug, Clone, clap::Args)]
pub struct ClientConfig {
    /// Base URL of the fleetdesk REST API.
    #[arg(long, default_value = "http://127.0.0.1:8080/api", env = "FLEETDESK_API_URL")]
    pub api_url: String,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 30, env = "FLEETDESK_TIMEOUT_SECS")]
    pub timeout_secs: u64,

    /// Path of the refresh-token endpoint.
    #[arg(long, default_value = "/auths/refresh-token", env = "FLEETDESK_REFRESH_PATH")]
    pub refresh_path: String,

    /// Path of the login endpoint.
    #[arg(long, default_value = "/auths/login", env = "FLEETDESK_LOGIN_PATH")]
    pub login_path: String,

    /// Path of the registration endpoint.
    #[arg(long, default_value = "/auths/register", env = "FLEETDESK_REGISTER_PATH")]
    pub register_path: String,

    /// Client-side route to navigate to when the session ends.
    #[arg(long, default_value = "/auth/login", env = "FLEETDESK_LOGIN_ROUTE")]
    pub login_route: String,

    /// Refresh attempts allowed inside one reset window.
    #[arg(long, default_value_t = 2, env = "FLEETDESK_MAX_REFRESH_ATTEMPTS")]
    pub max_refresh_attempts: u32,

    /// Quiet period (seconds) after which the refresh attempt counter resets.
    #[arg(long, default_value_t = 60, env = "FLEETDESK_REFRESH_WINDOW_SECS")]
    pub refresh_window_secs: u64,

    /// Token file. Defaults to `tokens.json` in the state directory.
    #[arg(long, env = "FLEETDESK_TOKEN_FILE")]
    pub token_file: Option<PathBuf>,

    /// Keep tokens in memory only.
    #[arg(long, env = "FLEETDESK_NO_PERSIST")]
    pub no_persist: bool,
}

impl ClientConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_url.trim().is_empty() {
            anyhow::bail!("--api-url must not be empty");
        }
        if self.max_refresh_attempts == 0 {
            anyhow::bail!("--max-refresh-attempts must be at least 1");
        }
        if self.refresh_window_secs == 0 {
            anyhow::bail!("--refresh-window-secs must be at least 1");
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("--timeout-secs must be at least 1");
        }
        if !self.refresh_path.starts_with('/') {
            anyhow::bail!("--refresh-path must start with '/'");
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn refresh_window(&self) -> Duration {
        Duration::from_secs(self.refresh_window_secs)
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    /// Resolved token file path, or `None` when persistence is disabled.
    pub fn token_path(&self) -> Option<PathBuf> {
        if self.no_persist {
            return None;
        }
        Some(self.token_file.clone().unwrap_or_else(|| state_dir().join("tokens.json")))
    }
}

/// Resolve the state directory for client data.
///
/// Checks `FLEETDESK_STATE_DIR`, then `$XDG_STATE_HOME/fleetdesk`,
/// then `$HOME/.local/state/fleetdesk`.
pub fn state_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("FLEETDESK_STATE_DIR") {
        return PathBuf::from(dir);
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return PathBuf::from(xdg).join("fleetdesk");
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local/state/fleetdesk");
    }
    PathBuf::from(".fleetdesk")
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
