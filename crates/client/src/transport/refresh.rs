// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-flight token refresh.
//!
//! When a request is rejected with 401 the client asks the coordinator for a
//! fresh access token. The first caller starts the one refresh call on its own
//! task; every caller, the first included, queues a oneshot completion and
//! receives that task's outcome. The queue is drained exactly once per
//! refresh, and a caller that gives up early does not cancel the refresh for
//! the others.
//!
//! All coordination state sits behind one `parking_lot::Mutex` that is only
//! held for the check-and-set, never across an `.await`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::{broadcast, oneshot};

use crate::credential::auth::AuthService;
use crate::credential::store::TokenStore;
use crate::credential::SessionEvent;
use crate::error::ClientError;
use crate::transport::navigator::Navigator;

/// Bounded refresh attempts per rolling window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshLimits {
    pub max_attempts: u32,
    /// Quiet period after which the attempt count returns to zero.
    pub window: Duration,
}

impl Default for RefreshLimits {
    fn default() -> Self {
        Self { max_attempts: 2, window: Duration::from_secs(60) }
    }
}

/// Attempt counter whose reset deadline moves with every attempt.
#[derive(Debug)]
pub struct AttemptWindow {
    limits: RefreshLimits,
    count: u32,
    last: Option<Instant>,
}

impl AttemptWindow {
    pub fn new(limits: RefreshLimits) -> Self {
        Self { limits, count: 0, last: None }
    }

    /// Register an attempt at `now`. Returns `false` once the ceiling is
    /// exceeded inside the window.
    pub fn try_begin(&mut self, now: Instant) -> bool {
        self.expire(now);
        self.last = Some(now);
        self.count = self.count.saturating_add(1);
        self.count <= self.limits.max_attempts
    }

    /// Attempts counted at `now`.
    pub fn count_at(&mut self, now: Instant) -> u32 {
        self.expire(now);
        self.count
    }

    fn expire(&mut self, now: Instant) {
        if let Some(last) = self.last {
            if now.saturating_duration_since(last) >= self.limits.window {
                self.count = 0;
                self.last = None;
            }
        }
    }
}

type Waiter = oneshot::Sender<Result<String, ClientError>>;

struct RefreshState {
    in_flight: bool,
    pending: Vec<Waiter>,
    attempts: AttemptWindow,
}

enum Role {
    Start(oneshot::Receiver<Result<String, ClientError>>),
    Join(oneshot::Receiver<Result<String, ClientError>>),
    Exhausted,
}

/// Serializes token refreshes across concurrent requests.
pub struct RefreshCoordinator {
    auth: Arc<dyn AuthService>,
    store: Arc<TokenStore>,
    navigator: Arc<dyn Navigator>,
    login_route: String,
    state: Mutex<RefreshState>,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl RefreshCoordinator {
    pub fn new(
        auth: Arc<dyn AuthService>,
        store: Arc<TokenStore>,
        navigator: Arc<dyn Navigator>,
        login_route: impl Into<String>,
        limits: RefreshLimits,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(16);
        Self {
            auth,
            store,
            navigator,
            login_route: login_route.into(),
            state: Mutex::new(RefreshState {
                in_flight: false,
                pending: Vec::new(),
                attempts: AttemptWindow::new(limits),
            }),
            event_tx,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    pub fn is_refreshing(&self) -> bool {
        self.state.lock().in_flight
    }

    /// Number of callers waiting on the in-flight refresh.
    pub fn pending_len(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// Refresh attempts counted in the current window.
    pub fn attempts(&self) -> u32 {
        self.state.lock().attempts.count_at(Instant::now())
    }

    /// Obtain a new access token after a 401.
    ///
    /// Starts a refresh when none is in flight, otherwise waits for the one
    /// that is. On failure the session has already been ended (credentials
    /// cleared, navigator sent to the login route) when this returns.
    pub async fn recover(self: &Arc<Self>) -> Result<String, ClientError> {
        let role = {
            let mut state = self.state.lock();
            if state.in_flight {
                let (tx, rx) = oneshot::channel();
                state.pending.push(tx);
                Role::Join(rx)
            } else if !state.attempts.try_begin(Instant::now()) {
                Role::Exhausted
            } else {
                let (tx, rx) = oneshot::channel();
                state.pending.push(tx);
                state.in_flight = true;
                Role::Start(rx)
            }
        };

        let rx = match role {
            Role::Start(rx) => {
                let coordinator = Arc::clone(self);
                tokio::spawn(async move { coordinator.run_refresh().await });
                rx
            }
            Role::Join(rx) => {
                tracing::debug!("refresh in flight, queued");
                rx
            }
            Role::Exhausted => return Err(self.expire_session(ClientError::TooManyRefreshAttempts)),
        };

        match rx.await {
            Ok(outcome) => outcome,
            Err(_) => Err(ClientError::Internal("refresh was abandoned".to_owned())),
        }
    }

    /// End the session: clear credentials, notify subscribers, and navigate
    /// to the login route unless already there. Returns `err` for chaining.
    pub fn expire_session(&self, err: ClientError) -> ClientError {
        tracing::warn!(err = %err, "session ended");
        self.auth.logout();
        let _ = self.event_tx.send(SessionEvent::Expired { reason: err.to_string() });
        if self.navigator.current_path() != self.login_route {
            self.navigator.navigate(&self.login_route);
        }
        err
    }

    async fn run_refresh(&self) {
        let guard = InFlight { coordinator: self, armed: true };
        let previous = self.store.access_token();
        tracing::debug!("refreshing access token");

        let outcome = match self.auth.refresh().await {
            Ok(pair) if pair.access_token.is_empty() => {
                Err(ClientError::SessionExpired("refresh returned an empty token".to_owned()))
            }
            Ok(pair) if previous.as_deref() == Some(pair.access_token.as_str()) => {
                Err(ClientError::TokenUnchanged)
            }
            Ok(pair) => Ok(pair.access_token),
            Err(e @ (ClientError::SessionExpired(_) | ClientError::TokenUnchanged)) => Err(e),
            Err(e) => Err(ClientError::SessionExpired(e.to_string())),
        };

        let outcome = match outcome {
            Ok(token) => {
                tracing::info!("access token refreshed");
                let _ = self.event_tx.send(SessionEvent::Refreshed);
                Ok(token)
            }
            Err(e) => Err(self.expire_session(e)),
        };

        guard.settle(&outcome);
    }

    /// Clear the in-flight flag and hand `outcome` to every queued waiter.
    fn release(&self, outcome: &Result<String, ClientError>) {
        let waiters = {
            let mut state = self.state.lock();
            state.in_flight = false;
            std::mem::take(&mut state.pending)
        };
        if !waiters.is_empty() {
            tracing::debug!(waiters = waiters.len(), ok = outcome.is_ok(), "releasing queued requests");
        }
        for tx in waiters {
            let _ = tx.send(outcome.clone());
        }
    }
}

/// Releases waiters even when the refresh task is torn down mid-refresh.
struct InFlight<'a> {
    coordinator: &'a RefreshCoordinator,
    armed: bool,
}

impl InFlight<'_> {
    fn settle(mut self, outcome: &Result<String, ClientError>) {
        self.armed = false;
        self.coordinator.release(outcome);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.coordinator
                .release(&Err(ClientError::Internal("refresh task stopped".to_owned())));
        }
    }
}

#[cfg(test)]
#[path = "refresh_tests.rs"]
mod tests;
