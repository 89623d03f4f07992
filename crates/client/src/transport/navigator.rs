// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client-side location, redirected to the login route when a session ends.

use parking_lot::Mutex;

/// Where the user currently is, and how to send them elsewhere.
pub trait Navigator: Send + Sync {
    fn current_path(&self) -> String;
    fn navigate(&self, path: &str);
}

/// In-process location that records redirects.
pub struct Location {
    path: Mutex<String>,
    history: Mutex<Vec<String>>,
}

impl Location {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: Mutex::new(path.into()), history: Mutex::new(Vec::new()) }
    }

    /// Paths navigated to, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.history.lock().clone()
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for Location {
    fn current_path(&self) -> String {
        self.path.lock().clone()
    }

    fn navigate(&self, path: &str) {
        tracing::info!(to = %path, "navigating");
        *self.path.lock() = path.to_owned();
        self.history.lock().push(path.to_owned());
    }
}
