// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use crate::credential::store::TokenStore;

/// Attaches the current access token to outgoing requests.
#[derive(Clone)]
pub struct BearerAuth {
    store: Arc<TokenStore>,
}

impl BearerAuth {
    pub fn new(store: Arc<TokenStore>) -> Self {
        Self { store }
    }

    /// Add `Authorization: Bearer <token>` when a token is stored.
    ///
    /// Without a token the request goes out unauthenticated and the backend
    /// decides.
    pub fn apply(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.store.access_token() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}
