// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP transport: request interception, single-flight refresh, and the API
//! client that wires them together.

pub mod client;
pub mod interceptor;
pub mod navigator;
pub mod refresh;
pub mod request;

pub use client::ApiClient;
pub use navigator::{Location, Navigator};
pub use refresh::{RefreshCoordinator, RefreshLimits};
pub use request::{ApiRequest, AuthRoutes, RouteKind};
