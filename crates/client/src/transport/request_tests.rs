// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    refresh = { "/auths/refresh-token", RouteKind::Refresh },
    refresh_trailing_slash = { "/auths/refresh-token/", RouteKind::Refresh },
    refresh_with_query = { "/auths/refresh-token?source=web", RouteKind::Refresh },
    login = { "/auths/login", RouteKind::AuthExempt },
    register = { "/auths/register", RouteKind::AuthExempt },
    singular_auth = { "/auth/verify-otp", RouteKind::AuthExempt },
    orders = { "/orders", RouteKind::General },
    order_detail = { "/orders/42?include=trucks", RouteKind::General },
    author_lookalike = { "/authors/7", RouteKind::General },
    auth_in_query_only = { "/trucks?filter=auth", RouteKind::General },
)]
fn classify_routes(path: &str, expected: RouteKind) {
    let routes = AuthRoutes::new("/auths/refresh-token");
    assert_eq!(routes.classify(&ApiRequest::get(path)), expected);
}

#[test]
fn route_strips_query_and_fragment() -> anyhow::Result<()> {
    assert_eq!(ApiRequest::get("/orders?page=2").route(), "/orders");
    assert_eq!(ApiRequest::get("/orders#top").route(), "/orders");
    assert_eq!(ApiRequest::get("/orders").route(), "/orders");
    Ok(())
}

#[test]
fn json_body_is_kept_for_replay() -> anyhow::Result<()> {
    let req = ApiRequest::new(Method::POST, "/orders")
        .json(&serde_json::json!({ "pickup": "Da Nang", "weightKg": 1200 }))?;
    let replay = req.clone();
    assert_eq!(replay.id, req.id);
    assert_eq!(replay.body, req.body);
    assert_eq!(replay.body.as_ref().map(|b| b["weightKg"].clone()), Some(1200.into()));
    Ok(())
}

#[test]
fn custom_refresh_path_is_normalized() -> anyhow::Result<()> {
    let routes = AuthRoutes::new("/v2/session/refresh/");
    assert_eq!(routes.refresh_path(), "/v2/session/refresh");
    assert_eq!(routes.classify_path("/v2/session/refresh"), RouteKind::Refresh);
    assert_eq!(routes.classify_path("/v2/session"), RouteKind::General);
    Ok(())
}
