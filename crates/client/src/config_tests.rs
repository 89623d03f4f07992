// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use super::{Cli, ClientConfig, Command};

#[derive(Debug, Parser)]
struct TestCli {
    #[command(flatten)]
    config: ClientConfig,
}

fn parse(args: &[&str]) -> ClientConfig {
    TestCli::parse_from(args).config
}

#[test]
fn defaults_match_backend_contract() -> anyhow::Result<()> {
    let config = parse(&["fleetdesk"]);
    config.validate()?;
    assert_eq!(config.refresh_path, "/auths/refresh-token");
    assert_eq!(config.login_path, "/auths/login");
    assert_eq!(config.login_route, "/auth/login");
    assert_eq!(config.max_refresh_attempts, 2);
    assert_eq!(config.refresh_window(), Duration::from_secs(60));
    assert_eq!(config.timeout(), Duration::from_secs(30));
    Ok(())
}

#[test]
fn base_url_drops_trailing_slash() -> anyhow::Result<()> {
    let config = parse(&["fleetdesk", "--api-url", "https://tms.example.com/api/"]);
    assert_eq!(config.base_url(), "https://tms.example.com/api");
    Ok(())
}

#[test]
fn token_path_prefers_explicit_file() -> anyhow::Result<()> {
    let config = parse(&["fleetdesk", "--token-file", "/tmp/fd/tokens.json"]);
    assert_eq!(config.token_path(), Some(PathBuf::from("/tmp/fd/tokens.json")));

    let memory_only = parse(&["fleetdesk", "--token-file", "/tmp/x.json", "--no-persist"]);
    assert_eq!(memory_only.token_path(), None);
    Ok(())
}

#[yare::parameterized(
    empty_url = { &["fleetdesk", "--api-url", " "], "--api-url" },
    zero_attempts = { &["fleetdesk", "--max-refresh-attempts", "0"], "--max-refresh-attempts" },
    zero_window = { &["fleetdesk", "--refresh-window-secs", "0"], "--refresh-window-secs" },
    zero_timeout = { &["fleetdesk", "--timeout-secs", "0"], "--timeout-secs" },
    relative_refresh = { &["fleetdesk", "--refresh-path", "auths/refresh"], "--refresh-path" },
)]
fn invalid_config(args: &[&str], expected_substr: &str) {
    let config = parse(args);
    match config.validate() {
        Ok(()) => unreachable!("expected validation failure for {args:?}"),
        Err(e) => assert!(e.to_string().contains(expected_substr), "unexpected error: {e}"),
    }
}

#[test]
fn request_subcommand_parses_method_path_and_body() -> anyhow::Result<()> {
    let cli = Cli::try_parse_from([
        "fleetdesk",
        "--no-persist",
        "request",
        "post",
        "/orders",
        "--data",
        r#"{"truck":"TX-100"}"#,
    ])?;
    assert!(cli.client.no_persist);
    match cli.command {
        Command::Request { method, path, data } => {
            assert_eq!(method, "post");
            assert_eq!(path, "/orders");
            assert_eq!(data.as_deref(), Some(r#"{"truck":"TX-100"}"#));
        }
        other => anyhow::bail!("unexpected command: {other:?}"),
    }
    Ok(())
}
