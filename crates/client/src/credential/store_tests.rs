// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn in_memory_store_starts_empty() -> anyhow::Result<()> {
    let store = TokenStore::in_memory();
    assert!(!store.is_authenticated());
    assert_eq!(store.access_token(), None);
    assert_eq!(store.refresh_token(), None);
    assert!(store.path().is_none());
    Ok(())
}

#[test]
fn replace_keeps_previous_refresh_token_when_omitted() -> anyhow::Result<()> {
    let store = TokenStore::in_memory();
    store.replace(TokenPair::new("a1", Some("r1".into())));
    store.replace(TokenPair::new("a2", None));
    assert_eq!(store.access_token().as_deref(), Some("a2"));
    assert_eq!(store.refresh_token().as_deref(), Some("r1"));

    store.replace(TokenPair::new("a3", Some("r3".into())));
    assert_eq!(store.refresh_token().as_deref(), Some("r3"));
    Ok(())
}

#[test]
fn file_store_survives_reload() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("nested/tokens.json");

    let store = TokenStore::with_file(path.clone())?;
    assert!(!store.is_authenticated());
    store.replace(TokenPair::new("access-1", Some("refresh-1".into())));
    assert!(path.exists());

    let reloaded = TokenStore::with_file(path)?;
    assert_eq!(reloaded.get(), Some(TokenPair::new("access-1", Some("refresh-1".into()))));
    Ok(())
}

#[test]
fn persisted_file_uses_camel_case_keys() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("tokens.json");
    let store = TokenStore::with_file(path.clone())?;
    store.replace(TokenPair::new("access-1", Some("refresh-1".into())));

    let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    assert_eq!(raw["accessToken"], "access-1");
    assert_eq!(raw["refreshToken"], "refresh-1");
    assert!(raw["savedAt"].as_u64().is_some());
    Ok(())
}

#[test]
fn clear_removes_file_and_memory() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("tokens.json");
    let store = TokenStore::with_file(path.clone())?;
    store.replace(TokenPair::new("access-1", Some("refresh-1".into())));

    store.clear();
    assert!(!store.is_authenticated());
    assert!(!path.exists());

    // Clearing twice is harmless.
    store.clear();
    Ok(())
}

#[test]
fn corrupt_file_is_an_error() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("tokens.json");
    std::fs::write(&path, "{not json")?;
    assert!(TokenStore::with_file(path).is_err());
    Ok(())
}

#[test]
fn token_pair_debug_redacts_secrets() -> anyhow::Result<()> {
    let pair = TokenPair::new("secret-access", Some("secret-refresh".into()));
    let rendered = format!("{pair:?}");
    assert!(!rendered.contains("secret"));
    assert!(rendered.contains("[REDACTED]"));
    Ok(())
}

#[cfg(unix)]
#[test]
fn token_file_is_owner_only() -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("tokens.json");
    let store = TokenStore::with_file(path.clone())?;
    store.replace(TokenPair::new("access-1", Some("refresh-1".into())));

    let mode = std::fs::metadata(&path)?.permissions().mode() & 0o777;
    assert_eq!(mode, 0o600);
    Ok(())
}

#[test]
fn concurrent_replaces_leave_file_matching_memory() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("tokens.json");
    let store = TokenStore::with_file(path.clone())?;

    std::thread::scope(|s| {
        for worker in 0..8 {
            let store = &store;
            s.spawn(move || {
                for i in 0..25 {
                    store.replace(TokenPair::new(format!("a-{worker}-{i}"), Some(format!("r-{worker}"))));
                }
            });
        }
    });

    let on_disk = persist::load(&path)?.map(PersistedTokens::into_pair);
    assert_eq!(on_disk, store.get());
    Ok(())
}
