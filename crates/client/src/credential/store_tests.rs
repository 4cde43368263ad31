// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn round_trips_tokens() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let store = TokenStore::new(dir.path().join("tokens.json"));

    assert!(store.load("app", "v1").is_none());

    store.save("app", "v1", "Bearer abc", "refresh-xyz");
    let (auth, refresh) =
        store.load("app", "v1").ok_or_else(|| anyhow::anyhow!("tokens not found after save"))?;
    assert_eq!(auth, "Bearer abc");
    assert_eq!(refresh, "refresh-xyz");
    Ok(())
}

#[test]
fn namespaces_by_app_and_project_version() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let store = TokenStore::new(dir.path().join("tokens.json"));

    store.save("app", "v1", "tok-v1", "refresh-v1");
    store.save("app", "v2", "tok-v2", "refresh-v2");

    let v1 = store.load("app", "v1").ok_or_else(|| anyhow::anyhow!("v1 tokens missing"))?;
    let v2 = store.load("app", "v2").ok_or_else(|| anyhow::anyhow!("v2 tokens missing"))?;
    assert_eq!(v1.0, "tok-v1");
    assert_eq!(v2.0, "tok-v2");
    Ok(())
}

#[test]
fn overwrites_existing_entry_for_same_key() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let store = TokenStore::new(dir.path().join("tokens.json"));

    store.save("app", "v1", "old", "old-refresh");
    store.save("app", "v1", "new", "new-refresh");

    let (auth, refresh) =
        store.load("app", "v1").ok_or_else(|| anyhow::anyhow!("tokens not found"))?;
    assert_eq!(auth, "new");
    assert_eq!(refresh, "new-refresh");
    Ok(())
}
