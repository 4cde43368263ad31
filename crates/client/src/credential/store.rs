// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Token store (§4.D): persist/retrieve `(auth_token, refresh_token)`
//! keyed by `(app_id, project_version_id)`. Atomic write (temp file +
//! rename), adapted from `coop_mux::credential::persist`.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A single persisted token pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedTokens {
    pub auth_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct TokenFile {
    #[serde(flatten)]
    entries: HashMap<String, PersistedTokens>,
}

/// File-backed token store. The storage medium is host-specific in the
/// original system (§4.D); this implementation uses a single JSON file
/// at a host-chosen path, namespaced internally by the `(app_id,
/// project_version_id)` key per §6.
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load tokens for a given app/project version. Returns `None` if no
    /// file exists, the file is unreadable, or no entry matches the key.
    pub fn load(&self, app_id: &str, project_version_id: &str) -> Option<(String, String)> {
        let contents = std::fs::read_to_string(&self.path).ok()?;
        let file: TokenFile = serde_json::from_str(&contents).ok()?;
        let key = key_for(app_id, project_version_id);
        file.entries.get(&key).map(|t| (t.auth_token.clone(), t.refresh_token.clone()))
    }

    /// Save tokens for a given app/project version. Failures are logged,
    /// not propagated (§4.D) — callers never need to branch on this.
    pub fn save(&self, app_id: &str, project_version_id: &str, auth: &str, refresh: &str) {
        if let Err(e) = self.try_save(app_id, project_version_id, auth, refresh) {
            tracing::warn!(err = %e, "failed to persist tokens");
        }
    }

    fn try_save(
        &self,
        app_id: &str,
        project_version_id: &str,
        auth: &str,
        refresh: &str,
    ) -> anyhow::Result<()> {
        let mut file = match std::fs::read_to_string(&self.path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_default(),
            Err(_) => TokenFile::default(),
        };
        let key = key_for(app_id, project_version_id);
        file.entries.insert(
            key,
            PersistedTokens { auth_token: auth.to_owned(), refresh_token: refresh.to_owned() },
        );

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&file)?;
        let tmp_path = self.path.with_extension("tmp");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

fn key_for(app_id: &str, project_version_id: &str) -> String {
    format!("{app_id}-{project_version_id}")
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
