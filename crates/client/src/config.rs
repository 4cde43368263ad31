// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration and the host configuration file loader (§6).

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration supplied by the host game process.
///
/// `app_id` and `project_version_id` may be left unset and resolved later
/// from a host configuration file via [`load_host_config`] — missing
/// config at that point is the one hard, synchronous failure the
/// specification allows (§7).
#[derive(Debug, Clone, Default)]
pub struct InteractiveConfig {
    pub app_id: Option<String>,
    pub project_version_id: Option<String>,
    pub share_code: Option<String>,
    /// OAuth client id used for the short-code and refresh flows.
    pub client_id: String,
    /// Base URL for the short-code/OAuth/discovery HTTPS endpoints.
    /// Overridable so integration tests can point at a loopback fixture.
    pub api_base: String,
}

impl InteractiveConfig {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            app_id: None,
            project_version_id: None,
            share_code: None,
            client_id: client_id.into(),
            api_base: default_api_base(),
        }
    }

    /// Fill in `app_id`/`project_version_id`/`share_code` from the host
    /// configuration file if they are not already set.
    pub fn fill_from_host_file(&mut self, path: &Path) -> anyhow::Result<()> {
        let host = load_host_config(path)?;
        if self.app_id.is_none() {
            self.app_id = Some(host.appid);
        }
        if self.project_version_id.is_none() {
            self.project_version_id = Some(host.projectversionid);
        }
        if self.share_code.is_none() {
            self.share_code = host.sharecode;
        }
        Ok(())
    }

    /// True once both `app_id` and `project_version_id` are known.
    pub fn is_complete(&self) -> bool {
        self.app_id.is_some() && self.project_version_id.is_some()
    }

    /// The key used to namespace persisted tokens (§6).
    pub fn token_store_key(&self) -> anyhow::Result<String> {
        let app_id = self.app_id.as_deref().ok_or_else(|| anyhow::anyhow!("app_id not set"))?;
        let project_version_id = self
            .project_version_id
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("project_version_id not set"))?;
        Ok(format!("{app_id}-{project_version_id}"))
    }
}

fn default_api_base() -> String {
    "https://api.interactive.example".to_owned()
}

/// Shape of the host configuration JSON file read once at startup when
/// `app_id`/`project_version_id` are unset (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    pub appid: String,
    pub projectversionid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sharecode: Option<String>,
}

/// Load the host configuration file from disk.
pub fn load_host_config(path: &Path) -> anyhow::Result<HostConfig> {
    let contents = std::fs::read_to_string(path)?;
    let config: HostConfig = serde_json::from_str(&contents)?;
    Ok(config)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
