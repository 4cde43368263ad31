// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential subsystem (§4.D, §4.F): short-code bootstrap, token
//! exchange/refresh, persistence, and the auth controller state machine.

pub mod controller;
pub mod oauth;
pub mod refresh;
pub mod shortcode;
pub mod store;

/// Parameters the auth controller needs, pulled out of
/// [`crate::config::InteractiveConfig`] once `app_id`/`project_version_id`
/// are known (§4.F requires both to be resolved before bootstrap starts).
#[derive(Debug, Clone)]
pub struct CredentialConfig {
    pub app_id: String,
    pub project_version_id: String,
    pub client_id: String,
    pub api_base: String,
}

impl CredentialConfig {
    pub fn from_interactive_config(config: &crate::config::InteractiveConfig) -> anyhow::Result<Self> {
        Ok(Self {
            app_id: config
                .app_id
                .clone()
                .ok_or_else(|| anyhow::anyhow!("app_id not set"))?,
            project_version_id: config
                .project_version_id
                .clone()
                .ok_or_else(|| anyhow::anyhow!("project_version_id not set"))?,
            client_id: config.client_id.clone(),
            api_base: config.api_base.clone(),
        })
    }
}
