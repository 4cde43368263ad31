// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Auth controller (§4.F): explicit state machine driving the short-code
//! bootstrap, token exchange, periodic verification, and refresh flows.
//! Polling is driven by [`crate::timer::TimerService`] ticks rather than
//! an owned sleep loop, unlike `coop_mux::credential::device_code`'s
//! blocking poll — see `credential::shortcode` for why.

use std::time::Duration;

use crate::credential::oauth::TokenResponse;
use crate::credential::shortcode::{self, ShortCodePoll};
use crate::credential::store::TokenStore;
use crate::credential::{refresh as refresh_flow, CredentialConfig};
use crate::error::InteractiveError;
use crate::timer::{self, TimerService};
use crate::transport::http::HttpClient;

/// States of [`AuthController`]'s short-code-to-tokens lifecycle (§4.F).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    NoCredentials,
    ShortCodeOutstanding,
    Exchanging,
    HaveTokens,
    Verifying,
    Refreshing,
    Failed,
}

/// Result of a state transition the caller (the connection controller or
/// the facade) needs to react to.
#[derive(Debug)]
pub enum AuthOutcome {
    /// No caller-visible change.
    None,
    /// Tokens are verified and usable; the connection controller may
    /// proceed to open the transport.
    Ready,
    /// A structured error occurred; the controller remains usable
    /// (except after `Failed`, which is terminal per §4.F).
    Error(InteractiveError),
}

pub struct AuthController {
    state: AuthState,
    http: HttpClient,
    store: TokenStore,
    config: CredentialConfig,
    auth: Option<String>,
    refresh_token: Option<String>,
    short_code: Option<String>,
    short_code_handle: Option<String>,
}

impl AuthController {
    pub fn new(http: HttpClient, store: TokenStore, config: CredentialConfig) -> Self {
        Self {
            state: AuthState::NoCredentials,
            http,
            store,
            config,
            auth: None,
            refresh_token: None,
            short_code: None,
            short_code_handle: None,
        }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    /// The current `Authorization` header value, once in `HaveTokens` or
    /// later states.
    pub fn auth_header(&self) -> Option<&str> {
        self.auth.as_deref()
    }

    /// The short code to display to the user while `ShortCodeOutstanding`.
    pub fn short_code(&self) -> Option<&str> {
        self.short_code.as_deref()
    }

    /// Step 1: Bootstrap (§4.F.1). Checks the token store first; falls
    /// back to requesting a short code.
    pub async fn bootstrap(&mut self, timers: &mut TimerService) -> AuthOutcome {
        if let Some((auth, refresh)) =
            self.store.load(&self.config.app_id, &self.config.project_version_id)
        {
            self.auth = Some(auth);
            self.refresh_token = Some(refresh);
            self.state = AuthState::Verifying;
            return AuthOutcome::None;
        }

        match shortcode::request_short_code(&self.http, &self.config.api_base, &self.config.client_id)
            .await
        {
            Ok(resp) => {
                self.short_code = Some(resp.code);
                self.short_code_handle = Some(resp.handle);
                self.state = AuthState::ShortCodeOutstanding;
                timers.start(timer::REFRESH_SHORT_CODE, Duration::from_secs(resp.expires_in.max(1)));
                timers.start(timer::CHECK_AUTH_STATUS, Duration::from_millis(500));
                AuthOutcome::None
            }
            Err(e) => {
                tracing::warn!(err = %e, "short code request failed");
                AuthOutcome::Error(InteractiveError::auth(e.to_string()))
            }
        }
    }

    /// Dispatch a named timer firing to the relevant step. Returns
    /// `AuthOutcome::Ready` once tokens are verified and usable.
    pub async fn on_timer(&mut self, name: &str, timers: &mut TimerService) -> AuthOutcome {
        match name {
            timer::CHECK_AUTH_STATUS if self.state == AuthState::ShortCodeOutstanding => {
                self.poll_short_code(timers).await
            }
            timer::REFRESH_SHORT_CODE if self.state == AuthState::ShortCodeOutstanding => {
                // The short code expired before redemption; request a new
                // one rather than polling a dead handle forever.
                timers.stop(timer::CHECK_AUTH_STATUS);
                timers.stop(timer::REFRESH_SHORT_CODE);
                self.state = AuthState::NoCredentials;
                self.bootstrap(timers).await
            }
            _ => AuthOutcome::None,
        }
    }

    /// Step 2: Polling (§4.F.2).
    async fn poll_short_code(&mut self, timers: &mut TimerService) -> AuthOutcome {
        let Some(handle) = self.short_code_handle.clone() else {
            return AuthOutcome::None;
        };
        match shortcode::check_short_code(&self.http, &self.config.api_base, &handle).await {
            Ok(ShortCodePoll::Redeemed(code)) => {
                timers.stop(timer::CHECK_AUTH_STATUS);
                timers.stop(timer::REFRESH_SHORT_CODE);
                self.state = AuthState::Exchanging;
                self.exchange(&code).await
            }
            Ok(ShortCodePoll::Pending) => AuthOutcome::None,
            Err(e) => {
                tracing::debug!(err = %e, "short code check failed");
                AuthOutcome::None
            }
        }
    }

    /// Step 3: Exchange (§4.F.3).
    async fn exchange(&mut self, code: &str) -> AuthOutcome {
        match refresh_flow::exchange_code(&self.http, &self.config.api_base, &self.config.client_id, code)
            .await
        {
            Ok(tokens) => {
                self.apply_tokens(tokens);
                self.state = AuthState::HaveTokens;
                AuthOutcome::Ready
            }
            Err(e) => {
                tracing::warn!(err = %e, "token exchange failed");
                self.state = AuthState::Failed;
                AuthOutcome::Error(InteractiveError::auth(e.to_string()))
            }
        }
    }

    /// Step 4: Verify (§4.F.4). `ws_url` is the `wss://` connection URL;
    /// this substitutes scheme `https` to probe without upgrading.
    pub async fn verify_token(&mut self, ws_url: &str, timers: &mut TimerService) -> AuthOutcome {
        let Some(auth) = self.auth.clone() else {
            self.state = AuthState::NoCredentials;
            return self.bootstrap(timers).await;
        };
        self.state = AuthState::Verifying;

        let verify_url = ws_url.replacen("wss://", "https://", 1);
        let headers = [
            ("Authorization", auth.as_str()),
            ("X-Interactive-Version", self.config.project_version_id.as_str()),
            ("X-Protocol-Version", "2.0"),
        ];
        match self.http.get(0, &verify_url, &headers).await {
            Ok(resp) if resp.status == 200 || resp.status == 400 => {
                self.state = AuthState::HaveTokens;
                AuthOutcome::Ready
            }
            Ok(resp) if resp.status == 401 => self.refresh(timers).await,
            Ok(resp) => {
                self.state = AuthState::Failed;
                AuthOutcome::Error(InteractiveError::auth(format!(
                    "token verification returned unexpected status {}",
                    resp.status
                )))
            }
            Err(e) => {
                tracing::warn!(err = %e, "token verification request failed");
                self.state = AuthState::Failed;
                AuthOutcome::Error(InteractiveError::auth(e.to_string()))
            }
        }
    }

    /// Step 5: Refresh (§4.F.5). On failure, falls back to the short-code
    /// flow rather than retrying the refresh itself.
    async fn refresh(&mut self, timers: &mut TimerService) -> AuthOutcome {
        self.state = AuthState::Refreshing;
        let Some(refresh_token) = self.refresh_token.clone() else {
            self.state = AuthState::NoCredentials;
            return self.bootstrap(timers).await;
        };

        match refresh_flow::refresh_token(
            &self.http,
            &self.config.api_base,
            &self.config.client_id,
            &refresh_token,
        )
        .await
        {
            Ok(tokens) => {
                self.apply_tokens(tokens);
                self.state = AuthState::HaveTokens;
                AuthOutcome::Ready
            }
            Err(e) => {
                tracing::warn!(err = %e, "refresh failed, falling back to short-code flow");
                self.auth = None;
                self.refresh_token = None;
                self.state = AuthState::NoCredentials;
                self.bootstrap(timers).await
            }
        }
    }

    fn apply_tokens(&mut self, tokens: TokenResponse) {
        self.auth = Some(format!("Bearer {}", tokens.access_token));
        if let Some(refresh) = tokens.refresh_token {
            self.refresh_token = Some(refresh);
        }
        if let Some(refresh) = &self.refresh_token {
            self.store.save(
                &self.config.app_id,
                &self.config.project_version_id,
                self.auth.as_deref().unwrap_or_default(),
                refresh,
            );
        }
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
