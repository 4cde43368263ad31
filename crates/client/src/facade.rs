// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Public facade (§4.K). Owns every internal subsystem; the host drives
//! it via [`InteractiveClient::do_work`], an explicit, host-constructed
//! object rather than a process-wide singleton (§9).

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::config::InteractiveConfig;
use crate::connection::{ConnectionController, ConnectionEvent};
use crate::credential::controller::{AuthController, AuthOutcome, AuthState};
use crate::credential::store::TokenStore;
use crate::credential::CredentialConfig;
use crate::error::InteractiveError;
use crate::events::{EventQueue, InteractiveEvent};
use crate::input::InputAggregator;
use crate::model::{Control, Group, ModelMirror, Participant, Scene};
use crate::protocol::{EngineEvent, InteractivityState, ProtocolEngine};
use crate::timer::{self, TimerFired, TimerService};
use crate::transport::http::HttpClient;

pub struct InteractiveClient {
    config: InteractiveConfig,
    connection: ConnectionController,
    auth: AuthController,
    engine: ProtocolEngine,
    mirror: ModelMirror,
    input: InputAggregator,
    timers: TimerService,
    timer_rx: mpsc::UnboundedReceiver<TimerFired>,
    events: EventQueue,
    disposed: bool,
}

impl InteractiveClient {
    /// Construct the facade. `app_id`/`project_version_id` absence at
    /// this point is the one hard, synchronous failure this constructor
    /// raises (§7) — callers that need the host configuration file
    /// should call [`crate::config::InteractiveConfig::fill_from_host_file`]
    /// first.
    pub fn new(config: InteractiveConfig, token_store_path: PathBuf) -> anyhow::Result<Self> {
        if !config.is_complete() {
            anyhow::bail!("app_id/project_version_id must be set before Initialize");
        }
        let http = HttpClient::new();
        let store = TokenStore::new(token_store_path);
        let credential_config = CredentialConfig::from_interactive_config(&config)?;
        let auth = AuthController::new(http.clone(), store, credential_config);
        let connection = ConnectionController::new(http, config.api_base.clone());
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();
        let timers = TimerService::new(timer_tx);

        Ok(Self {
            config,
            connection,
            auth,
            engine: ProtocolEngine::new(),
            mirror: ModelMirror::new(),
            input: InputAggregator::new(),
            timers,
            timer_rx,
            events: EventQueue::new(),
            disposed: false,
        })
    }

    /// Kick off discovery and the auth bootstrap (§4.F.1, §4.G.1). Call
    /// once before the first [`Self::do_work`].
    pub async fn initialize(&mut self) {
        if let Some(err) = self.connection.discover().await {
            self.events.push(InteractiveEvent::Error(err));
        }

        let outcome = self.auth.bootstrap(&mut self.timers).await;
        self.apply_auth_outcome(outcome);

        // Bootstrap with cached tokens lands in `Verifying` without having
        // made the verify call itself (§4.F.1 only says "go to Verifying");
        // kick that probe off here so cached-token startup doesn't stall
        // until the reconnect timer happens to fire.
        if self.auth.state() == &AuthState::Verifying {
            if let Some(url) = self.connection.discovered_url().map(str::to_owned) {
                let outcome = self.auth.verify_token(&url, &mut self.timers).await;
                self.apply_auth_outcome(outcome);
            }
        }
    }

    /// The host's per-frame pump (§4.K, §5): drains timers and transport
    /// events, dispatches them, shifts the input triple buffer, and
    /// returns everything observed this tick in FIFO order.
    pub async fn do_work(&mut self) -> Vec<InteractiveEvent> {
        if self.disposed {
            return Vec::new();
        }

        while let Ok(fired) = self.timer_rx.try_recv() {
            self.on_timer(fired.0).await;
        }

        let connection_events = self.connection.do_work();
        for event in connection_events {
            self.on_connection_event(event).await;
        }

        self.input.do_work(self.engine.state() == InteractivityState::InteractivityEnabled);

        self.events.drain()
    }

    async fn on_timer(&mut self, name: &'static str) {
        if name == timer::RECONNECT {
            let Some(url) = self.connection.discovered_url().map(str::to_owned) else {
                return;
            };
            let outcome = self.auth.verify_token(&url, &mut self.timers).await;
            self.apply_auth_outcome(outcome);
            return;
        }

        let outcome = self.auth.on_timer(name, &mut self.timers).await;
        self.apply_auth_outcome(outcome);
    }

    fn apply_auth_outcome(&mut self, outcome: AuthOutcome) {
        match outcome {
            AuthOutcome::Ready => self.try_connect(),
            AuthOutcome::Error(err) => self.events.push(InteractiveEvent::Error(err)),
            AuthOutcome::None => {
                if matches!(self.auth.state(), AuthState::ShortCodeOutstanding) {
                    if let Some(event) = self.engine.note_short_code_required() {
                        self.push_engine_event(event);
                    }
                }
            }
        }
    }

    fn try_connect(&mut self) {
        let Some(auth_header) = self.auth.auth_header().map(str::to_owned) else {
            return;
        };
        let project_version_id = self.config.project_version_id.clone().unwrap_or_default();
        let share_code = self.config.share_code.clone();
        if let Err(err) = self.connection.connect(&auth_header, &project_version_id, share_code.as_deref())
        {
            self.events.push(InteractiveEvent::Error(err));
        }
    }

    async fn on_connection_event(&mut self, event: ConnectionEvent) {
        match event {
            ConnectionEvent::Opened => {
                // Await the server `hello` push (§4.G.6). Stop the
                // `reconnect` timer armed on the prior `BackoffStarted` —
                // a successful reopen means there's nothing left to retry.
                self.timers.stop(timer::RECONNECT);
            }
            ConnectionEvent::Message(text) => {
                let events = self.engine.handle_incoming(&text, &mut self.mirror, &mut self.input);
                for engine_event in events {
                    self.push_engine_event(engine_event);
                }
            }
            ConnectionEvent::TransportError(err) => self.events.push(InteractiveEvent::Error(err)),
            ConnectionEvent::FatalClose(err) => self.events.push(InteractiveEvent::Error(err)),
            ConnectionEvent::BackoffStarted => {
                if let Some(event) = self.engine.note_interactivity_disabled() {
                    self.push_engine_event(event);
                }
                self.timers.start(timer::RECONNECT, Duration::from_millis(500));
            }
        }
    }

    fn push_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Send(frame) => match frame.to_json() {
                Ok(json) => self.connection.send(json),
                Err(e) => tracing::warn!(err = %e, "failed to serialize outgoing frame"),
            },
            EngineEvent::StateChanged(state) => {
                self.events.push(InteractiveEvent::InteractivityStateChanged(state))
            }
            EngineEvent::ParticipantStateChanged(user_id) => {
                self.events.push(InteractiveEvent::ParticipantStateChanged { user_id })
            }
            EngineEvent::Button(event) => self.events.push(InteractiveEvent::ButtonEvent(event)),
            EngineEvent::Joystick(event) => self.events.push(InteractiveEvent::JoystickEvent(event)),
            EngineEvent::Message { method, params } => {
                self.events.push(InteractiveEvent::Message(serde_json::json!({
                    "method": method,
                    "params": params,
                })))
            }
            EngineEvent::Error(err) => self.events.push(InteractiveEvent::Error(err)),
        }
    }

    fn send_frame(&mut self, method: &str, params: serde_json::Value) {
        let frame = self.engine.build_rpc(method, params);
        match frame.to_json() {
            Ok(json) => self.connection.send(json),
            Err(e) => tracing::warn!(err = %e, "failed to serialize outgoing frame"),
        }
    }

    // -- Typed getters (§4.K): snapshots, so external mutation can never
    // bypass the mirror's reconciliation. --

    pub fn groups(&self) -> Vec<Group> {
        self.mirror.groups()
    }

    pub fn scenes(&self) -> Vec<Scene> {
        self.mirror.scenes()
    }

    pub fn participants(&self) -> Vec<Participant> {
        self.mirror.participants()
    }

    pub fn buttons(&self) -> Vec<Control> {
        self.mirror.buttons()
    }

    pub fn joysticks(&self) -> Vec<Control> {
        self.mirror.joysticks()
    }

    pub fn interactivity_state(&self) -> InteractivityState {
        self.engine.state()
    }

    pub fn short_code(&self) -> Option<&str> {
        self.auth.short_code()
    }

    pub fn get_button_down(&self, control_id: &str, user_id: u32) -> bool {
        self.input.get_button_down(control_id, user_id)
    }

    pub fn get_button_pressed(&self, control_id: &str, user_id: u32) -> bool {
        self.input.get_button_pressed(control_id, user_id)
    }

    pub fn get_button_up(&self, control_id: &str, user_id: u32) -> bool {
        self.input.get_button_up(control_id, user_id)
    }

    pub fn get_count_of_button_downs(&self, control_id: &str, user_id: u32) -> u32 {
        self.input.get_count_of_button_downs(control_id, user_id)
    }

    pub fn get_count_of_button_presses(&self, control_id: &str, user_id: u32) -> u32 {
        self.input.get_count_of_button_presses(control_id, user_id)
    }

    pub fn get_count_of_button_ups(&self, control_id: &str, user_id: u32) -> u32 {
        self.input.get_count_of_button_ups(control_id, user_id)
    }

    pub fn get_joystick_x(&self, control_id: &str, user_id: u32) -> f64 {
        self.input.get_joystick_x(control_id, user_id)
    }

    pub fn get_joystick_y(&self, control_id: &str, user_id: u32) -> f64 {
        self.input.get_joystick_y(control_id, user_id)
    }

    // -- Mutators (§4.K) --

    /// `StartInteractive()`. A [`ErrorKind::MisuseError`] if initialization
    /// has not completed yet (§7).
    pub fn start_interactive(&mut self) -> Result<(), InteractiveError> {
        if !matches!(
            self.engine.state(),
            InteractivityState::Initialized | InteractivityState::InteractivityDisabled
        ) {
            return Err(InteractiveError::misuse(
                "StartInteractive called before initialization completed",
            ));
        }
        self.engine.set_should_start_interactive(true);
        self.send_frame("ready", serde_json::json!({"isReady": true}));
        Ok(())
    }

    pub fn stop_interactive(&mut self) {
        self.engine.set_should_start_interactive(false);
        self.send_frame("ready", serde_json::json!({"isReady": false}));
    }

    /// `TriggerCooldown(control_id, ms)` (§4.I). A cooldown under 1000 ms
    /// logs an info hint but is not rejected — likely a seconds/ms mixup,
    /// not something worth failing the call over.
    pub fn trigger_cooldown(&mut self, control_id: &str, ms: i64, now_epoch_ms: i64) {
        if ms < 1000 {
            tracing::info!(control_id, ms, "cooldown under 1000ms, possible seconds/ms mixup");
        }
        if let Some(expiration) = self.mirror.trigger_cooldown(control_id, ms, now_epoch_ms) {
            self.send_frame(
                "updateControls",
                serde_json::json!({"control_id": control_id, "cooldown": expiration}),
            );
        }
    }

    pub fn set_current_scene(&mut self, group_id: &str, scene_id: &str) {
        self.send_frame(
            "setCurrentScene",
            serde_json::json!({"group_id": group_id, "scene_id": scene_id}),
        );
    }

    /// `SendMessage(type, params)`: an arbitrary, host-chosen RPC not in
    /// the recognized reply-handler set.
    pub fn send_message(&mut self, message_type: &str, params: serde_json::Value) {
        self.send_frame(message_type, params);
    }

    pub fn capture_transaction(&mut self, transaction_id: &str) {
        self.send_frame("capture", serde_json::json!({"transactionID": transaction_id}));
    }

    pub fn set_control_disabled(&mut self, control_id: &str, disabled: bool) {
        if self.mirror.set_control_disabled(control_id, disabled) {
            self.send_frame(
                "updateControls",
                serde_json::json!({"control_id": control_id, "disabled": disabled}),
            );
        }
    }

    pub fn set_joystick_coordinates(&mut self, control_id: &str, x: f64, y: f64) {
        self.send_frame(
            "setJoystickCoordinates",
            serde_json::json!({"control_id": control_id, "x": x, "y": y}),
        );
    }

    pub fn set_control_help_text(&mut self, control_id: &str, help_text: &str) {
        if self.mirror.set_control_help_text(control_id, help_text) {
            self.send_frame(
                "setButtonControlProperties",
                serde_json::json!({"control_id": control_id, "help_text": help_text}),
            );
        }
    }

    /// `cost` only applies to button controls; a no-op (no frame sent) for
    /// any other control kind.
    pub fn set_control_cost(&mut self, control_id: &str, cost: u32) {
        if self.mirror.set_control_cost(control_id, cost) {
            self.send_frame(
                "setButtonControlProperties",
                serde_json::json!({"control_id": control_id, "cost": cost}),
            );
        }
    }

    /// Client-side progress override, clamped to `0.0..=1.0`.
    pub fn set_control_progress(&mut self, control_id: &str, progress: f64) {
        if self.mirror.set_control_progress(control_id, progress) {
            self.send_frame(
                "setButtonControlProperties",
                serde_json::json!({"control_id": control_id, "progress": progress.clamp(0.0, 1.0)}),
            );
        }
    }

    /// `Dispose()` (§5): stops every timer, closes the socket with a
    /// descriptive reason, and makes further `do_work` calls inert. No
    /// operation is retried after this.
    pub fn dispose(&mut self) {
        self.timers.stop_all();
        self.connection.close(1000, "client disposed".to_owned());
        self.disposed = true;
    }
}
