// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Named timer service (§4.C): `check_auth_status`, `refresh_short_code`,
//! and `reconnect`. Firing enqueues a marker onto the consumer's event
//! queue rather than mutating state directly — callbacks execute on the
//! main tick, never concurrently with each other, matching
//! `coop_mux::upstream::poller`'s use of `tokio::time::interval` with
//! `MissedTickBehavior::Skip` for its own background poll loops.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A timer firing, delivered on the shared event queue.
#[derive(Debug, Clone)]
pub struct TimerFired(pub &'static str);

/// Manages named periodic timers. `start` replaces any existing timer of
/// the same name; `stop` cancels it.
pub struct TimerService {
    handles: HashMap<&'static str, JoinHandle<()>>,
    fired_tx: mpsc::UnboundedSender<TimerFired>,
}

impl TimerService {
    pub fn new(fired_tx: mpsc::UnboundedSender<TimerFired>) -> Self {
        Self { handles: HashMap::new(), fired_tx }
    }

    /// Start (or replace) a periodic timer that fires every `interval`.
    pub fn start(&mut self, name: &'static str, interval: Duration) {
        self.stop(name);
        let fired_tx = self.fired_tx.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The first tick fires immediately; consumers that need an
            // initial delay should account for it (all three named
            // timers in §4.C are meant to fire on their own interval,
            // not instantly, so skip the immediate first tick).
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if fired_tx.send(TimerFired(name)).is_err() {
                    return;
                }
            }
        });
        self.handles.insert(name, handle);
    }

    /// Start a one-shot timer that fires once after `delay`.
    pub fn start_once(&mut self, name: &'static str, delay: Duration) {
        self.stop(name);
        let fired_tx = self.fired_tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = fired_tx.send(TimerFired(name));
        });
        self.handles.insert(name, handle);
    }

    /// Stop a named timer. No-op if it isn't running.
    pub fn stop(&mut self, name: &'static str) {
        if let Some(handle) = self.handles.remove(name) {
            handle.abort();
        }
    }

    /// Stop every running timer.
    pub fn stop_all(&mut self) {
        for (_, handle) in self.handles.drain() {
            handle.abort();
        }
    }

    pub fn is_running(&self, name: &'static str) -> bool {
        self.handles.contains_key(name)
    }
}

impl Drop for TimerService {
    fn drop(&mut self) {
        self.stop_all();
    }
}

pub const CHECK_AUTH_STATUS: &str = "check_auth_status";
pub const REFRESH_SHORT_CODE: &str = "refresh_short_code";
pub const RECONNECT: &str = "reconnect";

#[cfg(test)]
#[path = "timer_tests.rs"]
mod tests;
