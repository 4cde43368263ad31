// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test(start_paused = true)]
async fn periodic_timer_fires_repeatedly() -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut timers = TimerService::new(tx);
    timers.start("test", Duration::from_millis(100));

    tokio::time::advance(Duration::from_millis(350)).await;
    let mut count = 0;
    while rx.try_recv().is_ok() {
        count += 1;
    }
    assert!(count >= 3, "expected at least 3 fires, got {count}");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn stop_prevents_further_fires() -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut timers = TimerService::new(tx);
    timers.start("test", Duration::from_millis(100));
    tokio::time::advance(Duration::from_millis(150)).await;
    timers.stop("test");
    while rx.try_recv().is_ok() {}

    tokio::time::advance(Duration::from_millis(500)).await;
    assert!(rx.try_recv().is_err());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn start_replaces_existing_timer() -> anyhow::Result<()> {
    let (tx, _rx) = mpsc::unbounded_channel();
    let mut timers = TimerService::new(tx);
    timers.start("test", Duration::from_millis(100));
    assert!(timers.is_running("test"));
    timers.start("test", Duration::from_millis(50));
    assert!(timers.is_running("test"));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn one_shot_fires_once() -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut timers = TimerService::new(tx);
    timers.start_once("test", Duration::from_millis(100));

    tokio::time::advance(Duration::from_millis(500)).await;
    let mut count = 0;
    while rx.try_recv().is_ok() {
        count += 1;
    }
    assert_eq!(count, 1);
    Ok(())
}
