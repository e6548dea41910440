use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use serde_json::json;
use tracing::{info, warn};
use xwin::{WindowInfo, WindowTracker};
use xwin_core::{Config, WatcherConfig};

use super::describe;

pub async fn execute(json: bool, interval: Option<u64>) -> Result<()> {
    let mut config = Config::load().unwrap_or_else(|error| {
        warn!(%error, "failed to load config, using defaults");
        Config::default()
    });
    if let Some(interval) = interval {
        config.watcher = WatcherConfig::with_poll_interval(Duration::from_millis(interval));
    }

    let tracker = WindowTracker::native(&config);

    // Unsupported platforms never notify, so fail before subscribing.
    tracker.active_window()?;

    let handle =
        tracker.subscribe_active_window(move |window: WindowInfo| print_change(&window, json));
    info!(
        %handle,
        interval_ms = config.watcher.poll_interval().as_millis() as u64,
        "watching focus changes"
    );

    tokio::signal::ctrl_c().await?;

    tracker.unsubscribe_all_active_window();
    info!("stopped watching");

    Ok(())
}

fn print_change(window: &WindowInfo, json: bool) {
    let now = Local::now();

    if json {
        let line = json!({
            "timestamp": now.to_rfc3339(),
            "window": window,
        });
        println!("{}", line);
    } else {
        println!("[{}] {}", now.format("%H:%M:%S"), describe(window));
    }
}
