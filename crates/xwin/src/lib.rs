//! xwin - active window snapshots and focus-change subscriptions
//!
//! The free functions operate on one process-wide [`WindowTracker`], created on first
//! use with the host's native adapter and the user configuration. Build a
//! [`WindowTracker`] directly to use another adapter or configuration.
//!
//! ```no_run
//! let handle = xwin::subscribe_active_window(|window| {
//!     println!("{} ({})", window.title, window.process_id);
//! });
//!
//! xwin::unsubscribe_active_window(handle);
//! ```

mod error;
mod registry;
mod scheduler;
mod snapshot;
mod tracker;
mod watcher;

use once_cell::sync::Lazy;
use tracing::warn;

pub use error::WindowError;
pub use registry::{Callback, SubscriptionHandle};
pub use snapshot::SnapshotReader;
pub use tracker::WindowTracker;
pub use xwin_core::{Config, Platform, ProcessInfo, UsageInfo, WindowInfo, WindowPosition};

static TRACKER: Lazy<WindowTracker> = Lazy::new(|| {
    let config = Config::load().unwrap_or_else(|error| {
        warn!(%error, "failed to load config, using defaults");
        Config::default()
    });
    WindowTracker::native(&config)
});

/// The process-wide tracker behind the free functions.
pub fn tracker() -> &'static WindowTracker {
    &TRACKER
}

/// Information about the currently focused window.
pub fn active_window() -> Result<WindowInfo, WindowError> {
    TRACKER.active_window()
}

/// Information about every open window, at call time.
pub fn open_windows() -> Result<Vec<WindowInfo>, WindowError> {
    TRACKER.open_windows()
}

/// Calls `callback` with the new [`WindowInfo`] each time the focused window changes.
pub fn subscribe_active_window<F>(callback: F) -> SubscriptionHandle
where
    F: Fn(WindowInfo) + Send + Sync + 'static,
{
    TRACKER.subscribe_active_window(callback)
}

pub fn unsubscribe_active_window(handle: SubscriptionHandle) {
    TRACKER.unsubscribe_active_window(handle);
}

pub fn unsubscribe_all_active_window() {
    TRACKER.unsubscribe_all_active_window();
}
