use std::sync::Arc;

use xwin_adapters::native_adapter;
use xwin_core::{Config, WatcherConfig, WindowInfo, WindowQueryAdapter};

use crate::registry::{Callback, SubscriptionHandle, SubscriptionRegistry};
use crate::snapshot::SnapshotReader;
use crate::watcher::ActiveWindowWatcher;
use crate::WindowError;

/// Snapshots and focus-change subscriptions over one window query adapter.
///
/// A tracker owns at most one polling task and one subscriber set. The polling
/// task exists only while there is at least one subscriber.
pub struct WindowTracker {
    reader: SnapshotReader,
    registry: Arc<SubscriptionRegistry>,
}

impl WindowTracker {
    pub fn new(adapter: Arc<dyn WindowQueryAdapter>, config: &WatcherConfig) -> Self {
        Self::with_reader(SnapshotReader::new(adapter), config)
    }

    pub fn with_reader(reader: SnapshotReader, config: &WatcherConfig) -> Self {
        let watcher = ActiveWindowWatcher::new(reader.clone(), config.poll_interval());

        Self {
            reader,
            registry: SubscriptionRegistry::new(watcher),
        }
    }

    /// Tracker bound to the host's native adapter.
    pub fn native(config: &Config) -> Self {
        Self::new(native_adapter(&config.windows), &config.watcher)
    }

    pub fn active_window(&self) -> Result<WindowInfo, WindowError> {
        self.reader.active_window()
    }

    pub fn open_windows(&self) -> Result<Vec<WindowInfo>, WindowError> {
        self.reader.open_windows()
    }

    /// Registers `callback` and returns immediately. The first notification arrives
    /// asynchronously, on a watcher thread, once the active window is known.
    pub fn subscribe_active_window<F>(&self, callback: F) -> SubscriptionHandle
    where
        F: Fn(WindowInfo) + Send + Sync + 'static,
    {
        let callback: Callback = Arc::new(callback);
        self.registry.subscribe(callback)
    }

    pub fn unsubscribe_active_window(&self, handle: SubscriptionHandle) {
        self.registry.unsubscribe(handle);
    }

    pub fn unsubscribe_all_active_window(&self) {
        self.registry.unsubscribe_all();
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.subscriber_count()
    }

    pub fn is_watching(&self) -> bool {
        self.registry.is_polling()
    }
}
