use std::sync::Weak;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, trace, warn};
use xwin_core::{QueryError, WindowInfo};

use crate::registry::SubscriptionRegistry;
use crate::snapshot::SnapshotReader;

/// Polls the active window and reports changes to the subscription registry.
///
/// Holds only configuration; each armed period runs as its own [`PollTask`] with
/// fresh state, stopped through the returned [`WatcherHandle`].
pub struct ActiveWindowWatcher {
    reader: SnapshotReader,
    poll_interval: Duration,
}

/// Cancels the poll task it was returned for, when stopped or dropped.
pub struct WatcherHandle {
    stop_sender: oneshot::Sender<()>,
    generation: u64,
}

struct PollTask {
    reader: SnapshotReader,
    poll_interval: Duration,
    registry: Weak<SubscriptionRegistry>,
    generation: u64,
    last_active_window: Option<WindowInfo>,
    consecutive_failures: u32,
}

impl ActiveWindowWatcher {
    pub fn new(reader: SnapshotReader, poll_interval: Duration) -> Self {
        Self {
            reader,
            poll_interval,
        }
    }

    pub(crate) fn start(
        &self,
        runtime: &Handle,
        registry: Weak<SubscriptionRegistry>,
        generation: u64,
    ) -> WatcherHandle {
        let (stop_sender, stop_receiver) = oneshot::channel();

        let task = PollTask {
            reader: self.reader.clone(),
            poll_interval: self.poll_interval,
            registry,
            generation,
            last_active_window: None,
            consecutive_failures: 0,
        };
        runtime.spawn(task.run(stop_receiver));

        WatcherHandle {
            stop_sender,
            generation,
        }
    }
}

impl WatcherHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn stop(self) {
        // The task may already be gone with its receiver.
        self.stop_sender.send(()).ok();
    }
}

impl PollTask {
    async fn run(mut self, mut stop_receiver: oneshot::Receiver<()>) {
        debug!(
            generation = self.generation,
            interval_ms = self.poll_interval.as_millis() as u64,
            "active window watcher started"
        );

        let mut poll_interval = tokio::time::interval(self.poll_interval);
        poll_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = &mut stop_receiver => break,
                _ = poll_interval.tick() => {
                    if !self.tick().await {
                        break;
                    }
                }
            }
        }

        debug!(generation = self.generation, "active window watcher stopped");
    }

    /// One poll-and-diff cycle. Returns `false` once the registry is gone or the
    /// platform turned out to be unsupported.
    async fn tick(&mut self) -> bool {
        let reader = self.reader.clone();
        let snapshot = tokio::task::spawn_blocking(move || reader.read_active_window()).await;

        let window = match snapshot {
            Ok(Ok(window)) => {
                self.consecutive_failures = 0;
                window
            }
            Ok(Err(QueryError::Unsupported { reason })) => {
                error!(%reason, "active window queries are unsupported, watcher stopped");
                return false;
            }
            Ok(Err(error)) => {
                self.consecutive_failures += 1;
                if self.consecutive_failures == 1 {
                    warn!(%error, "active window query failed, retrying on next tick");
                } else {
                    trace!(%error, failures = self.consecutive_failures, "active window query still failing");
                }
                return true;
            }
            Err(error) => {
                error!(%error, "active window query panicked, retrying on next tick");
                return true;
            }
        };

        if !has_changed(self.last_active_window.as_ref(), &window) {
            trace!("active window unchanged");
            return true;
        }

        let Some(registry) = self.registry.upgrade() else {
            return false;
        };

        let delivered = registry.notify_all(self.generation, &window);
        debug!(
            process_id = window.process_id,
            title = %window.title,
            delivered,
            "active window changed"
        );

        self.last_active_window = Some(window);
        true
    }
}

/// Memory usage is ignored; only process, title and position count as a change.
fn has_changed(last: Option<&WindowInfo>, current: &WindowInfo) -> bool {
    last.map_or(true, |last| !last.is_same_window(current))
}
