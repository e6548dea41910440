use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, error, trace};
use xwin_core::WindowInfo;

use crate::scheduler::Scheduler;
use crate::watcher::{ActiveWindowWatcher, WatcherHandle};

pub type Callback = Arc<dyn Fn(WindowInfo) + Send + Sync + 'static>;

/// Identifies one subscription. Issued in increasing order and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionHandle(u64);

impl SubscriptionHandle {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl From<u64> for SubscriptionHandle {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<SubscriptionHandle> for u64 {
    fn from(handle: SubscriptionHandle) -> Self {
        handle.0
    }
}

impl fmt::Display for SubscriptionHandle {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Sending side of one subscriber's delivery queue.
struct Subscriber {
    sender: mpsc::UnboundedSender<WindowInfo>,
    active: Arc<AtomicBool>,
}

struct RegistryState {
    subscribers: HashMap<SubscriptionHandle, Subscriber>,
    generation: u64,
    polling: Option<WatcherHandle>,
    latest_active_window: Option<WindowInfo>,
}

/// Subscribers keyed by handle, plus the lifecycle of the watcher feeding them.
///
/// The watcher is armed when the first subscriber arrives and disarmed when the last
/// one leaves. Callbacks never run under the registry lock: each subscriber has its
/// own queue, drained in order by a dedicated delivery task.
pub struct SubscriptionRegistry {
    state: Mutex<RegistryState>,
    next_handle: AtomicU64,
    watcher: ActiveWindowWatcher,
    scheduler: Scheduler,
}

impl SubscriptionRegistry {
    pub fn new(watcher: ActiveWindowWatcher) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(RegistryState {
                subscribers: HashMap::new(),
                generation: 0,
                polling: None,
                latest_active_window: None,
            }),
            next_handle: AtomicU64::new(1),
            watcher,
            scheduler: Scheduler::new(),
        })
    }

    pub fn subscribe(self: &Arc<Self>, callback: Callback) -> SubscriptionHandle {
        let handle = SubscriptionHandle(self.next_handle.fetch_add(1, Ordering::SeqCst));

        let runtime = match self.scheduler.handle() {
            Ok(runtime) => runtime,
            Err(error) => {
                error!(%error, %handle, "failed to start watcher scheduler, subscription inactive");
                return handle;
            }
        };

        let mut state = self.lock_state();

        let subscriber = Subscriber::spawn(handle, callback, &runtime);
        if state.polling.is_some() {
            if let Some(latest) = &state.latest_active_window {
                subscriber.deliver(latest.clone());
            }
        }
        state.subscribers.insert(handle, subscriber);
        debug!(%handle, subscribers = state.subscribers.len(), "subscriber added");

        if state.polling.is_none() {
            state.generation += 1;
            let generation = state.generation;
            state.polling = Some(self.watcher.start(&runtime, Arc::downgrade(self), generation));
            debug!(generation, "watcher armed");
        }

        handle
    }

    /// Unknown or already removed handles are ignored.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) {
        let mut state = self.lock_state();

        match state.subscribers.remove(&handle) {
            Some(subscriber) => {
                subscriber.close();
                debug!(%handle, subscribers = state.subscribers.len(), "subscriber removed");
            }
            None => trace!(%handle, "unsubscribe for unknown handle ignored"),
        }

        if state.subscribers.is_empty() {
            Self::disarm(&mut state);
        }
    }

    pub fn unsubscribe_all(&self) {
        let mut state = self.lock_state();

        let removed = state.subscribers.len();
        for (_, subscriber) in state.subscribers.drain() {
            subscriber.close();
        }
        debug!(removed, "all subscribers removed");

        Self::disarm(&mut state);
    }

    /// Queues `window` for every current subscriber. Ignored when `generation` is not
    /// the currently armed watcher, so a stopped poll task can never deliver.
    pub(crate) fn notify_all(&self, generation: u64, window: &WindowInfo) -> usize {
        let mut state = self.lock_state();

        let armed_generation = state.polling.as_ref().map(WatcherHandle::generation);
        if armed_generation != Some(generation) {
            trace!(generation, "discarding notification from stopped watcher");
            return 0;
        }

        state.latest_active_window = Some(window.clone());
        for subscriber in state.subscribers.values() {
            subscriber.deliver(window.clone());
        }

        state.subscribers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock_state().subscribers.len()
    }

    pub fn is_polling(&self) -> bool {
        self.lock_state().polling.is_some()
    }

    fn disarm(state: &mut RegistryState) {
        if let Some(watcher) = state.polling.take() {
            debug!(generation = watcher.generation(), "watcher disarmed");
            watcher.stop();
        }
        state.latest_active_window = None;
    }

    /// Subscribers are only touched through short non-panicking sections, so a
    /// poisoned map is still consistent.
    fn lock_state(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Subscriber {
    fn spawn(handle: SubscriptionHandle, callback: Callback, runtime: &Handle) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<WindowInfo>();
        let active = Arc::new(AtomicBool::new(true));
        let still_active = active.clone();

        runtime.spawn(async move {
            while let Some(window) = receiver.recv().await {
                if !still_active.load(Ordering::Acquire) {
                    break;
                }

                let callback = callback.clone();
                if let Err(error) = tokio::task::spawn_blocking(move || callback(window)).await {
                    if error.is_panic() {
                        error!(%handle, "subscriber callback panicked");
                    } else {
                        error!(%handle, %error, "subscriber callback did not complete");
                    }
                }
            }

            trace!(%handle, "delivery stopped");
        });

        Self { sender, active }
    }

    fn deliver(&self, window: WindowInfo) {
        // A closed queue means the delivery task already stopped.
        self.sender.send(window).ok();
    }

    fn close(&self) {
        self.active.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc as std_mpsc;
    use std::time::Duration;
    use xwin_adapters::FailingWindowAdapter;
    use xwin_core::Platform;

    use crate::snapshot::SnapshotReader;

    const RECEIVE_TIMEOUT: Duration = Duration::from_secs(2);

    // The failing adapter keeps the poll task silent so tests drive notify_all by hand.
    fn create_quiet_registry() -> Arc<SubscriptionRegistry> {
        let reader = SnapshotReader::with_platform(
            Arc::new(FailingWindowAdapter::transient()),
            Platform::Linux,
        );
        SubscriptionRegistry::new(ActiveWindowWatcher::new(reader, Duration::from_millis(10)))
    }

    fn create_test_window(process_id: u32) -> WindowInfo {
        let mut window = WindowInfo::empty(Platform::Linux);
        window.process_id = process_id;
        window
    }

    fn noop() -> Callback {
        Arc::new(|_: WindowInfo| {})
    }

    fn channel_callback() -> (Callback, std_mpsc::Receiver<WindowInfo>) {
        let (sender, receiver) = std_mpsc::channel();
        let sender = Mutex::new(sender);
        let callback: Callback = Arc::new(move |window: WindowInfo| {
            sender.lock().unwrap().send(window).ok();
        });
        (callback, receiver)
    }

    fn current_generation(registry: &SubscriptionRegistry) -> u64 {
        registry.lock_state().generation
    }

    #[test]
    fn handles_are_distinct_and_increasing() {
        let registry = create_quiet_registry();

        let first = registry.subscribe(noop());
        let second = registry.subscribe(noop());
        registry.unsubscribe(first);
        let third = registry.subscribe(noop());

        assert!(first < second);
        assert!(second < third);
        assert_eq!(registry.subscriber_count(), 2);
    }

    #[test]
    fn first_subscriber_arms_and_last_disarms() {
        let registry = create_quiet_registry();
        assert!(!registry.is_polling());

        let first = registry.subscribe(noop());
        let second = registry.subscribe(noop());
        assert!(registry.is_polling());

        registry.unsubscribe(first);
        assert!(registry.is_polling());

        registry.unsubscribe(second);
        assert!(!registry.is_polling());
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let registry = create_quiet_registry();
        let kept = registry.subscribe(noop());
        let removed = registry.subscribe(noop());

        registry.unsubscribe(removed);
        registry.unsubscribe(removed);
        registry.unsubscribe(SubscriptionHandle::from(u64::MAX));

        assert_eq!(registry.subscriber_count(), 1);
        assert!(registry.is_polling());
        registry.unsubscribe(kept);
    }

    #[test]
    fn unsubscribe_all_clears_and_disarms() {
        let registry = create_quiet_registry();
        registry.subscribe(noop());
        registry.subscribe(noop());

        registry.unsubscribe_all();

        assert_eq!(registry.subscriber_count(), 0);
        assert!(!registry.is_polling());
    }

    #[test]
    fn rearming_starts_a_new_generation() {
        let registry = create_quiet_registry();

        let handle = registry.subscribe(noop());
        let first_generation = current_generation(&registry);
        registry.unsubscribe(handle);
        registry.subscribe(noop());

        assert_eq!(current_generation(&registry), first_generation + 1);
    }

    #[test]
    fn notify_all_delivers_to_every_subscriber() {
        let registry = create_quiet_registry();
        let (first_callback, first_receiver) = channel_callback();
        let (second_callback, second_receiver) = channel_callback();
        registry.subscribe(first_callback);
        registry.subscribe(second_callback);

        let delivered = registry.notify_all(current_generation(&registry), &create_test_window(5));

        assert_eq!(delivered, 2);
        assert_eq!(first_receiver.recv_timeout(RECEIVE_TIMEOUT).unwrap().process_id, 5);
        assert_eq!(second_receiver.recv_timeout(RECEIVE_TIMEOUT).unwrap().process_id, 5);
    }

    #[test]
    fn stale_generation_is_discarded() {
        let registry = create_quiet_registry();
        let (callback, receiver) = channel_callback();
        registry.subscribe(callback);

        let delivered =
            registry.notify_all(current_generation(&registry) + 1, &create_test_window(5));

        assert_eq!(delivered, 0);
        assert!(receiver.recv_timeout(Duration::from_millis(100)).is_err());
    }

    #[test]
    fn panicking_callback_does_not_block_others() {
        let registry = create_quiet_registry();
        registry.subscribe(Arc::new(|_: WindowInfo| panic!("subscriber failure")));
        let (callback, receiver) = channel_callback();
        registry.subscribe(callback);
        let generation = current_generation(&registry);

        registry.notify_all(generation, &create_test_window(1));
        registry.notify_all(generation, &create_test_window(2));

        assert_eq!(receiver.recv_timeout(RECEIVE_TIMEOUT).unwrap().process_id, 1);
        assert_eq!(receiver.recv_timeout(RECEIVE_TIMEOUT).unwrap().process_id, 2);
    }

    #[test]
    fn deliveries_keep_detection_order() {
        let registry = create_quiet_registry();
        let (callback, receiver) = channel_callback();
        registry.subscribe(callback);
        let generation = current_generation(&registry);

        for process_id in 1..=20 {
            registry.notify_all(generation, &create_test_window(process_id));
        }

        let received: Vec<u32> = (0..20)
            .map(|_| receiver.recv_timeout(RECEIVE_TIMEOUT).unwrap().process_id)
            .collect();
        assert_eq!(received, (1..=20).collect::<Vec<u32>>());
    }

    #[test]
    fn late_subscriber_receives_latest_window() {
        let registry = create_quiet_registry();
        registry.subscribe(noop());
        registry.notify_all(current_generation(&registry), &create_test_window(9));

        let (callback, receiver) = channel_callback();
        registry.subscribe(callback);

        assert_eq!(receiver.recv_timeout(RECEIVE_TIMEOUT).unwrap().process_id, 9);
    }

    #[test]
    fn latest_window_is_forgotten_when_disarmed() {
        let registry = create_quiet_registry();
        let handle = registry.subscribe(noop());
        registry.notify_all(current_generation(&registry), &create_test_window(9));
        registry.unsubscribe(handle);

        let (callback, receiver) = channel_callback();
        registry.subscribe(callback);

        assert!(receiver.recv_timeout(Duration::from_millis(100)).is_err());
    }
}
