use std::io;

use once_cell::sync::OnceCell;
use tokio::runtime::{Builder, Handle, Runtime};
use tracing::debug;

const SCHEDULER_THREAD_NAME: &str = "xwin-watcher";

/// Dedicated runtime running the watcher and subscriber deliveries, independent of
/// whatever runtime (if any) the caller uses.
///
/// Started on first use and kept until the owner is dropped. Emptying the
/// subscriber set only stops the poll task; the idle worker thread stays parked so
/// the next subscription does not pay for a new runtime.
pub struct Scheduler {
    runtime: OnceCell<Runtime>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            runtime: OnceCell::new(),
        }
    }

    pub fn handle(&self) -> io::Result<Handle> {
        self.runtime
            .get_or_try_init(|| {
                let runtime = Builder::new_multi_thread()
                    .worker_threads(1)
                    .thread_name(SCHEDULER_THREAD_NAME)
                    .enable_time()
                    .build()?;
                debug!("watcher scheduler started");
                Ok(runtime)
            })
            .map(|runtime| runtime.handle().clone())
    }

    #[cfg(test)]
    fn is_started(&self) -> bool {
        self.runtime.get().is_some()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        // Callbacks may still be running on the blocking pool; never wait for them.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}
