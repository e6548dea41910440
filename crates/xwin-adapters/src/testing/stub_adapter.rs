use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use xwin_core::{QueryError, RawRect, RawWindowFacts, WindowQueryAdapter};

/// Adapter whose answers are scripted by the test and can be changed at any time.
pub struct StubWindowAdapter {
    active: Mutex<Result<Option<RawWindowFacts>, QueryError>>,
    windows: Mutex<Result<Vec<RawWindowFacts>, QueryError>>,
    active_queries: AtomicUsize,
}

impl StubWindowAdapter {
    pub fn new() -> Self {
        Self {
            active: Mutex::new(Ok(None)),
            windows: Mutex::new(Ok(Vec::new())),
            active_queries: AtomicUsize::new(0),
        }
    }

    pub fn with_active(facts: RawWindowFacts) -> Self {
        let adapter = Self::new();
        adapter.given_active(facts);
        adapter
    }

    pub fn with_windows(windows: Vec<RawWindowFacts>) -> Self {
        let adapter = Self::new();
        adapter.given_windows(windows);
        adapter
    }

    pub fn given_active(&self, facts: RawWindowFacts) {
        *self.active.lock().unwrap() = Ok(Some(facts));
    }

    pub fn given_no_active_window(&self) {
        *self.active.lock().unwrap() = Ok(None);
    }

    pub fn given_active_failure(&self, error: QueryError) {
        *self.active.lock().unwrap() = Err(error);
    }

    pub fn given_windows(&self, windows: Vec<RawWindowFacts>) {
        *self.windows.lock().unwrap() = Ok(windows);
    }

    pub fn given_windows_failure(&self, error: QueryError) {
        *self.windows.lock().unwrap() = Err(error);
    }

    pub fn active_query_count(&self) -> usize {
        self.active_queries.load(Ordering::SeqCst)
    }
}

impl Default for StubWindowAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowQueryAdapter for StubWindowAdapter {
    fn query_active_window(&self) -> Result<Option<RawWindowFacts>, QueryError> {
        self.active_queries.fetch_add(1, Ordering::SeqCst);
        self.active.lock().unwrap().clone()
    }

    fn query_all_windows(&self) -> Result<Vec<RawWindowFacts>, QueryError> {
        self.windows.lock().unwrap().clone()
    }

    fn adapter_name(&self) -> &'static str {
        "stub"
    }
}

/// Plausible facts for a window owned by `process_id`.
pub fn window_facts(process_id: u32, title: &str) -> RawWindowFacts {
    RawWindowFacts {
        title: Some(title.to_string()),
        process_id: Some(process_id),
        exec_name: Some("app".to_string()),
        class_name: Some("App".to_string()),
        path: Some("/usr/bin/app".to_string()),
        bounds: Some(RawRect {
            x: 0,
            y: 0,
            width: 1024,
            height: 768,
        }),
        memory_bytes: Some(64 * 1024 * 1024),
    }
}
