use std::sync::Arc;

use tracing::{trace, warn};
use xwin_core::{normalize, Platform, QueryError, WindowInfo, WindowQueryAdapter};

use crate::WindowError;

/// Point-in-time reads of the desktop, one adapter call per read.
#[derive(Clone)]
pub struct SnapshotReader {
    adapter: Arc<dyn WindowQueryAdapter>,
    platform: Platform,
}

impl SnapshotReader {
    pub fn new(adapter: Arc<dyn WindowQueryAdapter>) -> Self {
        Self::with_platform(adapter, Platform::current())
    }

    pub fn with_platform(adapter: Arc<dyn WindowQueryAdapter>, platform: Platform) -> Self {
        Self { adapter, platform }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// The focused window. When nothing holds focus, or the query hiccups, the
    /// all-defaults record for the host platform is returned.
    pub fn active_window(&self) -> Result<WindowInfo, WindowError> {
        match self.read_active_window() {
            Ok(window) => Ok(window),
            Err(QueryError::Transient { message }) => {
                warn!(%message, "active window query failed, returning empty window");
                Ok(WindowInfo::empty(self.platform))
            }
            Err(QueryError::Unsupported { reason }) => {
                Err(WindowError::PlatformUnsupported { reason })
            }
            Err(QueryError::PermissionDenied) => Err(WindowError::PermissionDenied),
        }
    }

    pub fn open_windows(&self) -> Result<Vec<WindowInfo>, WindowError> {
        match self.adapter.query_all_windows() {
            Ok(windows) => {
                trace!(count = windows.len(), "open windows snapshot");
                Ok(windows
                    .into_iter()
                    .map(|facts| normalize(facts, self.platform))
                    .collect())
            }
            Err(QueryError::Transient { message }) => {
                warn!(%message, "open windows query failed, returning no windows");
                Ok(Vec::new())
            }
            Err(QueryError::Unsupported { reason }) => {
                Err(WindowError::PlatformUnsupported { reason })
            }
            Err(QueryError::PermissionDenied) => Err(WindowError::PermissionDenied),
        }
    }

    /// Like [`Self::active_window`] but keeps transient failures visible, so the
    /// watcher can skip a tick instead of reporting an empty window.
    pub(crate) fn read_active_window(&self) -> Result<WindowInfo, QueryError> {
        let facts = self.adapter.query_active_window()?;

        Ok(facts
            .map(|facts| normalize(facts, self.platform))
            .unwrap_or_else(|| WindowInfo::empty(self.platform)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xwin_adapters::{window_facts, FailingWindowAdapter, StubWindowAdapter};
    use xwin_core::RawWindowFacts;

    fn reader_for(adapter: impl WindowQueryAdapter + 'static) -> SnapshotReader {
        SnapshotReader::with_platform(Arc::new(adapter), Platform::Linux)
    }

    #[test]
    fn active_window_is_normalized() {
        let reader = reader_for(StubWindowAdapter::with_active(window_facts(321, "notes")));

        let window = reader.active_window().unwrap();

        assert_eq!(window.os, "linux");
        assert_eq!(window.process_id, 321);
        assert_eq!(window.info.process_id, 321);
        assert_eq!(window.title, "notes");
        assert_eq!(window.info.exec_name, "app");
    }

    #[test]
    fn active_window_queries_adapter_once() {
        let adapter = Arc::new(StubWindowAdapter::with_active(window_facts(1, "one")));
        let reader = SnapshotReader::new(adapter.clone());

        reader.active_window().unwrap();

        assert_eq!(adapter.active_query_count(), 1);
    }

    #[test]
    fn no_focused_window_gives_empty_record() {
        let reader = reader_for(StubWindowAdapter::new());

        let window = reader.active_window().unwrap();

        assert_eq!(window, WindowInfo::empty(Platform::Linux));
    }

    #[test]
    fn partial_facts_still_succeed() {
        let reader = reader_for(StubWindowAdapter::with_active(RawWindowFacts {
            process_id: Some(77),
            ..RawWindowFacts::default()
        }));

        let window = reader.active_window().unwrap();

        assert_eq!(window.process_id, 77);
        assert_eq!(window.title, "");
    }

    #[test]
    fn unsupported_platform_is_an_error() {
        let reader = reader_for(FailingWindowAdapter::unsupported());

        assert!(matches!(
            reader.active_window(),
            Err(WindowError::PlatformUnsupported { .. })
        ));
        assert!(matches!(
            reader.open_windows(),
            Err(WindowError::PlatformUnsupported { .. })
        ));
    }

    #[test]
    fn denied_permission_is_an_error() {
        let reader = reader_for(FailingWindowAdapter::permission_denied());

        assert_eq!(reader.active_window(), Err(WindowError::PermissionDenied));
    }

    #[test]
    fn transient_failure_degrades_to_defaults() {
        let reader = reader_for(FailingWindowAdapter::transient());

        assert_eq!(
            reader.active_window(),
            Ok(WindowInfo::empty(Platform::Linux))
        );
        assert_eq!(reader.open_windows(), Ok(Vec::new()));
        assert!(matches!(
            reader.read_active_window(),
            Err(QueryError::Transient { .. })
        ));
    }

    #[test]
    fn open_windows_keeps_adapter_order() {
        let reader = reader_for(StubWindowAdapter::with_windows(vec![
            window_facts(10, "first"),
            window_facts(20, "second"),
            window_facts(30, "third"),
        ]));

        let windows = reader.open_windows().unwrap();

        let titles: Vec<&str> = windows.iter().map(|window| window.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "second", "third"]);
        assert!(windows.iter().all(|window| window.os == "linux"));
    }

    #[test]
    fn no_open_windows_is_empty_not_error() {
        let reader = reader_for(StubWindowAdapter::new());

        assert_eq!(reader.open_windows(), Ok(Vec::new()));
    }
}
