use std::sync::Arc;

use tracing::{debug, warn};
use xwin_core::{WindowQueryAdapter, WindowsConfig};

use crate::UnsupportedAdapter;

/// Picks the window query adapter for the host, falling back to [`UnsupportedAdapter`]
/// when the windowing system cannot be reached.
#[cfg(target_os = "linux")]
pub fn native_adapter(config: &WindowsConfig) -> Arc<dyn WindowQueryAdapter> {
    match crate::X11WindowAdapter::connect(config.normal_only) {
        Ok(adapter) => {
            debug!("using X11 window adapter");
            Arc::new(adapter)
        }
        Err(error) => {
            warn!(%error, "X11 window queries not available");
            Arc::new(UnsupportedAdapter::new(error.to_string()))
        }
    }
}

#[cfg(not(target_os = "linux"))]
pub fn native_adapter(_config: &WindowsConfig) -> Arc<dyn WindowQueryAdapter> {
    warn!(os = std::env::consts::OS, "no native window adapter for this platform");
    Arc::new(UnsupportedAdapter::for_current_platform())
}
