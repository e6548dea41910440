use xwin_core::{QueryError, RawWindowFacts, WindowQueryAdapter};

/// Adapter for hosts without a usable window query primitive.
pub struct UnsupportedAdapter {
    reason: String,
}

impl UnsupportedAdapter {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn for_current_platform() -> Self {
        Self::new(format!(
            "no window query adapter for {}",
            std::env::consts::OS
        ))
    }
}

impl WindowQueryAdapter for UnsupportedAdapter {
    fn query_active_window(&self) -> Result<Option<RawWindowFacts>, QueryError> {
        Err(QueryError::unsupported(self.reason.clone()))
    }

    fn query_all_windows(&self) -> Result<Vec<RawWindowFacts>, QueryError> {
        Err(QueryError::unsupported(self.reason.clone()))
    }

    fn adapter_name(&self) -> &'static str {
        "unsupported"
    }
}
