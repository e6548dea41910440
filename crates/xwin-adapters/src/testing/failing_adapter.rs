use xwin_core::{QueryError, RawWindowFacts, WindowQueryAdapter};

pub struct FailingWindowAdapter {
    error: QueryError,
}

impl FailingWindowAdapter {
    pub fn unsupported() -> Self {
        Self {
            error: QueryError::unsupported("test platform"),
        }
    }

    pub fn permission_denied() -> Self {
        Self {
            error: QueryError::PermissionDenied,
        }
    }

    pub fn transient() -> Self {
        Self {
            error: QueryError::transient("process exited mid-query"),
        }
    }

    pub fn with_error(error: QueryError) -> Self {
        Self { error }
    }
}

impl WindowQueryAdapter for FailingWindowAdapter {
    fn query_active_window(&self) -> Result<Option<RawWindowFacts>, QueryError> {
        Err(self.error.clone())
    }

    fn query_all_windows(&self) -> Result<Vec<RawWindowFacts>, QueryError> {
        Err(self.error.clone())
    }

    fn adapter_name(&self) -> &'static str {
        "failing"
    }
}
