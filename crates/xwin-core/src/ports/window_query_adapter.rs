use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("window queries are not supported here: {reason}")]
    Unsupported { reason: String },

    #[error("access to window information was denied")]
    PermissionDenied,

    #[error("window query failed: {message}")]
    Transient { message: String },
}

impl QueryError {
    pub fn unsupported(reason: impl Into<String>) -> Self {
        Self::Unsupported {
            reason: reason.into(),
        }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient {
            message: message.into(),
        }
    }
}

/// Screen rectangle as reported by the platform, before any clamping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Whatever the platform was able to tell about one window. `None` means unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawWindowFacts {
    pub title: Option<String>,
    pub process_id: Option<u32>,
    pub exec_name: Option<String>,
    pub class_name: Option<String>,
    pub path: Option<String>,
    pub bounds: Option<RawRect>,
    pub memory_bytes: Option<u64>,
}

/// OS-specific source of raw window facts.
///
/// Calls may block on the windowing system; callers running inside an async runtime
/// are expected to move them off the executor.
pub trait WindowQueryAdapter: Send + Sync {
    /// Facts about the focused window, `Ok(None)` when nothing holds focus.
    fn query_active_window(&self) -> Result<Option<RawWindowFacts>, QueryError>;

    fn query_all_windows(&self) -> Result<Vec<RawWindowFacts>, QueryError>;

    fn adapter_name(&self) -> &'static str;
}
