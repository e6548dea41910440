use thiserror::Error;

/// Failures surfaced to direct callers of the snapshot operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WindowError {
    #[error("window queries are not supported on this platform: {reason}")]
    PlatformUnsupported { reason: String },

    #[error("permission to inspect windows was denied")]
    PermissionDenied,
}
