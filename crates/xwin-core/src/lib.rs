//! xwin core library
//!
//! Contains the window domain types, the platform adapter port and the normalization
//! from raw platform facts to [`WindowInfo`]. This crate has no knowledge of any
//! windowing system.

pub mod config;
pub mod domain;
pub mod normalizer;
pub mod ports;

pub use config::{Config, ConfigError, WatcherConfig, WindowsConfig};
pub use domain::{ChangeKey, Platform, ProcessInfo, UsageInfo, WindowInfo, WindowPosition};
pub use normalizer::normalize;
pub use ports::{QueryError, RawRect, RawWindowFacts, WindowQueryAdapter};
