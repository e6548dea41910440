//! xwin adapters - Platform implementations
//!
//! This crate contains concrete implementations of the window query port defined in
//! xwin-core, plus scripted adapters for tests.

mod native;
#[cfg(target_os = "linux")]
mod procfs;
pub mod testing;
mod unsupported;
#[cfg(target_os = "linux")]
mod x11;

pub use native::native_adapter;
pub use testing::{window_facts, FailingWindowAdapter, StubWindowAdapter};
pub use unsupported::UnsupportedAdapter;
#[cfg(target_os = "linux")]
pub use x11::X11WindowAdapter;
