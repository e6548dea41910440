mod failing_adapter;
mod stub_adapter;

pub use failing_adapter::FailingWindowAdapter;
pub use stub_adapter::{window_facts, StubWindowAdapter};
