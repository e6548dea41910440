mod platform;
mod window_info;

pub use platform::Platform;
pub use window_info::{ChangeKey, ProcessInfo, UsageInfo, WindowInfo, WindowPosition};
