mod active;
mod list;
mod watch;

pub use active::execute as active;
pub use list::execute as list;
pub use watch::execute as watch;

use xwin::WindowInfo;

fn describe(window: &WindowInfo) -> String {
    let position = &window.position;
    let name = if window.info.name.is_empty() {
        "?"
    } else {
        window.info.name.as_str()
    };

    format!(
        "{} [{} pid {}] {}x{}+{}+{}",
        window.title,
        name,
        window.process_id,
        position.width,
        position.height,
        position.x,
        position.y
    )
}
