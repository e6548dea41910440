use anyhow::Result;

use super::describe;

pub fn execute(json: bool) -> Result<()> {
    let window = xwin::active_window()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&window)?);
    } else if window.process_id == 0 && window.title.is_empty() {
        println!("No focused window");
    } else {
        println!("{}", describe(&window));
    }

    Ok(())
}
