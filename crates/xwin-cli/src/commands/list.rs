use anyhow::Result;

use super::describe;

pub fn execute(json: bool) -> Result<()> {
    let windows = xwin::open_windows()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&windows)?);
        return Ok(());
    }

    if windows.is_empty() {
        println!("No open windows");
        return Ok(());
    }

    for window in &windows {
        println!("{}", describe(window));
    }
    println!();
    println!("{} window(s)", windows.len());

    Ok(())
}
