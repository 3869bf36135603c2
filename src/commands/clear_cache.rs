// Clear-cache command

use crate::commands;
use crate::ui;

pub fn clear_cache() -> anyhow::Result<()> {
    let ctx = commands::load()?;
    ctx.checker.clear_cache();
    ui::success("Update cache cleared");
    Ok(())
}
