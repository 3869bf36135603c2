// Debug command for printing a diagnostic snapshot

use crate::commands;
use crate::ui;

pub async fn debug() -> anyhow::Result<()> {
    let ctx = commands::load()?;
    let snapshot = ctx.checker.debug_snapshot().await;
    ui::plain(&serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
