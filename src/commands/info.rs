// Info command for printing the package details dialog contents

use crate::commands;
use crate::ui;
use fab_updater::constants::PACKAGE_INFO_ACTION;
use fab_updater::host::InfoQuery;

pub async fn info() -> anyhow::Result<()> {
    let ctx = commands::load()?;
    let query = InfoQuery {
        action: PACKAGE_INFO_ACTION.to_string(),
        slug: Some(ctx.checker.config().slug.clone()),
    };

    match ctx.checker.plugin_info(None, &query).await {
        Some(details) => ui::plain(&serde_json::to_string_pretty(&details)?),
        None => ui::warning("No release information available"),
    }
    Ok(())
}
