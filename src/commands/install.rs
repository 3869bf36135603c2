// Install command for downloading and placing the available update

use crate::commands;
use crate::ui;
use fab_updater::installer;

pub async fn install() -> anyhow::Result<()> {
    let ctx = commands::load()?;
    let checker = &ctx.checker;
    let config = checker.config();

    let state = checker.check_for_update(commands::primed_state(checker)).await;
    let Some(update) = state.response.get(&config.package_identifier) else {
        ui::success(&format!("{} {} is up to date", config.slug, config.current_version));
        return Ok(());
    };

    ui::action(&format!("Installing {} {}", config.slug, update.new_version));
    let pb = ui::spinner("Downloading release archive...");
    match installer::install_update(checker, ctx.source.client(), update).await {
        Ok(result) => {
            ui::finish_spinner_resolved(
                &pb,
                &format!("Installed {}", update.new_version),
                &result.destination.display().to_string(),
            );
            Ok(())
        }
        Err(e) => {
            ui::finish_spinner_error(&pb, "Install failed");
            Err(e)
        }
    }
}
