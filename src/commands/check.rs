// Check command for reporting an available update

use crate::commands;
use crate::ui;
use fab_updater::manifest::PackageHeader;

pub async fn check() -> anyhow::Result<i32> {
    let ctx = commands::load()?;
    let checker = &ctx.checker;
    let config = checker.config();

    let pb = ui::spinner(&format!("Checking {}...", config.slug));
    let state = checker.check_for_update(commands::primed_state(checker)).await;

    match state.response.get(&config.package_identifier) {
        Some(update) => {
            ui::finish_spinner_resolved(
                &pb,
                &format!("Update available: {}", config.slug),
                &format!("{} -> {}", config.current_version, update.new_version),
            );
            if !update.url.is_empty() {
                ui::dim(&format!("  {}", update.url));
            }
            let header = PackageHeader::load_or_default(&config.package_file);
            if let Some(notice) = checker.update_message(&header, update) {
                ui::dim(&format!("  {}", notice));
            }
            // Exit code 1 signals an update is available
            Ok(1)
        }
        None => {
            if checker.get_release_data().await.is_failure() {
                ui::finish_spinner_error(&pb, "Release lookup failed; see logs");
                ui::warning("Treating as no update until the cache expires");
            } else {
                ui::finish_spinner_success(
                    &pb,
                    &format!("{} {} is up to date", config.slug, config.current_version),
                );
            }
            Ok(0)
        }
    }
}
