// Init command for writing the default settings file

use crate::ui;
use fab_updater::config::{self, Settings};

pub fn init() -> anyhow::Result<()> {
    if Settings::load().is_ok() {
        ui::dim("Settings detected. Skipping initialization.");
        return Ok(());
    }

    Settings::default().save()?;
    ui::success(&format!("Initialized {}", config::settings_path().display()));
    Ok(())
}
