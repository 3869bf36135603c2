// Commands module wiring settings into a checker

pub mod check;
pub mod clear_cache;
pub mod debug;
pub mod info;
pub mod init;
pub mod install;

use fab_updater::cache::FileCache;
use fab_updater::config::{self, Settings, UpdateCheckerConfig};
use fab_updater::filesystem::LocalFilesystem;
use fab_updater::host::{HostInfo, UpdateState};
use fab_updater::release::GitHubReleaseSource;
use fab_updater::ReleaseUpdateChecker;
use std::sync::Arc;

pub struct Context {
    pub checker: ReleaseUpdateChecker,
    pub source: Arc<GitHubReleaseSource>,
}

/// Load settings and build a checker backed by the persisted cache
pub fn load() -> anyhow::Result<Context> {
    let settings = Settings::load().map_err(|_| {
        anyhow::anyhow!("Settings not found. Run 'fab-updater init' first.")
    })?;

    let repo = &settings.repository;
    let mut checker_config = UpdateCheckerConfig::create(
        settings.resolve(&settings.package.file),
        &repo.owner,
        &repo.repo,
    );
    if let Some(api_base) = &repo.api_base {
        checker_config = checker_config.with_api_base(api_base, &repo.owner, &repo.repo);
    }

    let host = HostInfo {
        version: settings.host.version.clone(),
        url: settings.host.url.clone(),
        plugins_dir: settings.resolve(&settings.host.plugins_dir),
    };

    let source = Arc::new(GitHubReleaseSource::new(
        checker_config.release_api_url.clone(),
        &host.version,
        &host.url,
    )?);

    let checker = ReleaseUpdateChecker::new(
        checker_config,
        host,
        source.clone(),
        Arc::new(FileCache::new(config::cache_dir())),
        Arc::new(LocalFilesystem),
    );

    Ok(Context { checker, source })
}

/// Host update state as it looks right after the host's own version scan
pub fn primed_state(checker: &ReleaseUpdateChecker) -> UpdateState {
    let config = checker.config();
    let mut state = UpdateState::default();
    state.checked.insert(
        config.package_identifier.clone(),
        config.current_version.clone(),
    );
    state
}
