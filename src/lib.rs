//! # fab-updater
//!
//! Self-hosted update channel for the Floating Action Button plugin: offers
//! GitHub releases through the host's plugin-update lifecycle instead of the
//! default plugin directory.
//!
//! [`ReleaseUpdateChecker`] is the entry point. Its collaborators are injected:
//! a [`release::ReleaseSource`] for the release API, a [`cache::CacheStore`]
//! for the TTL cache and a [`filesystem::PluginFilesystem`] for install moves.
//!
//! ```rust,no_run
//! use fab_updater::cache::FileCache;
//! use fab_updater::config::UpdateCheckerConfig;
//! use fab_updater::filesystem::LocalFilesystem;
//! use fab_updater::host::{HostInfo, UpdateState};
//! use fab_updater::release::GitHubReleaseSource;
//! use fab_updater::ReleaseUpdateChecker;
//! use std::sync::Arc;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = UpdateCheckerConfig::create(
//!     "plugins/floating-action-button/floating-action-button.php",
//!     "amitjha329",
//!     "floating-action-button",
//! );
//! let source = GitHubReleaseSource::new(
//!     config.release_api_url.clone(),
//!     "6.4.2",
//!     "https://example.com",
//! )?;
//! let host = HostInfo {
//!     version: "6.4.2".into(),
//!     url: "https://example.com".into(),
//!     plugins_dir: "plugins".into(),
//! };
//! let checker = ReleaseUpdateChecker::new(
//!     config,
//!     host,
//!     Arc::new(source),
//!     Arc::new(FileCache::new(".fab-cache")),
//!     Arc::new(LocalFilesystem),
//! );
//! let state = checker.check_for_update(UpdateState::default()).await;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod changelog;
pub mod checker;
pub mod config;
pub mod constants;
pub mod error;
pub mod filesystem;
pub mod host;
pub mod http;
pub mod installer;
pub mod manifest;
pub mod release;
pub mod version;

pub use checker::{DebugSnapshot, ReleaseUpdateChecker};
pub use error::{FetchError, InstallError};
