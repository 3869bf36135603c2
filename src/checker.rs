// Release update checker wired into the host's plugin-update lifecycle

use crate::cache::CacheStore;
use crate::changelog::format_changelog;
use crate::config::UpdateCheckerConfig;
use crate::constants::{
    DEFAULT_PACKAGE_NAME, DIRECTORY_UPDATE_CHECK, MIN_HOST_VERSION, PACKAGE_INFO_ACTION,
};
use crate::error::InstallError;
use crate::filesystem::PluginFilesystem;
use crate::host::{
    HookExtra, HostInfo, InfoQuery, InstallResult, PluginDetails, RequestArgs, UpdateDescriptor,
    UpdateState,
};
use crate::manifest::PackageHeader;
use crate::release::{CachedRelease, ReleaseData, ReleaseSource};
use crate::version::is_newer;
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const UPDATE_NOTICE: &str =
    "<br /><strong>Note:</strong> This update will be downloaded from GitHub.";

const INSTALLATION_SECTION: &str =
    "<p>Download and install like any other WordPress plugin.</p>";

/// Read-only view of the checker's state for troubleshooting
#[derive(Debug, Serialize)]
pub struct DebugSnapshot {
    pub config: UpdateCheckerConfig,
    pub api_url: String,
    pub cached: Option<CachedRelease>,
    /// Result of a fresh request made for the snapshot; never written to the cache
    pub live: CachedRelease,
    pub update_available: bool,
}

/// Offers GitHub releases of one package as updates through the host's hooks.
///
/// The host invokes the hooks in lifecycle order: [`check_for_update`],
/// optionally [`plugin_info`], then during an install
/// [`normalize_extracted_source`] and [`finalize_install`]. Every hook ignores
/// requests about other packages and returns their input untouched.
///
/// [`check_for_update`]: ReleaseUpdateChecker::check_for_update
/// [`plugin_info`]: ReleaseUpdateChecker::plugin_info
/// [`normalize_extracted_source`]: ReleaseUpdateChecker::normalize_extracted_source
/// [`finalize_install`]: ReleaseUpdateChecker::finalize_install
pub struct ReleaseUpdateChecker {
    config: UpdateCheckerConfig,
    host: HostInfo,
    source: Arc<dyn ReleaseSource>,
    cache: Arc<dyn CacheStore>,
    fs: Arc<dyn PluginFilesystem>,
}

impl ReleaseUpdateChecker {
    pub fn new(
        config: UpdateCheckerConfig,
        host: HostInfo,
        source: Arc<dyn ReleaseSource>,
        cache: Arc<dyn CacheStore>,
        fs: Arc<dyn PluginFilesystem>,
    ) -> Self {
        Self {
            config,
            host,
            source,
            cache,
            fs,
        }
    }

    pub fn config(&self) -> &UpdateCheckerConfig {
        &self.config
    }

    pub fn host(&self) -> &HostInfo {
        &self.host
    }

    pub fn filesystem(&self) -> &dyn PluginFilesystem {
        self.fs.as_ref()
    }

    /// Directory the package must end up in
    pub fn expected_dir(&self) -> PathBuf {
        self.host.plugins_dir.join(&self.config.slug)
    }

    /// Add an update offer for this package when a newer release exists.
    ///
    /// Returns the state unchanged when the host has not populated `checked`
    /// yet, when no release data is available, or when the release is not newer.
    pub async fn check_for_update(&self, mut state: UpdateState) -> UpdateState {
        if state.checked.is_empty() {
            return state;
        }

        let cached = self.get_release_data().await;
        if let Some(descriptor) = cached.release().and_then(|r| self.descriptor_for(r)) {
            info!(
                "Update available for {}: {} -> {}",
                self.config.package_identifier, self.config.current_version, descriptor.new_version
            );
            state
                .response
                .insert(self.config.package_identifier.clone(), descriptor);
        }

        state
    }

    fn descriptor_for(&self, release: &ReleaseData) -> Option<UpdateDescriptor> {
        let Some(new_version) = release.version() else {
            debug!("Release has no tag; nothing to compare");
            return None;
        };

        if !is_newer(new_version, &self.config.current_version) {
            debug!(
                "Installed {} is current (latest release {})",
                self.config.current_version, new_version
            );
            return None;
        }

        Some(UpdateDescriptor {
            slug: self.config.slug.clone(),
            plugin: self.config.package_identifier.clone(),
            new_version: new_version.to_string(),
            url: release.html_url.clone().unwrap_or_default(),
            package: release.zipball_url.clone().unwrap_or_default(),
            tested: self.host.version.clone(),
        })
    }

    /// Cached release lookup; on a miss, fetch and cache the outcome for one TTL.
    ///
    /// Failures are cached too, so an outage costs one request per window.
    pub async fn get_release_data(&self) -> CachedRelease {
        if let Some(cached) = self.cache.get(&self.config.cache_key) {
            debug!("Using cached release data ({})", self.config.cache_key);
            return cached;
        }

        let fetched = self.fetch_release().await;
        if let Err(e) = self
            .cache
            .set(&self.config.cache_key, &fetched, self.config.cache_ttl)
        {
            warn!("Could not cache release data: {}", e);
        }
        fetched
    }

    /// One request to the release source, bypassing the cache
    pub async fn fetch_release(&self) -> CachedRelease {
        CachedRelease::from(self.source.fetch_latest().await)
    }

    /// Details for the host's "view details" dialog.
    ///
    /// Only answers `plugin_information` queries for this package's slug; any
    /// other query, or a lookup without data, gets `result` back.
    pub async fn plugin_info(
        &self,
        result: Option<PluginDetails>,
        query: &InfoQuery,
    ) -> Option<PluginDetails> {
        if query.action != PACKAGE_INFO_ACTION {
            return result;
        }
        if query.slug.as_deref() != Some(self.config.slug.as_str()) {
            return result;
        }

        let cached = self.get_release_data().await;
        let Some(release) = cached.release() else {
            return result;
        };

        let header = PackageHeader::load_or_default(&self.config.package_file);

        let mut sections = BTreeMap::new();
        sections.insert(
            "description".to_string(),
            header.description.clone().unwrap_or_default(),
        );
        sections.insert("changelog".to_string(), format_changelog(release));
        if release.has_body() {
            sections.insert(
                "installation".to_string(),
                INSTALLATION_SECTION.to_string(),
            );
        }

        Some(PluginDetails {
            name: header
                .name
                .clone()
                .unwrap_or_else(|| DEFAULT_PACKAGE_NAME.to_string()),
            slug: self.config.slug.clone(),
            version: release.version().unwrap_or_default().to_string(),
            author: header.author.clone().unwrap_or_default(),
            homepage: release.html_url.clone().unwrap_or_default(),
            requires: MIN_HOST_VERSION.to_string(),
            tested: self.host.version.clone(),
            downloaded: 0,
            last_updated: release.published_at.clone().unwrap_or_default(),
            download_link: release.zipball_url.clone().unwrap_or_default(),
            sections,
        })
    }

    /// Rename the archive's top-level folder (`owner-repo-sha`) to the slug.
    ///
    /// Passes `source` through when the install is for another package, when
    /// `container` does not hold exactly one directory, or when that directory
    /// is already named after the slug.
    pub fn normalize_extracted_source(
        &self,
        source: &Path,
        container: &Path,
        extra: &HookExtra,
    ) -> Result<PathBuf, InstallError> {
        if !extra.targets(&self.config.package_identifier) {
            return Ok(source.to_path_buf());
        }

        let entries = match self.fs.list_dir(container) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Could not list {}: {}", container.display(), e);
                return Ok(source.to_path_buf());
            }
        };
        let [entry] = entries.as_slice() else {
            debug!(
                "{} holds {} entries; leaving source as-is",
                container.display(),
                entries.len()
            );
            return Ok(source.to_path_buf());
        };

        let from = container.join(entry);
        if *entry == self.config.slug || !self.fs.is_dir(&from) {
            return Ok(source.to_path_buf());
        }

        let to = container.join(&self.config.slug);
        self.fs
            .move_dir(&from, &to)
            .map_err(|e| InstallError::RenameFailed {
                from: from.clone(),
                to: to.clone(),
                source: e,
            })?;

        info!("Renamed {} to {}", from.display(), to.display());
        Ok(to)
    }

    /// Make sure the installed package sits in its canonical directory.
    ///
    /// When the installer placed it elsewhere, any stale canonical directory is
    /// removed and the result moved there. The cache entry is dropped whatever
    /// the outcome, so the next check sees the installed version.
    pub fn finalize_install(
        &self,
        extra: &HookExtra,
        result: InstallResult,
    ) -> Result<InstallResult, InstallError> {
        if !extra.targets(&self.config.package_identifier) {
            return Ok(result);
        }

        let outcome = self.relocate(result);
        self.clear_cache();
        outcome
    }

    fn relocate(&self, result: InstallResult) -> Result<InstallResult, InstallError> {
        let expected = self.expected_dir();
        if result.destination == expected {
            return Ok(result);
        }

        if self.fs.is_dir(&expected) {
            self.fs
                .delete_dir(&expected)
                .map_err(|e| InstallError::DeleteFailed {
                    path: expected.clone(),
                    source: e,
                })?;
        }

        self.fs
            .move_dir(&result.destination, &expected)
            .map_err(|e| InstallError::MoveFailed {
                from: result.destination.clone(),
                to: expected.clone(),
                source: e,
            })?;

        info!(
            "Moved installed package from {} to {}",
            result.destination.display(),
            expected.display()
        );
        Ok(InstallResult::at(expected))
    }

    /// Drop this package from bulk update checks sent to the default directory.
    ///
    /// A same-named package there would otherwise be offered as an update.
    pub fn suppress_competing_source(&self, mut args: RequestArgs, url: &str) -> RequestArgs {
        if !url.contains(DIRECTORY_UPDATE_CHECK) {
            return args;
        }
        let Some(raw) = args.body.get("plugins") else {
            return args;
        };

        let mut payload: serde_json::Value = match serde_json::from_str(raw) {
            Ok(payload) => payload,
            Err(e) => {
                debug!("Update-check payload is not JSON, leaving it alone: {}", e);
                return args;
            }
        };

        let identifier = self.config.package_identifier.as_str();
        let mut removed = false;

        if let Some(plugins) = payload.get_mut("plugins").and_then(|p| p.as_object_mut()) {
            removed |= plugins.remove(identifier).is_some();
        }
        if let Some(active) = payload.get_mut("active").and_then(|a| a.as_array_mut()) {
            let before = active.len();
            active.retain(|v| v.as_str() != Some(identifier));
            removed |= active.len() != before;
        }

        if removed {
            debug!("Removed {} from directory update check", identifier);
            args.body
                .insert("plugins".to_string(), payload.to_string());
        }
        args
    }

    /// Extra line under the host's "update available" row
    pub fn update_message(
        &self,
        _package: &PackageHeader,
        response: &UpdateDescriptor,
    ) -> Option<String> {
        if response.package.is_empty() {
            None
        } else {
            Some(UPDATE_NOTICE.to_string())
        }
    }

    /// Current config, cache contents, and a fresh lookup that is not cached
    pub async fn debug_snapshot(&self) -> DebugSnapshot {
        let cached = self.cache.get(&self.config.cache_key);
        let live = self.fetch_release().await;
        let update_available = live
            .release()
            .and_then(|r| self.descriptor_for(r))
            .is_some();

        DebugSnapshot {
            config: self.config.clone(),
            api_url: self.source.api_url().to_string(),
            cached,
            live,
            update_available,
        }
    }

    /// Forget the cached release so the next check hits the API
    pub fn clear_cache(&self) {
        if let Err(e) = self.cache.delete(&self.config.cache_key) {
            warn!("Could not clear update cache: {}", e);
        }
    }
}
