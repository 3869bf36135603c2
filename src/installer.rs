// Installer module driving an upgrade the way the host's installer does

use crate::checker::ReleaseUpdateChecker;
use crate::constants::STAGING_DIR;
use crate::host::{HookExtra, InstallResult, UpdateDescriptor};
use anyhow::Context;
use log::{debug, info};
use reqwest::Client;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Unpack a zipball into `container`
pub fn extract_archive(bytes: &[u8], container: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(container)?;
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).context("Invalid zip archive")?;
    archive
        .extract(container)
        .with_context(|| format!("Failed to extract archive into {}", container.display()))?;
    Ok(())
}

/// Directory an extracted archive is unpacked into before it is moved into place
pub fn staging_dir(plugins_dir: &Path) -> PathBuf {
    plugins_dir.join(STAGING_DIR)
}

fn cleanup_staging(staging: &Path) -> anyhow::Result<()> {
    if staging.exists() {
        fs::remove_dir_all(staging)?;
    }
    Ok(())
}

/// Pick the package root inside an extracted archive: its only directory
/// when there is exactly one, otherwise the container itself
fn package_root(checker: &ReleaseUpdateChecker, container: &Path) -> anyhow::Result<PathBuf> {
    let files = checker.filesystem();
    let entries = files
        .list_dir(container)
        .with_context(|| format!("Failed to list {}", container.display()))?;
    match entries.as_slice() {
        [] => anyhow::bail!("Archive is empty"),
        [single] if files.is_dir(&container.join(single)) => Ok(container.join(single)),
        _ => Ok(container.to_path_buf()),
    }
}

/// Install an already-downloaded release archive for the checker's package.
///
/// Runs the two install hooks around the copy: source normalization after
/// extraction, and finalization which moves the files into the canonical
/// directory. The existing install is untouched until the archive has been
/// extracted and normalized.
pub fn install_archive(
    checker: &ReleaseUpdateChecker,
    bytes: &[u8],
) -> anyhow::Result<InstallResult> {
    let staging = staging_dir(&checker.host().plugins_dir);
    let extra = HookExtra::for_plugin(checker.config().package_identifier.clone());

    cleanup_staging(&staging)?;

    let result = (|| -> anyhow::Result<InstallResult> {
        extract_archive(bytes, &staging)?;

        let root = package_root(checker, &staging)?;
        debug!("Extracted source {}", root.display());

        let source = checker
            .normalize_extracted_source(&root, &staging, &extra)
            .map_err(|e| anyhow::anyhow!("{}: {}", e.code(), e))?;

        let installed = checker
            .finalize_install(&extra, InstallResult::at(source))
            .map_err(|e| anyhow::anyhow!("{}: {}", e.code(), e))?;
        info!("Placed package at {}", installed.destination.display());
        Ok(installed)
    })();

    cleanup_staging(&staging)?;
    result
}

/// Download the offered archive and install it
pub async fn install_update(
    checker: &ReleaseUpdateChecker,
    client: &Client,
    update: &UpdateDescriptor,
) -> anyhow::Result<InstallResult> {
    if update.package.is_empty() {
        anyhow::bail!("Release {} has no downloadable archive", update.new_version);
    }

    info!("Downloading {}", update.package);
    let bytes = crate::http::fetch_bytes(client, &update.package).await?;
    install_archive(checker, &bytes)
}
