// Config module for shared configuration utilities

use crate::constants;
use crate::manifest::PackageHeader;
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub fn config_dir() -> String {
    std::env::var("FAB_DIR").unwrap_or_else(|_| ".".to_string())
}

pub fn settings_path() -> PathBuf {
    Path::new(&config_dir()).join(constants::SETTINGS_FILE)
}

pub fn cache_dir() -> PathBuf {
    Path::new(&config_dir()).join(constants::CACHE_DIR)
}

/// Operator settings stored in `fab-updater.toml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub package: PackageSettings,
    pub repository: RepositorySettings,
    pub host: HostSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageSettings {
    /// Main file of the installed package, e.g.
    /// `plugins/floating-action-button/floating-action-button.php`
    pub file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySettings {
    pub owner: String,
    pub repo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostSettings {
    pub version: String,
    pub url: String,
    pub plugins_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        let plugins_dir = PathBuf::from("plugins");
        let slug = constants::DEFAULT_REPO;
        Self {
            package: PackageSettings {
                file: plugins_dir.join(slug).join(format!("{}.php", slug)),
            },
            repository: RepositorySettings {
                owner: constants::DEFAULT_OWNER.to_string(),
                repo: constants::DEFAULT_REPO.to_string(),
                api_base: None,
            },
            host: HostSettings {
                version: "6.4".to_string(),
                url: "http://localhost".to_string(),
                plugins_dir,
            },
        }
    }
}

impl Settings {
    pub fn load() -> anyhow::Result<Self> {
        let path = settings_path();
        let text = std::fs::read_to_string(&path)?;
        Ok(toml::from_str(&text)?)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let dir = config_dir();
        std::fs::create_dir_all(&dir)?;
        let text = toml::to_string_pretty(self)?;
        std::fs::write(settings_path(), text)?;
        Ok(())
    }

    /// Resolve a settings path against `FAB_DIR` unless it is already absolute
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            Path::new(&config_dir()).join(path)
        }
    }
}

/// Build the "latest release" endpoint for a repository
pub fn release_api_url(api_base: &str, owner: &str, repo: &str) -> String {
    format!(
        "{}/repos/{}/{}/releases/latest",
        api_base.trim_end_matches('/'),
        urlencoding::encode(owner),
        urlencoding::encode(repo)
    )
}

/// Cache key for a release endpoint: namespace plus the md5 of the URL
pub fn cache_key(api_url: &str) -> String {
    let digest = Md5::digest(api_url.as_bytes());
    format!("{}_{}", constants::CACHE_NAMESPACE, hex::encode(digest))
}

/// Immutable identity of the package whose updates are being checked
#[derive(Debug, Clone, Serialize)]
pub struct UpdateCheckerConfig {
    /// Main file of the installed package
    pub package_file: PathBuf,
    /// `slug/main-file.php`, the key the host uses for this package
    pub package_identifier: String,
    /// Directory name the package must live under
    pub slug: String,
    pub current_version: String,
    pub release_api_url: String,
    pub cache_key: String,
    #[serde(with = "duration_secs")]
    pub cache_ttl: Duration,
}

impl UpdateCheckerConfig {
    /// Derive the checker identity from the package's main file and its repository.
    ///
    /// Never fails: an unreadable header yields version "0.0.0".
    pub fn create(package_file: impl Into<PathBuf>, owner: &str, repo: &str) -> Self {
        let package_file = package_file.into();
        let current_version =
            PackageHeader::load_or_default(&package_file).version_or_fallback();

        let file_name = package_file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let slug = package_file
            .parent()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_name.trim_end_matches(".php").to_string());
        let package_identifier = format!("{}/{}", slug, file_name);

        let release_api_url = release_api_url(constants::GITHUB_API_BASE, owner, repo);
        let cache_key = cache_key(&release_api_url);

        Self {
            package_file,
            package_identifier,
            slug,
            current_version,
            release_api_url,
            cache_key,
            cache_ttl: Duration::from_secs(constants::CACHE_TTL_SECS),
        }
    }

    /// Point the checker at another API host (GitHub Enterprise, test servers)
    pub fn with_api_base(mut self, api_base: &str, owner: &str, repo: &str) -> Self {
        self.release_api_url = release_api_url(api_base, owner, repo);
        self.cache_key = cache_key(&self.release_api_url);
        self
    }
}

mod duration_secs {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }
}
