// Constants module for shared string constants

pub const SETTINGS_FILE: &str = "fab-updater.toml";
pub const CACHE_DIR: &str = ".fab-cache";
pub const STAGING_DIR: &str = ".fab-upgrade";

/// Prefix of every cache key; the remainder is the md5 of the release API URL.
pub const CACHE_NAMESPACE: &str = "fab_github_update";

/// Seconds a cached release lookup (successful or not) stays valid.
pub const CACHE_TTL_SECS: u64 = 7200;

/// Upper bound for the release API request.
pub const HTTP_TIMEOUT_SECS: u64 = 15;

/// Version reported when the package header cannot be read.
pub const FALLBACK_VERSION: &str = "0.0.0";

pub const GITHUB_API_BASE: &str = "https://api.github.com";
pub const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// Bulk update-check endpoint of the default plugin directory.
pub const DIRECTORY_UPDATE_CHECK: &str = "api.wordpress.org/plugins/update-check/";

pub const HOST_PRODUCT: &str = "WordPress";
pub const MIN_HOST_VERSION: &str = "5.0";

pub const DEFAULT_OWNER: &str = "amitjha329";
pub const DEFAULT_REPO: &str = "floating-action-button";
pub const DEFAULT_PACKAGE_NAME: &str = "Floating Action Button";

pub const PACKAGE_INFO_ACTION: &str = "plugin_information";
