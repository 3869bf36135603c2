// Records exchanged with the host's plugin-update lifecycle

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Facts about the running host the checker reports back to it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostInfo {
    pub version: String,
    pub url: String,
    pub plugins_dir: PathBuf,
}

/// The host's update-state record for all installed packages.
///
/// `checked` maps package identifiers to installed versions; it is empty until
/// the host has run its own check. `response` holds update offers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateState {
    #[serde(default)]
    pub last_checked: Option<u64>,
    #[serde(default)]
    pub checked: BTreeMap<String, String>,
    #[serde(default)]
    pub response: BTreeMap<String, UpdateDescriptor>,
}

/// An update offer for one package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateDescriptor {
    pub slug: String,
    /// Package identifier (`slug/main-file.php`)
    pub plugin: String,
    pub new_version: String,
    /// Release page
    pub url: String,
    /// Archive download URL; empty when the release has none
    pub package: String,
    /// Host version the update is reported as tested with
    pub tested: String,
}

/// A "view details" request from the host
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InfoQuery {
    pub action: String,
    pub slug: Option<String>,
}

/// Package details shown in the host's details dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDetails {
    pub name: String,
    pub slug: String,
    pub version: String,
    pub author: String,
    pub homepage: String,
    pub requires: String,
    pub tested: String,
    pub downloaded: u64,
    pub last_updated: String,
    pub download_link: String,
    pub sections: BTreeMap<String, String>,
}

/// Extra context the host passes to install hooks
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HookExtra {
    /// Package identifier being upgraded, when the install is an upgrade
    pub plugin: Option<String>,
    pub action: Option<String>,
}

impl HookExtra {
    pub fn for_plugin(identifier: impl Into<String>) -> Self {
        Self {
            plugin: Some(identifier.into()),
            action: Some("update".to_string()),
        }
    }

    pub fn targets(&self, identifier: &str) -> bool {
        self.plugin.as_deref() == Some(identifier)
    }
}

/// What the installer reports after placing files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallResult {
    /// Final directory of the installed package
    pub destination: PathBuf,
    /// Directory name component of `destination`
    pub destination_name: String,
    /// Parent directory the package was installed into
    pub local_destination: PathBuf,
}

impl InstallResult {
    pub fn at(destination: PathBuf) -> Self {
        let destination_name = destination
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let local_destination = destination
            .parent()
            .map(PathBuf::from)
            .unwrap_or_default();
        Self {
            destination,
            destination_name,
            local_destination,
        }
    }
}

/// An outgoing HTTP request as seen by the host's request filter.
///
/// `body` holds form fields; the update-check endpoint carries a JSON document
/// under `plugins`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestArgs {
    pub method: String,
    pub body: BTreeMap<String, String>,
}
