// Manifest module for reading the package's own declared header

use crate::constants::FALLBACK_VERSION;
use log::debug;
use serde::Serialize;
use std::path::Path;

/// Only the leading part of the main file is scanned for header fields
const HEADER_SCAN_BYTES: usize = 8 * 1024;

/// Metadata declared in the comment header of the package's main file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PackageHeader {
    pub name: Option<String>,
    pub version: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub uri: Option<String>,
}

impl PackageHeader {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let bytes = std::fs::read(path)?;
        let end = bytes.len().min(HEADER_SCAN_BYTES);
        let text = String::from_utf8_lossy(&bytes[..end]);
        Ok(Self::parse(&text))
    }

    /// Parse `Key: value` lines out of a comment block.
    ///
    /// Comment decoration (`*`, `#`, `//`) in front of the key is ignored and the
    /// first occurrence of a key wins.
    pub fn parse(text: &str) -> Self {
        let mut header = Self::default();

        for line in text.lines() {
            let line = line
                .trim_start()
                .trim_start_matches("/*")
                .trim_start_matches("//")
                .trim_start_matches(['*', '#'])
                .trim();

            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim().trim_end_matches("*/").trim();
            if value.is_empty() {
                continue;
            }

            let slot = match key.trim() {
                "Plugin Name" => &mut header.name,
                "Version" => &mut header.version,
                "Author" => &mut header.author,
                "Description" => &mut header.description,
                "Plugin URI" => &mut header.uri,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.to_string());
            }
        }

        header
    }

    /// Read the header, falling back to an empty one when the file is unreadable
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            debug!("Could not read package header {}: {}", path.display(), e);
            Self::default()
        })
    }

    pub fn version_or_fallback(&self) -> String {
        self.version
            .clone()
            .unwrap_or_else(|| FALLBACK_VERSION.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = r#"<?php
/**
 * Plugin Name: Floating Action Button
 * Plugin URI: https://example.com/floating-action-button
 * Description: A customizable floating action button.
 * Version: 1.1.0
 * Author: Your Name
 */

define('FAB_VERSION', '9.9.9');
"#;

    #[test]
    fn test_parse_header() {
        let header = PackageHeader::parse(HEADER);
        assert_eq!(header.name.as_deref(), Some("Floating Action Button"));
        assert_eq!(header.version.as_deref(), Some("1.1.0"));
        assert_eq!(header.author.as_deref(), Some("Your Name"));
        assert_eq!(
            header.uri.as_deref(),
            Some("https://example.com/floating-action-button")
        );
    }

    #[test]
    fn test_missing_file_falls_back() {
        let header = PackageHeader::load_or_default(Path::new("/nonexistent/plugin.php"));
        assert_eq!(header, PackageHeader::default());
        assert_eq!(header.version_or_fallback(), "0.0.0");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(HEADER.as_bytes()).unwrap();

        let header = PackageHeader::load(file.path()).unwrap();
        assert_eq!(header.version_or_fallback(), "1.1.0");
    }
}
