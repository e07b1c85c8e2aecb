//! Resource configuration
//!
//! Where bundles live on disk and what the metadata files are called.
//! Loadable from RON or JSON so a project can ship it next to its bundles.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Resource system configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    /// Directory containing the bundle archives and metadata
    pub bundle_root: PathBuf,
    /// File name of the dependency manifest, relative to `bundle_root`
    pub manifest_name: String,
    /// File name of the asset/bundle database, relative to `bundle_root`
    pub database_name: String,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            bundle_root: PathBuf::from("bundles"),
            manifest_name: String::from("manifest.ron"),
            database_name: String::from("database.ron"),
        }
    }
}

impl ResourceConfig {
    /// Set the bundle root directory
    pub fn with_bundle_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.bundle_root = root.into();
        self
    }

    /// Set the manifest file name
    pub fn with_manifest_name(mut self, name: impl Into<String>) -> Self {
        self.manifest_name = name.into();
        self
    }

    /// Set the database file name
    pub fn with_database_name(mut self, name: impl Into<String>) -> Self {
        self.database_name = name.into();
        self
    }

    /// Full path of the manifest file
    pub fn manifest_path(&self) -> PathBuf {
        self.bundle_root.join(&self.manifest_name)
    }

    /// Full path of the database file
    pub fn database_path(&self) -> PathBuf {
        self.bundle_root.join(&self.database_name)
    }

    /// Full path of a bundle archive given its path relative to the root
    pub fn bundle_path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.bundle_root.join(relative)
    }

    /// Load configuration from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        ron::from_str(&content).map_err(|e| ConfigError::DeserializeError(e.to_string()))
    }

    /// Load configuration from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| ConfigError::DeserializeError(e.to_string()))
    }
}

/// Errors that can occur while loading configuration
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// IO error
    IoError(String),
    /// Deserialization error
    DeserializeError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "IO error: {e}"),
            Self::DeserializeError(e) => write!(f, "Deserialization error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let config = ResourceConfig::default()
            .with_bundle_root("data/bundles")
            .with_manifest_name("deps.json");

        assert_eq!(config.manifest_path(), PathBuf::from("data/bundles/deps.json"));
        assert_eq!(
            config.database_path(),
            PathBuf::from("data/bundles/database.ron")
        );
        assert_eq!(
            config.bundle_path("chars.bundle"),
            PathBuf::from("data/bundles/chars.bundle")
        );
    }

    #[test]
    fn test_load_ron_partial() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resources.ron");
        fs::write(&path, r#"(bundle_root: "content")"#).unwrap();

        let config = ResourceConfig::load_ron(&path).unwrap();
        assert_eq!(config.bundle_root, PathBuf::from("content"));
        assert_eq!(config.manifest_name, "manifest.ron");
    }

    #[test]
    fn test_load_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resources.json");
        fs::write(&path, r#"{"database_name": "db.json"}"#).unwrap();

        let config = ResourceConfig::load_json(&path).unwrap();
        assert_eq!(config.database_name, "db.json");
        assert_eq!(config.bundle_root, PathBuf::from("bundles"));
    }

    #[test]
    fn test_load_missing() {
        assert!(matches!(
            ResourceConfig::load_ron("missing.ron"),
            Err(ConfigError::IoError(_))
        ));
    }
}
