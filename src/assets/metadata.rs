//! Bundle manifest and lookup database
//!
//! The manifest describes each bundle's direct dependencies. The database maps
//! asset names to their owning bundle and bundle names to archive paths. Both
//! are read once at startup; a registry only resolves assets through bundles
//! when both are present.

use std::fs;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::error::ResourceError;
use super::id::{BundleId, normalize_bundle_name};

/// Direct dependency graph of every bundle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleManifest {
    /// Bundle name -> names of the bundles it directly depends on
    #[serde(default)]
    pub bundles: FxHashMap<String, Vec<String>>,
}

impl BundleManifest {
    /// Create an empty manifest
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a bundle with its direct dependencies
    #[must_use]
    pub fn with_bundle(mut self, name: &str, dependencies: &[&str]) -> Self {
        self.bundles.insert(
            normalize_bundle_name(name),
            dependencies.iter().map(|dep| (*dep).to_string()).collect(),
        );
        self
    }

    /// Direct dependency names of a bundle (empty if unknown)
    #[must_use]
    pub fn direct_dependencies(&self, bundle: &str) -> &[String] {
        self.bundles
            .get(&normalize_bundle_name(bundle))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Load from a RON or JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ResourceError> {
        let mut manifest: Self = load_file(path.as_ref())?;
        manifest.bundles = manifest
            .bundles
            .into_iter()
            .map(|(name, deps)| (normalize_bundle_name(&name), deps))
            .collect();
        Ok(manifest)
    }
}

/// Asset name -> bundle and bundle name -> path lookup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleDatabase {
    /// Asset name -> owning bundle name
    #[serde(default)]
    pub assets: FxHashMap<String, String>,
    /// Bundle name -> archive path, relative to the bundle root
    #[serde(default)]
    pub bundles: FxHashMap<String, PathBuf>,
}

impl BundleDatabase {
    /// Create an empty database
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a bundle stored at `path`
    #[must_use]
    pub fn with_bundle(mut self, name: &str, path: impl Into<PathBuf>) -> Self {
        self.bundles.insert(normalize_bundle_name(name), path.into());
        self
    }

    /// Register an asset as a member of `bundle`
    #[must_use]
    pub fn with_asset(mut self, asset: &str, bundle: &str) -> Self {
        self.assets
            .insert(asset.to_string(), normalize_bundle_name(bundle));
        self
    }

    /// Bundle owning an asset, if the asset lives in one
    #[must_use]
    pub fn bundle_id_by_asset_name(&self, asset: &str) -> Option<BundleId> {
        self.assets
            .get(asset)
            .filter(|bundle| !bundle.is_empty())
            .map(BundleId::new)
    }

    /// Resolve a bundle name; `None` if the database doesn't know it
    #[must_use]
    pub fn bundle_id_by_bundle_name(&self, name: &str) -> Option<BundleId> {
        let name = normalize_bundle_name(name);
        self.bundles
            .contains_key(&name)
            .then(|| BundleId::new(name))
    }

    /// Archive path of a bundle relative to the bundle root.
    ///
    /// Bundles without an explicit path are stored under their own name.
    #[must_use]
    pub fn bundle_path(&self, bundle: &BundleId) -> PathBuf {
        self.bundles
            .get(bundle.name())
            .cloned()
            .unwrap_or_else(|| PathBuf::from(bundle.name()))
    }

    /// Load from a RON or JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ResourceError> {
        let mut database: Self = load_file(path.as_ref())?;
        database.bundles = database
            .bundles
            .into_iter()
            .map(|(name, path)| (normalize_bundle_name(&name), path))
            .collect();
        database.assets = database
            .assets
            .into_iter()
            .map(|(asset, bundle)| (asset, normalize_bundle_name(&bundle)))
            .collect();
        Ok(database)
    }
}

/// Read a metadata file, choosing the format by extension
fn load_file<T: DeserializeOwned>(path: &Path) -> Result<T, ResourceError> {
    let content = fs::read_to_string(path)
        .map_err(|e| ResourceError::Metadata(format!("{}: {e}", path.display())))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&content)
            .map_err(|e| ResourceError::Metadata(format!("{}: {e}", path.display())))
    } else {
        ron::from_str(&content)
            .map_err(|e| ResourceError::Metadata(format!("{}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_lookup_normalizes_separators() {
        let manifest = BundleManifest::new().with_bundle("chars\\hero", &["shared\\mats"]);

        assert_eq!(manifest.direct_dependencies("chars/hero"), ["shared\\mats"]);
        assert!(manifest.direct_dependencies("unknown").is_empty());
    }

    #[test]
    fn test_database_lookup() {
        let database = BundleDatabase::new()
            .with_bundle("chars", "chars.bundle")
            .with_asset("hero.prefab", "chars");

        assert_eq!(
            database.bundle_id_by_asset_name("hero.prefab"),
            Some(BundleId::new("chars"))
        );
        assert_eq!(database.bundle_id_by_asset_name("loose.png"), None);
        assert_eq!(database.bundle_id_by_bundle_name("nope"), None);
        assert_eq!(
            database.bundle_path(&BundleId::new("chars")),
            PathBuf::from("chars.bundle")
        );
        assert_eq!(
            database.bundle_path(&BundleId::new("other")),
            PathBuf::from("other")
        );
    }

    #[test]
    fn test_load_ron_and_json() {
        let dir = tempfile::tempdir().unwrap();

        let manifest_path = dir.path().join("manifest.ron");
        fs::write(
            &manifest_path,
            r#"(bundles: {"chars": ["shared"], "shared": []})"#,
        )
        .unwrap();

        let database_path = dir.path().join("database.json");
        fs::write(
            &database_path,
            r#"{"assets": {"hero.prefab": "chars"}, "bundles": {"chars": "chars.bundle", "shared": "shared.bundle"}}"#,
        )
        .unwrap();

        let manifest = BundleManifest::load(&manifest_path).unwrap();
        assert_eq!(manifest.direct_dependencies("chars"), ["shared"]);

        let database = BundleDatabase::load(&database_path).unwrap();
        assert_eq!(
            database.bundle_id_by_bundle_name("shared"),
            Some(BundleId::new("shared"))
        );
    }

    #[test]
    fn test_load_missing_file() {
        let result = BundleManifest::load("does/not/exist.ron");
        assert!(matches!(result, Err(ResourceError::Metadata(_))));
    }
}
