//! Asset and bundle identities
//!
//! Identities are plain value types keyed by logical name. Each has a
//! distinguished empty sentinel: an invalid asset, or the "null" bundle that
//! stands for a loose (built-in) resource.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of one loadable resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId(String);

impl AssetId {
    /// Create an identity from a logical asset name
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The invalid sentinel
    #[must_use]
    pub const fn invalid() -> Self {
        Self(String::new())
    }

    /// Logical name of the asset
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Check the identity before any lookup.
    ///
    /// Empty and whitespace-only names are rejected.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.0.trim().is_empty()
    }

    /// Name without extension, as used for loose resource loading.
    ///
    /// Everything from the first `.` on is dropped, so `fx/spark.prefab`
    /// becomes `fx/spark`.
    #[must_use]
    pub fn stem(&self) -> &str {
        self.0.split('.').next().unwrap_or_default()
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for AssetId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Identity of one archive.
///
/// Names are stored with `/` separators; a manifest written with `\` resolves
/// to the same identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BundleId(String);

impl BundleId {
    /// Create an identity from an archive name
    #[must_use]
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(normalize_bundle_name(name.as_ref()))
    }

    /// The null sentinel: no bundle, loose resource
    #[must_use]
    pub const fn null() -> Self {
        Self(String::new())
    }

    /// Archive name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Check if this is the null sentinel
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for BundleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BundleId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Normalize path separators in a bundle name
pub(crate) fn normalize_bundle_name(name: &str) -> String {
    name.trim().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_validity() {
        assert!(AssetId::new("hero.prefab").is_valid());
        assert!(!AssetId::invalid().is_valid());
        assert!(!AssetId::new("   ").is_valid());
    }

    #[test]
    fn test_asset_stem() {
        assert_eq!(AssetId::new("fx/spark.prefab").stem(), "fx/spark");
        assert_eq!(AssetId::new("music.ogg.meta").stem(), "music");
        assert_eq!(AssetId::new("plain").stem(), "plain");
    }

    #[test]
    fn test_bundle_separator_normalization() {
        assert_eq!(BundleId::new("chars\\hero"), BundleId::new("chars/hero"));
        assert_eq!(BundleId::new("chars\\hero").name(), "chars/hero");
    }

    #[test]
    fn test_null_bundle() {
        assert!(BundleId::null().is_null());
        assert!(!BundleId::new("shared").is_null());
    }
}
