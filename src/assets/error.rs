//! Errors raised by the resource lifecycle

use std::fmt;

use super::id::{AssetId, BundleId};

/// Errors that can occur while loading, instantiating or tearing down resources
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// Malformed or sentinel asset identity, rejected before any lookup
    InvalidIdentity,
    /// The engine returned no resource or archive for this name
    NotFound(String),
    /// A manifest dependency name has no matching bundle identity
    DependencyUnresolved {
        /// Bundle whose manifest entry names the dependency
        bundle: BundleId,
        /// The unresolved dependency name
        dependency: String,
    },
    /// The spawned object carries no component of the requested type
    TypeMismatch {
        /// Asset that was instantiated
        asset: AssetId,
        /// Name of the requested component type
        component: &'static str,
    },
    /// Non-zero reference count observed at forced teardown
    RefCountLeak {
        /// Asset or bundle name
        name: String,
        /// Count still outstanding
        count: u32,
    },
    /// A bundle identity that already has a live entry was loaded again
    AlreadyLoaded(BundleId),
    /// Pool operation requested for a type that is not pool eligible
    NotPoolEligible(AssetId),
    /// Manifest or database could not be read or parsed
    Metadata(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidIdentity => write!(f, "Invalid asset identity"),
            Self::NotFound(name) => write!(f, "Resource not found: {name}"),
            Self::DependencyUnresolved { bundle, dependency } => {
                write!(f, "Unresolved dependency '{dependency}' of bundle {bundle}")
            }
            Self::TypeMismatch { asset, component } => {
                write!(f, "Asset {asset} has no component of type {component}")
            }
            Self::RefCountLeak { name, count } => {
                write!(f, "Reference count leak: {name} [{count}]")
            }
            Self::AlreadyLoaded(bundle) => write!(f, "Bundle already loaded: {bundle}"),
            Self::NotPoolEligible(asset) => write!(f, "Asset {asset} is not pool eligible"),
            Self::Metadata(e) => write!(f, "Bundle metadata error: {e}"),
        }
    }
}

impl std::error::Error for ResourceError {}
