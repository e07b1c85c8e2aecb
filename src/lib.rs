//! Resource lifecycle core for a game runtime
//!
//! This crate provides:
//! - Asset loading, individually or from archive bundles
//! - Shared ownership through reference counts
//! - Deferred, cancellable destruction to absorb load/unload churn
//! - Bundle dependency graphs with propagated counts
//! - Per-asset object pools for frequently spawned objects

pub mod assets;
pub mod core;

// Re-exports for convenience
pub use glam;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::assets::{
        AssetId, AssetRef, AssetRegistry, BundleDatabase, BundleId, BundleManifest, BundleRef,
        CopyObject, Engine, ResourceError, Spawned, TeardownReport,
    };
    pub use crate::core::{LifecycleStats, ResourceConfig, SweepReport};
    pub use glam::Vec3;
}
