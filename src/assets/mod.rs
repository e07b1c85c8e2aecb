//! Asset and bundle lifecycle
//!
//! Provides the resource core of the runtime:
//! - Asset and bundle identities
//! - Reference-counted asset and bundle entities
//! - Deferred reclaim of unreferenced entities, swept once per tick
//! - Bundle dependency resolution from a manifest and lookup database
//! - Per-asset object pools for frequently spawned types
//! - An injected engine collaborator for every native primitive

mod engine;
mod error;
mod handle;
mod id;
pub mod memory;
mod metadata;
mod object;
mod pool;
mod reclaim;
mod registry;

pub use engine::Engine;
pub use error::ResourceError;
pub use handle::{AssetRef, BundleRef, CopyObject, Spawned};
pub use id::{AssetId, BundleId};
pub use metadata::{BundleDatabase, BundleManifest};
pub use object::{AssetObject, Bundle, RefCount, Serial};
pub use pool::AssetPool;
pub use reclaim::{ReclaimQueue, ReclaimState};
pub use registry::{AssetRegistry, TeardownReport};
