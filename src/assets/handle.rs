//! Caller-facing reference handles
//!
//! Handles are scoped-ownership tokens. The registry creates them, adding one
//! reference to the target, and they are disposed by handing them back:
//!
//! ```ignore
//! let hero = registry.acquire_asset(&AssetId::new("hero.prefab"))?;
//! // ... use the asset ...
//! hero.destroy(&mut registry);
//! ```
//!
//! Handles are not `Clone`: every reference taken is released exactly once.
//! A handle dropped without being disposed keeps its reference until the
//! registry is cleared, where it shows up as a leak.
//!
//! Each handle remembers the load [`Serial`] of the entity it counted. A
//! handle that outlives its entity (across `clear` or a forced bundle unload)
//! is stale: releasing it is logged and leaves any reload untouched.

use super::engine::Engine;
use super::id::{AssetId, BundleId};
use super::object::Serial;
use super::registry::AssetRegistry;

/// One counted reference to a loaded asset
#[derive(Debug, PartialEq, Eq)]
#[must_use = "an asset reference must be released through the registry"]
pub struct AssetRef {
    id: AssetId,
    serial: Serial,
}

impl AssetRef {
    pub(crate) const fn new(id: AssetId, serial: Serial) -> Self {
        Self { id, serial }
    }

    /// Identity of the referenced asset
    #[must_use]
    pub const fn id(&self) -> &AssetId {
        &self.id
    }

    /// Release this reference
    pub fn destroy<E: Engine>(self, registry: &mut AssetRegistry<E>) {
        registry.release_asset(self);
    }

    /// Load serial of the referenced asset
    #[must_use]
    pub const fn serial(&self) -> Serial {
        self.serial
    }

    pub(crate) fn into_parts(self) -> (AssetId, Serial) {
        (self.id, self.serial)
    }
}

/// One counted reference to a loaded bundle
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a bundle reference must be released through the registry"]
pub struct BundleRef {
    id: BundleId,
    serial: Serial,
}

impl BundleRef {
    pub(crate) const fn new(id: BundleId, serial: Serial) -> Self {
        Self { id, serial }
    }

    /// Identity of the referenced bundle
    #[must_use]
    pub const fn id(&self) -> &BundleId {
        &self.id
    }

    /// Release this reference
    pub fn destroy<E: Engine>(self, registry: &mut AssetRegistry<E>) {
        registry.release_bundle(self);
    }

    /// Load serial of the referenced bundle
    #[must_use]
    pub const fn serial(&self) -> Serial {
        self.serial
    }

    pub(crate) fn into_parts(self) -> (BundleId, Serial) {
        (self.id, self.serial)
    }
}

/// One spawned copy of an asset, bound to its origin for ref-count
/// bookkeeping.
///
/// Releasing it does not touch the object synchronously: the copy is queued
/// and torn down (or returned to its pool) on the next registry update.
#[derive(Debug)]
#[must_use = "a spawned copy must be released through the registry"]
pub struct CopyObject<O> {
    asset: AssetId,
    serial: Serial,
    object: O,
}

impl<O> CopyObject<O> {
    pub(crate) const fn new(asset: AssetId, serial: Serial, object: O) -> Self {
        Self {
            asset,
            serial,
            object,
        }
    }

    /// Identity of the origin asset
    #[must_use]
    pub const fn asset(&self) -> &AssetId {
        &self.asset
    }

    /// The spawned object
    #[must_use]
    pub const fn object(&self) -> &O {
        &self.object
    }

    /// Queue this copy for release
    pub fn destroy<E: Engine<Object = O>>(self, registry: &mut AssetRegistry<E>) {
        registry.release_instance(self);
    }

    pub(crate) fn into_parts(self) -> (AssetId, Serial, O) {
        (self.asset, self.serial, self.object)
    }
}

/// Result of instantiating an asset: the located component and the copy
/// handle that keeps the origin asset alive.
#[derive(Debug)]
#[must_use]
pub struct Spawned<C, O> {
    /// Component located on the spawned object
    pub component: C,
    /// Handle binding the object to its origin asset
    pub copy: CopyObject<O>,
}
