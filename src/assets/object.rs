//! Reference-counted resource entities
//!
//! [`AssetObject`] and [`Bundle`] are owned exclusively by the registry's maps.
//! Callers never hold them directly; they hold handles that move the counts.
//!
//! Every entity is stamped with a [`Serial`] when it is loaded. Handles and
//! links carry the serial of the entity they counted, so a reference taken
//! before an unload can't move the count of a later reload of the same name.

use smallvec::SmallVec;

use super::id::{AssetId, BundleId};

/// Non-negative reference count.
///
/// Decreasing past zero is a bookkeeping bug: it is logged and the count
/// stays at zero.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RefCount(u32);

impl RefCount {
    /// Current count
    #[must_use]
    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Check if nothing references the entity
    #[must_use]
    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Add one reference, returning the new count
    #[inline]
    pub fn increase(&mut self) -> u32 {
        self.0 += 1;
        self.0
    }

    /// Drop one reference, returning the new count
    pub fn decrease(&mut self, owner: &str) -> u32 {
        if self.0 == 0 {
            log::error!("Reference count underflow: {owner}");
        } else {
            self.0 -= 1;
        }
        self.0
    }
}

/// Load serial of an entity, unique for the lifetime of a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Serial(u64);

impl Serial {
    pub(crate) const FIRST: Self = Self(1);

    /// Raw serial value
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    pub(crate) const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Counted link to one load of a bundle
pub(crate) type BundleLink = (BundleId, Serial);

/// One loaded resource
#[derive(Debug)]
pub struct AssetObject<R> {
    id: AssetId,
    serial: Serial,
    /// Owning bundle, `None` for built-in (loose) resources
    bundle: Option<BundleLink>,
    resource: R,
    pub(crate) refs: RefCount,
}

impl<R> AssetObject<R> {
    pub(crate) fn new(id: AssetId, serial: Serial, bundle: Option<BundleLink>, resource: R) -> Self {
        Self {
            id,
            serial,
            bundle,
            resource,
            refs: RefCount::default(),
        }
    }

    /// Identity of the asset
    #[must_use]
    pub fn id(&self) -> &AssetId {
        &self.id
    }

    /// Load serial
    #[must_use]
    pub const fn serial(&self) -> Serial {
        self.serial
    }

    /// Owning bundle
    #[must_use]
    pub fn bundle(&self) -> Option<&BundleId> {
        self.bundle.as_ref().map(|(id, _)| id)
    }

    /// Check if the asset was loaded as a loose resource
    #[must_use]
    pub fn is_built_in(&self) -> bool {
        self.bundle.is_none()
    }

    /// Engine resource handle
    #[must_use]
    pub fn resource(&self) -> &R {
        &self.resource
    }

    /// Current reference count
    #[must_use]
    pub fn count(&self) -> u32 {
        self.refs.get()
    }

    pub(crate) fn into_parts(self) -> (AssetId, Option<BundleLink>, R) {
        (self.id, self.bundle, self.resource)
    }
}

/// One loaded archive
#[derive(Debug)]
pub struct Bundle<A> {
    id: BundleId,
    serial: Serial,
    archive: A,
    pub(crate) refs: RefCount,
    /// Direct dependencies, looked up in the registry on use
    dependencies: SmallVec<[BundleLink; 4]>,
}

impl<A> Bundle<A> {
    pub(crate) fn new(id: BundleId, serial: Serial, archive: A) -> Self {
        Self {
            id,
            serial,
            archive,
            refs: RefCount::default(),
            dependencies: SmallVec::new(),
        }
    }

    /// Identity of the bundle
    #[must_use]
    pub fn id(&self) -> &BundleId {
        &self.id
    }

    /// Load serial
    #[must_use]
    pub const fn serial(&self) -> Serial {
        self.serial
    }

    /// Engine archive handle
    #[must_use]
    pub fn archive(&self) -> &A {
        &self.archive
    }

    /// Current reference count
    #[must_use]
    pub fn count(&self) -> u32 {
        self.refs.get()
    }

    /// Direct dependencies
    pub fn dependencies(&self) -> impl Iterator<Item = &BundleId> {
        self.dependencies.iter().map(|(id, _)| id)
    }

    pub(crate) fn links(&self) -> &[BundleLink] {
        &self.dependencies
    }

    pub(crate) fn add_dependency(&mut self, dependency: BundleLink) {
        self.dependencies.push(dependency);
    }

    pub(crate) fn into_parts(self) -> (A, SmallVec<[BundleLink; 4]>) {
        (self.archive, self.dependencies)
    }
}
