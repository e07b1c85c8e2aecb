//! Engine collaborator
//!
//! The lifecycle core never touches disk or native object graphs itself.
//! Every primitive that does is routed through an [`Engine`] implementation
//! injected into the registry.

use std::path::Path;

use glam::Vec3;

/// Engine primitives the resource lifecycle is built on.
///
/// Loads are synchronous from the registry's point of view. Hooks with a
/// default body are optional: an engine without pooling or per-object
/// initialization can ignore them.
pub trait Engine {
    /// Handle to a loaded archive
    type Archive;
    /// Handle to one loaded resource
    type Resource;
    /// Handle to one spawned object graph
    type Object;

    /// Load an archive from disk
    fn load_archive_from_path(&mut self, path: &Path) -> Option<Self::Archive>;

    /// Read one named resource out of a loaded archive
    fn load_archive_asset(&mut self, archive: &Self::Archive, name: &str)
    -> Option<Self::Resource>;

    /// Unload an archive and everything still loaded from it
    fn unload_archive(&mut self, archive: Self::Archive);

    /// Load a loose resource by its name without extension
    fn load_loose_resource(&mut self, name: &str) -> Option<Self::Resource>;

    /// Release a resource handle the registry no longer tracks
    fn release_resource(&mut self, resource: Self::Resource) {
        drop(resource);
    }

    /// Spawn a copy of a resource, optionally at a world position
    fn instantiate(&mut self, resource: &Self::Resource, placement: Option<Vec3>) -> Self::Object;

    /// Destroy a spawned object now
    fn destroy_immediate(&mut self, object: Self::Object);

    /// Locate a component of type `C` on a spawned object
    fn find_component<C: 'static>(&self, object: &Self::Object) -> Option<C>;

    /// Whether instances located as `C` are recycled through a pool
    fn is_pool_eligible<C: 'static>(&self) -> bool {
        false
    }

    /// Re-enable and reposition an object leaving a pool
    fn activate_pooled(&mut self, _object: &Self::Object, _placement: Option<Vec3>) {}

    /// Disable an object entering a pool
    fn deactivate_pooled(&mut self, _object: &Self::Object) {}

    /// Called when a copy is handed to a caller
    fn initialize(&mut self, _object: &Self::Object) {}

    /// Called before a released copy is pooled or destroyed
    fn uninitialize(&mut self, _object: &Self::Object) {}

    /// Drop cached loose resources nothing refers to anymore
    fn unload_unused_cached_resources(&mut self);
}
