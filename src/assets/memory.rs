//! Headless in-memory engine
//!
//! A complete [`Engine`] that keeps archives, resources and spawned objects
//! in plain tables. It backs the demo binary and the registry tests, and
//! counts every primitive call so callers can verify that a cache hit really
//! skipped the engine.

use std::any::{Any, TypeId};
use std::path::{Path, PathBuf};

use glam::Vec3;
use rustc_hash::{FxHashMap, FxHashSet};

use super::engine::Engine;

/// Unique identifier of a spawned object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

impl ObjectId {
    /// Get the raw id value
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Archive handle returned by [`MemoryEngine`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryArchive {
    path: PathBuf,
}

impl MemoryArchive {
    /// Path the archive was loaded from
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Resource handle returned by [`MemoryEngine`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryResource {
    name: String,
}

impl MemoryResource {
    /// Name of the resource template
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Spawned object handle returned by [`MemoryEngine`]
#[derive(Debug, PartialEq, Eq)]
pub struct MemoryObject {
    id: ObjectId,
    resource: String,
}

impl MemoryObject {
    /// Unique id of the object
    #[must_use]
    pub const fn id(&self) -> ObjectId {
        self.id
    }

    /// Name of the resource the object was spawned from
    #[must_use]
    pub fn resource(&self) -> &str {
        &self.resource
    }
}

/// Counters for every primitive the registry invoked
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EngineCalls {
    pub archive_loads: u32,
    pub archive_unloads: u32,
    pub archive_asset_loads: u32,
    pub loose_loads: u32,
    pub resource_releases: u32,
    pub instantiations: u32,
    pub destroys: u32,
    pub activations: u32,
    pub deactivations: u32,
    pub initializations: u32,
    pub uninitializations: u32,
    pub unload_unused: u32,
}

impl EngineCalls {
    /// Total resource loads from either archives or loose files
    #[must_use]
    pub const fn resource_loads(&self) -> u32 {
        self.archive_asset_loads + self.loose_loads
    }
}

type ComponentFactory = Box<dyn Fn(ObjectId) -> Box<dyn Any>>;

/// State of one spawned object
#[derive(Debug)]
struct LiveObject {
    resource: String,
    active: bool,
    position: Option<Vec3>,
}

/// In-memory engine for headless runs and tests
#[derive(Default)]
pub struct MemoryEngine {
    /// Archive path -> names of the resources it contains
    archives: FxHashMap<PathBuf, Vec<String>>,
    /// Names loadable as loose resources
    loose: FxHashSet<String>,
    /// Resource name -> component factories by type
    components: FxHashMap<String, FxHashMap<TypeId, ComponentFactory>>,
    /// Component types recycled through pools
    pooled: FxHashSet<TypeId>,
    /// Objects spawned and not yet destroyed
    live: FxHashMap<ObjectId, LiveObject>,
    next_object: u64,
    calls: EngineCalls,
}

impl MemoryEngine {
    /// Create an empty engine
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an archive at `path` containing the named resources
    #[must_use]
    pub fn with_archive(mut self, path: impl Into<PathBuf>, resources: &[&str]) -> Self {
        self.archives.insert(
            path.into(),
            resources.iter().map(|name| (*name).to_string()).collect(),
        );
        self
    }

    /// Register a loose resource, by name without extension
    #[must_use]
    pub fn with_loose(mut self, name: impl Into<String>) -> Self {
        self.loose.insert(name.into());
        self
    }

    /// Attach a component of type `C` to every object spawned from `resource`
    #[must_use]
    pub fn with_component<C: 'static>(
        mut self,
        resource: impl Into<String>,
        factory: impl Fn(ObjectId) -> C + 'static,
    ) -> Self {
        self.components.entry(resource.into()).or_default().insert(
            TypeId::of::<C>(),
            Box::new(move |id| Box::new(factory(id)) as Box<dyn Any>),
        );
        self
    }

    /// Mark component type `C` as pool eligible
    #[must_use]
    pub fn with_pooled<C: 'static>(mut self) -> Self {
        self.pooled.insert(TypeId::of::<C>());
        self
    }

    /// Primitive call counters
    #[must_use]
    pub const fn calls(&self) -> &EngineCalls {
        &self.calls
    }

    /// Number of spawned objects not yet destroyed
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Check if an object is still alive
    #[must_use]
    pub fn is_live(&self, id: ObjectId) -> bool {
        self.live.contains_key(&id)
    }

    /// Check if an object is alive and enabled
    #[must_use]
    pub fn is_active(&self, id: ObjectId) -> bool {
        self.live.get(&id).is_some_and(|object| object.active)
    }

    /// Last placement given to an object
    #[must_use]
    pub fn position(&self, id: ObjectId) -> Option<Vec3> {
        self.live.get(&id).and_then(|object| object.position)
    }
}

impl Engine for MemoryEngine {
    type Archive = MemoryArchive;
    type Resource = MemoryResource;
    type Object = MemoryObject;

    fn load_archive_from_path(&mut self, path: &Path) -> Option<Self::Archive> {
        self.archives.contains_key(path).then(|| {
            self.calls.archive_loads += 1;
            MemoryArchive {
                path: path.to_path_buf(),
            }
        })
    }

    fn load_archive_asset(
        &mut self,
        archive: &Self::Archive,
        name: &str,
    ) -> Option<Self::Resource> {
        let contains = self
            .archives
            .get(&archive.path)
            .is_some_and(|names| names.iter().any(|entry| entry == name));

        contains.then(|| {
            self.calls.archive_asset_loads += 1;
            MemoryResource {
                name: name.to_string(),
            }
        })
    }

    fn unload_archive(&mut self, _archive: Self::Archive) {
        self.calls.archive_unloads += 1;
    }

    fn load_loose_resource(&mut self, name: &str) -> Option<Self::Resource> {
        self.loose.contains(name).then(|| {
            self.calls.loose_loads += 1;
            MemoryResource {
                name: name.to_string(),
            }
        })
    }

    fn release_resource(&mut self, _resource: Self::Resource) {
        self.calls.resource_releases += 1;
    }

    fn instantiate(&mut self, resource: &Self::Resource, placement: Option<Vec3>) -> Self::Object {
        self.calls.instantiations += 1;
        self.next_object += 1;

        let id = ObjectId(self.next_object);
        self.live.insert(
            id,
            LiveObject {
                resource: resource.name.clone(),
                active: true,
                position: placement,
            },
        );

        MemoryObject {
            id,
            resource: resource.name.clone(),
        }
    }

    fn destroy_immediate(&mut self, object: Self::Object) {
        if self.live.remove(&object.id).is_some() {
            self.calls.destroys += 1;
        } else {
            log::warn!("Destroy of unknown object {}", object.id.raw());
        }
    }

    fn find_component<C: 'static>(&self, object: &Self::Object) -> Option<C> {
        let live = self.live.get(&object.id)?;
        let factory = self
            .components
            .get(&live.resource)?
            .get(&TypeId::of::<C>())?;

        factory(object.id).downcast::<C>().ok().map(|component| *component)
    }

    fn is_pool_eligible<C: 'static>(&self) -> bool {
        self.pooled.contains(&TypeId::of::<C>())
    }

    fn activate_pooled(&mut self, object: &Self::Object, placement: Option<Vec3>) {
        self.calls.activations += 1;
        if let Some(live) = self.live.get_mut(&object.id) {
            live.active = true;
            if placement.is_some() {
                live.position = placement;
            }
        }
    }

    fn deactivate_pooled(&mut self, object: &Self::Object) {
        self.calls.deactivations += 1;
        if let Some(live) = self.live.get_mut(&object.id) {
            live.active = false;
        }
    }

    fn initialize(&mut self, _object: &Self::Object) {
        self.calls.initializations += 1;
    }

    fn uninitialize(&mut self, _object: &Self::Object) {
        self.calls.uninitializations += 1;
    }

    fn unload_unused_cached_resources(&mut self) {
        self.calls.unload_unused += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Marker(ObjectId);

    #[test]
    fn test_archive_contents() {
        let mut engine = MemoryEngine::new().with_archive("bundles/chars", &["hero.prefab"]);

        let archive = engine
            .load_archive_from_path(Path::new("bundles/chars"))
            .unwrap();
        assert!(engine.load_archive_asset(&archive, "hero.prefab").is_some());
        assert!(engine.load_archive_asset(&archive, "villain.prefab").is_none());
        assert!(engine.load_archive_from_path(Path::new("missing")).is_none());
        assert_eq!(engine.calls().archive_loads, 1);
        assert_eq!(engine.calls().archive_asset_loads, 1);
    }

    #[test]
    fn test_component_lookup() {
        let mut engine = MemoryEngine::new()
            .with_loose("crate")
            .with_component("crate", Marker);

        let resource = engine.load_loose_resource("crate").unwrap();
        let object = engine.instantiate(&resource, Some(Vec3::X));

        assert_eq!(engine.find_component::<Marker>(&object), Some(Marker(object.id())));
        assert_eq!(engine.find_component::<u32>(&object), None);
        assert_eq!(engine.position(object.id()), Some(Vec3::X));

        let id = object.id();
        engine.destroy_immediate(object);
        assert!(!engine.is_live(id));
        assert_eq!(engine.calls().destroys, 1);
    }

    #[test]
    fn test_pooled_activation() {
        let mut engine = MemoryEngine::new().with_loose("spark").with_pooled::<Marker>();
        assert!(engine.is_pool_eligible::<Marker>());
        assert!(!engine.is_pool_eligible::<u32>());

        let resource = engine.load_loose_resource("spark").unwrap();
        let object = engine.instantiate(&resource, None);
        engine.deactivate_pooled(&object);
        assert!(!engine.is_active(object.id()));

        engine.activate_pooled(&object, Some(Vec3::Y));
        assert!(engine.is_active(object.id()));
        assert_eq!(engine.position(object.id()), Some(Vec3::Y));
    }
}
