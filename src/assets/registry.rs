//! Asset and bundle registry
//!
//! The registry is the single owner of every loaded bundle, asset and pool.
//! It resolves whether an asset is loaded from a bundle or as a loose
//! resource, walks the bundle dependency graph, hands out counted handles and
//! runs the deferred reclaim sweep once per tick.
//!
//! # Tick model
//!
//! All operations run on one logical thread. An entity whose count reaches
//! zero is queued, and [`AssetRegistry::update`] destroys it only if it is
//! still unreferenced when the sweep runs. Re-acquiring it before then
//! cancels the pending reclaim, so release-then-reacquire within a tick never
//! reaches the engine.
//!
//! Handles carry the load serial of the entity they counted. Releasing a
//! handle whose entity has since been unloaded and reloaded is ignored.
//!
//! ```ignore
//! let mut registry = AssetRegistry::new(engine, ResourceConfig::default());
//! registry.load_bundle_metadata();
//!
//! let spark = registry.instantiate::<Emitter>(&AssetId::new("fx/spark.prefab"), None)?;
//! // ...
//! registry.release_instance(spark.copy);
//! registry.update();
//! ```

use std::any::type_name;
use std::path::PathBuf;

use glam::Vec3;
use rustc_hash::FxHashMap;

use crate::core::{LifecycleStats, ResourceConfig, SweepReport};

use super::engine::Engine;
use super::error::ResourceError;
use super::handle::{AssetRef, BundleRef, CopyObject, Spawned};
use super::id::{AssetId, BundleId};
use super::metadata::{BundleDatabase, BundleManifest};
use super::object::{AssetObject, Bundle, Serial};
use super::pool::AssetPool;
use super::reclaim::{ReclaimQueue, ReclaimState};

/// Manifest and database, present together or not at all
#[derive(Debug)]
struct BundleMetadata {
    manifest: BundleManifest,
    database: BundleDatabase,
}

/// Diagnostics collected by [`AssetRegistry::clear`]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TeardownReport {
    /// Assets still referenced at teardown
    pub asset_leaks: Vec<ResourceError>,
    /// Bundles still referenced from outside the bundle graph at teardown
    pub bundle_leaks: Vec<ResourceError>,
}

impl TeardownReport {
    /// Total leak diagnostics
    #[must_use]
    pub fn leak_count(&self) -> usize {
        self.asset_leaks.len() + self.bundle_leaks.len()
    }

    /// Check if every reference was released before teardown
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.leak_count() == 0
    }
}

/// Owner of every loaded bundle, asset and pool
pub struct AssetRegistry<E: Engine> {
    engine: E,
    config: ResourceConfig,
    /// `None` disables bundle resolution: every asset loads as a loose resource
    metadata: Option<BundleMetadata>,

    bundles: FxHashMap<BundleId, Bundle<E::Archive>>,
    assets: FxHashMap<AssetId, AssetObject<E::Resource>>,
    pools: FxHashMap<AssetId, AssetPool<E::Object>>,

    asset_reclaim: ReclaimQueue<AssetId>,
    bundle_reclaim: ReclaimQueue<BundleId>,
    /// Released copies, in release order
    copy_reclaim: Vec<CopyObject<E::Object>>,

    /// Serial handed to the next loaded entity; never reset
    next_serial: Serial,
    stats: LifecycleStats,
}

impl<E: Engine> AssetRegistry<E> {
    /// Create an empty registry driving `engine`
    pub fn new(engine: E, config: ResourceConfig) -> Self {
        Self {
            engine,
            config,
            metadata: None,
            bundles: FxHashMap::default(),
            assets: FxHashMap::default(),
            pools: FxHashMap::default(),
            asset_reclaim: ReclaimQueue::new(),
            bundle_reclaim: ReclaimQueue::new(),
            copy_reclaim: Vec::new(),
            next_serial: Serial::FIRST,
            stats: LifecycleStats::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Metadata
    // -------------------------------------------------------------------------

    /// Load the manifest and database from the configured bundle root.
    ///
    /// Bundle resolution is enabled only if both load; otherwise every asset
    /// is loaded as a loose resource. Returns whether bundle mode is on.
    pub fn load_bundle_metadata(&mut self) -> bool {
        let manifest = BundleManifest::load(self.config.manifest_path())
            .inspect_err(|e| log::error!("Not using bundles: {e}"))
            .ok();
        let database = BundleDatabase::load(self.config.database_path())
            .inspect_err(|e| log::warn!("Bundle database load failed: {e}"))
            .ok();

        self.metadata = manifest
            .zip(database)
            .map(|(manifest, database)| BundleMetadata { manifest, database });
        self.is_bundle_mode()
    }

    /// Install an already parsed manifest and database, enabling bundle mode
    pub fn set_bundle_metadata(&mut self, manifest: BundleManifest, database: BundleDatabase) {
        self.metadata = Some(BundleMetadata { manifest, database });
    }

    /// Whether assets are resolved through bundles
    #[must_use]
    pub fn is_bundle_mode(&self) -> bool {
        self.metadata.is_some()
    }

    // -------------------------------------------------------------------------
    // Assets
    // -------------------------------------------------------------------------

    /// Acquire a counted reference to an asset, loading it if needed.
    ///
    /// # Errors
    ///
    /// `InvalidIdentity` for a sentinel id, `NotFound` if the engine has no
    /// such resource or its bundle cannot be loaded.
    pub fn acquire_asset(&mut self, id: &AssetId) -> Result<AssetRef, ResourceError> {
        self.load_asset(id)?;
        let serial = self
            .increase_asset(id)
            .ok_or_else(|| ResourceError::NotFound(id.name().to_string()))?;
        Ok(AssetRef::new(id.clone(), serial))
    }

    /// Release one asset reference.
    ///
    /// Reaching zero queues the asset for the next sweep.
    pub fn release_asset(&mut self, handle: AssetRef) {
        let (id, serial) = handle.into_parts();
        self.decrease_asset(&id, serial);
    }

    /// Spawn a copy of an asset and locate its component of type `C`.
    ///
    /// Pool-eligible types are served from the asset's pool. The returned
    /// copy holds one reference on the asset until released.
    ///
    /// # Errors
    ///
    /// Load errors as [`Self::acquire_asset`]. `TypeMismatch` if the spawned
    /// object has no `C`: the object is destroyed at once and the asset's
    /// ownership is left as it was before the call.
    pub fn instantiate<C: 'static>(
        &mut self,
        id: &AssetId,
        placement: Option<Vec3>,
    ) -> Result<Spawned<C, E::Object>, ResourceError> {
        self.load_asset(id)?;
        let serial = self
            .assets
            .get(id)
            .map(AssetObject::serial)
            .ok_or_else(|| ResourceError::NotFound(id.name().to_string()))?;

        let pooled = self.engine.is_pool_eligible::<C>();
        let had_pool = self.pools.contains_key(id);
        let object = if pooled {
            self.pool_alloc(id, placement)?
        } else {
            self.spawn(id, placement)?
        };

        let Some(component) = self.engine.find_component::<C>(&object) else {
            let err = ResourceError::TypeMismatch {
                asset: id.clone(),
                component: type_name::<C>(),
            };
            log::error!("{err}");

            match self.pools.get_mut(id) {
                Some(pool) if pooled => pool.discard(&mut self.engine, object),
                _ => self.engine.destroy_immediate(object),
            }
            // A pool created by this call gives its backing reference back
            if pooled && !had_pool {
                if let Some(mut pool) = self.pools.remove(id) {
                    self.release_pool(&mut pool);
                }
            }
            self.defer_if_unreferenced(id);
            return Err(err);
        };

        self.increase_asset(id);
        self.engine.initialize(&object);

        Ok(Spawned {
            component,
            copy: CopyObject::new(id.clone(), serial, object),
        })
    }

    /// Queue a spawned copy for release on the next update
    pub fn release_instance(&mut self, copy: CopyObject<E::Object>) {
        self.copy_reclaim.push(copy);
    }

    // -------------------------------------------------------------------------
    // Bundles
    // -------------------------------------------------------------------------

    /// Load a bundle (and its dependencies) by database name without taking
    /// a reference on it.
    ///
    /// # Errors
    ///
    /// `NotFound` if the name is unknown or the archive fails to load.
    pub fn load_bundle_by_name(&mut self, name: &str) -> Result<(), ResourceError> {
        let Some(id) = self.resolve_bundle_name(name) else {
            log::error!("LoadBundle error. BundleName: {name}");
            return Err(ResourceError::NotFound(name.to_string()));
        };

        if self.bundles.contains_key(&id) {
            log::warn!("{}", ResourceError::AlreadyLoaded(id));
            return Ok(());
        }

        self.add_bundle(&id)
    }

    /// Acquire a counted reference to a bundle by database name
    ///
    /// # Errors
    ///
    /// `NotFound` if the name is unknown or the archive fails to load.
    pub fn acquire_bundle_by_name(&mut self, name: &str) -> Result<BundleRef, ResourceError> {
        let id = self
            .resolve_bundle_name(name)
            .ok_or_else(|| ResourceError::NotFound(name.to_string()))?;

        self.find_or_load_bundle(&id)?;
        let serial = self
            .increase_bundle(&id)
            .ok_or_else(|| ResourceError::NotFound(name.to_string()))?;
        Ok(BundleRef::new(id, serial))
    }

    /// Acquire a counted reference to the bundle an asset lives in.
    ///
    /// `None` outside bundle mode, for loose assets, or if the bundle fails
    /// to load.
    pub fn load_bundle_for_asset(&mut self, asset: &AssetId) -> Option<BundleRef> {
        let id = self
            .metadata
            .as_ref()?
            .database
            .bundle_id_by_asset_name(asset.name())?;

        if let Err(e) = self.find_or_load_bundle(&id) {
            log::error!("Bundle for {asset} failed to load: {e}");
            return None;
        }

        let serial = self.increase_bundle(&id)?;
        Some(BundleRef::new(id, serial))
    }

    /// Release one bundle reference.
    ///
    /// Reaching zero queues the bundle for the next sweep.
    pub fn release_bundle(&mut self, handle: BundleRef) {
        let (id, serial) = handle.into_parts();
        self.decrease_bundle(&id, serial);
    }

    /// Unload a bundle now.
    ///
    /// Unloading a bundle that is still referenced, or that assets still
    /// live in, is logged and proceeds anyway. Each dependency loses the
    /// reference this bundle held on it and is queued if that was the last.
    /// Returns `false` if the bundle was not loaded.
    pub fn unload_bundle(&mut self, id: &BundleId) -> bool {
        self.unload_bundle_inner(id, true)
    }

    /// Unload a bundle by database name, see [`Self::unload_bundle`]
    pub fn release_bundle_by_name(&mut self, name: &str) -> bool {
        match self.resolve_bundle_name(name) {
            Some(id) => self.unload_bundle(&id),
            None => {
                log::error!("UnloadBundle error. BundleName: {name}");
                false
            }
        }
    }

    // -------------------------------------------------------------------------
    // Pools
    // -------------------------------------------------------------------------

    /// Pre-build `count` free instances in an asset's pool.
    ///
    /// # Errors
    ///
    /// `NotPoolEligible` if `C` is not recycled through pools, or the load
    /// errors of [`Self::acquire_asset`].
    pub fn preload_pool_count<C: 'static>(
        &mut self,
        id: &AssetId,
        count: usize,
    ) -> Result<(), ResourceError> {
        if !self.engine.is_pool_eligible::<C>() {
            let err = ResourceError::NotPoolEligible(id.clone());
            log::error!("PreloadPoolCount error. {err}");
            return Err(err);
        }

        if let Err(e) = self.ensure_pool(id) {
            log::error!("PreloadPoolCount load error. {id}: {e}");
            return Err(e);
        }

        if let (Some(pool), Some(asset)) = (self.pools.get_mut(id), self.assets.get(id)) {
            pool.add_size(&mut self.engine, asset.resource(), count);
        }
        Ok(())
    }

    /// Release every pool whose asset name starts with `prefix`, except the
    /// assets in `keep`. Returns the number of pools released.
    pub fn release_unused_pools(&mut self, prefix: &str, keep: &[AssetId]) -> usize {
        let unused: Vec<AssetId> = self
            .pools
            .keys()
            .filter(|id| id.name().starts_with(prefix) && !keep.contains(id))
            .cloned()
            .collect();

        for id in &unused {
            log::warn!("Releasing unused pool {id}");
            if let Some(mut pool) = self.pools.remove(id) {
                self.release_pool(&mut pool);
            }
        }

        unused.len()
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Run one tick of deferred reclaim.
    ///
    /// Only candidates queued before this call are considered; anything the
    /// sweep itself queues waits for the next tick.
    pub fn update(&mut self) -> SweepReport {
        let assets = self.asset_reclaim.take();
        let bundles = self.bundle_reclaim.take();
        let copies = std::mem::take(&mut self.copy_reclaim);

        let mut report = SweepReport::default();

        for id in &assets {
            if self.reclaim_asset(id) {
                report.assets_reclaimed += 1;
            }
        }

        for id in &bundles {
            if self.reclaim_bundle(id) {
                report.bundles_unloaded += 1;
            }
        }

        for copy in copies {
            if self.reclaim_copy(copy) {
                report.copies_pooled += 1;
            } else {
                report.copies_destroyed += 1;
            }
        }

        self.stats.record_sweep(&report);
        report
    }

    /// Tear everything down.
    ///
    /// Pools are drained, pending reclaims run, and every asset and bundle is
    /// destroyed regardless of its count. Entities still referenced at that
    /// point are logged as leaks and listed in the returned report.
    pub fn clear(&mut self) -> TeardownReport {
        let mut report = TeardownReport::default();

        for copy in std::mem::take(&mut self.copy_reclaim) {
            self.reclaim_copy(copy);
        }

        let pools: Vec<_> = self.pools.drain().map(|(_, pool)| pool).collect();
        for mut pool in pools {
            self.release_pool(&mut pool);
        }

        for id in self.asset_reclaim.take() {
            self.reclaim_asset(&id);
        }

        let mut asset_ids: Vec<AssetId> = self.assets.keys().cloned().collect();
        asset_ids.sort();

        for id in asset_ids {
            let Some(asset) = self.assets.remove(&id) else {
                continue;
            };

            if !asset.refs.is_zero() {
                let bundle = asset.bundle().map(BundleId::name).unwrap_or_default();
                log::error!(
                    "Clear: asset reference count error. Name: {id}[{}], Bundle: {bundle}",
                    asset.count()
                );
                report.asset_leaks.push(ResourceError::RefCountLeak {
                    name: id.name().to_string(),
                    count: asset.count(),
                });
            }

            self.destroy_asset(asset);
        }
        self.engine.unload_unused_cached_resources();

        while !self.bundle_reclaim.is_empty() {
            for id in self.bundle_reclaim.take() {
                self.reclaim_bundle(&id);
            }
        }

        let mut dependents: FxHashMap<&BundleId, u32> = FxHashMap::default();
        for bundle in self.bundles.values() {
            for (dependency, serial) in bundle.links() {
                let linked = self
                    .bundles
                    .get(dependency)
                    .is_some_and(|target| target.serial() == *serial);
                if linked {
                    *dependents.entry(dependency).or_default() += 1;
                }
            }
        }

        let mut bundle_ids: Vec<BundleId> = self.bundles.keys().cloned().collect();
        bundle_ids.sort();

        for id in &bundle_ids {
            let Some(bundle) = self.bundles.get(id) else {
                continue;
            };

            let external = bundle
                .count()
                .saturating_sub(dependents.get(id).copied().unwrap_or(0));
            if external > 0 {
                log::error!(
                    "Clear: bundle unload error. {id}. Count: {}",
                    bundle.count()
                );
                report.bundle_leaks.push(ResourceError::RefCountLeak {
                    name: id.name().to_string(),
                    count: external,
                });
            }
        }
        drop(dependents);

        for id in &bundle_ids {
            self.unload_bundle_inner(id, false);
        }

        self.assets.clear();
        self.bundles.clear();
        self.asset_reclaim.clear();
        self.bundle_reclaim.clear();
        self.copy_reclaim.clear();

        report
    }

    /// Scene transition: the world owning these assets is torn down
    pub fn on_scene_changing(&mut self) -> TeardownReport {
        log::info!("Scene changing, clearing resources");
        self.clear()
    }

    // -------------------------------------------------------------------------
    // Introspection
    // -------------------------------------------------------------------------

    /// The engine collaborator
    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The engine collaborator, mutably
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &ResourceConfig {
        &self.config
    }

    /// Lifecycle totals
    #[must_use]
    pub fn stats(&self) -> &LifecycleStats {
        &self.stats
    }

    /// Loaded asset entity
    #[must_use]
    pub fn asset(&self, id: &AssetId) -> Option<&AssetObject<E::Resource>> {
        self.assets.get(id)
    }

    /// Loaded bundle entity
    #[must_use]
    pub fn bundle(&self, id: &BundleId) -> Option<&Bundle<E::Archive>> {
        self.bundles.get(id)
    }

    /// Pool of an asset
    #[must_use]
    pub fn pool(&self, id: &AssetId) -> Option<&AssetPool<E::Object>> {
        self.pools.get(id)
    }

    /// Reference count of a loaded asset
    #[must_use]
    pub fn asset_ref_count(&self, id: &AssetId) -> Option<u32> {
        self.assets.get(id).map(AssetObject::count)
    }

    /// Reference count of a loaded bundle
    #[must_use]
    pub fn bundle_ref_count(&self, id: &BundleId) -> Option<u32> {
        self.bundles.get(id).map(Bundle::count)
    }

    /// Reclaim state of an asset
    #[must_use]
    pub fn asset_state(&self, id: &AssetId) -> ReclaimState {
        self.asset_reclaim.state(id)
    }

    /// Reclaim state of a bundle
    #[must_use]
    pub fn bundle_state(&self, id: &BundleId) -> ReclaimState {
        self.bundle_reclaim.state(id)
    }

    /// Copies waiting for the next update
    #[must_use]
    pub fn pending_copies(&self) -> usize {
        self.copy_reclaim.len()
    }

    /// Number of loaded assets
    #[must_use]
    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    /// Number of loaded bundles
    #[must_use]
    pub fn bundle_count(&self) -> usize {
        self.bundles.len()
    }

    /// Number of live pools
    #[must_use]
    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    // -------------------------------------------------------------------------
    // Loading
    // -------------------------------------------------------------------------

    /// Make sure an asset entry exists, without touching its count
    fn load_asset(&mut self, id: &AssetId) -> Result<(), ResourceError> {
        if !id.is_valid() {
            return Err(ResourceError::InvalidIdentity);
        }

        if self.assets.contains_key(id) {
            if self.asset_reclaim.remove(id) {
                self.stats.reclaims_cancelled += 1;
            }
            return Ok(());
        }

        let bundle = self
            .metadata
            .as_ref()
            .and_then(|metadata| metadata.database.bundle_id_by_asset_name(id.name()));

        match bundle {
            Some(bundle) => self.load_bundle_resource(id, bundle),
            None => self.load_loose_resource(id),
        }
    }

    fn load_bundle_resource(&mut self, id: &AssetId, bundle_id: BundleId) -> Result<(), ResourceError> {
        self.find_or_load_bundle(&bundle_id)?;

        let Some(bundle) = self.bundles.get(&bundle_id) else {
            return Err(ResourceError::NotFound(bundle_id.name().to_string()));
        };
        let link = (bundle_id.clone(), bundle.serial());

        let Some(resource) = self.engine.load_archive_asset(bundle.archive(), id.name()) else {
            log::error!("Load fail bundle resource. {id} in {bundle_id}");
            self.defer_bundle_if_unreferenced(&bundle_id);
            return Err(ResourceError::NotFound(id.name().to_string()));
        };

        let serial = self.issue_serial();
        self.assets.insert(
            id.clone(),
            AssetObject::new(id.clone(), serial, Some(link), resource),
        );
        self.increase_bundle(&bundle_id);
        Ok(())
    }

    fn load_loose_resource(&mut self, id: &AssetId) -> Result<(), ResourceError> {
        let Some(resource) = self.engine.load_loose_resource(id.stem()) else {
            log::error!("Load fail resource. {id}");
            return Err(ResourceError::NotFound(id.name().to_string()));
        };

        let serial = self.issue_serial();
        self.assets
            .insert(id.clone(), AssetObject::new(id.clone(), serial, None, resource));
        Ok(())
    }

    fn spawn(&mut self, id: &AssetId, placement: Option<Vec3>) -> Result<E::Object, ResourceError> {
        let asset = self
            .assets
            .get(id)
            .ok_or_else(|| ResourceError::NotFound(id.name().to_string()))?;
        Ok(self.engine.instantiate(asset.resource(), placement))
    }

    fn resolve_bundle_name(&self, name: &str) -> Option<BundleId> {
        self.metadata
            .as_ref()?
            .database
            .bundle_id_by_bundle_name(name)
    }

    fn find_or_load_bundle(&mut self, id: &BundleId) -> Result<(), ResourceError> {
        if self.bundles.contains_key(id) {
            return Ok(());
        }
        self.add_bundle(id)
    }

    /// Load an archive, register it, then load its direct dependencies
    fn add_bundle(&mut self, id: &BundleId) -> Result<(), ResourceError> {
        if id.is_null() {
            return Err(ResourceError::InvalidIdentity);
        }

        if self.bundles.contains_key(id) {
            log::error!("{}", ResourceError::AlreadyLoaded(id.clone()));
            return Ok(());
        }

        let relative = self
            .metadata
            .as_ref()
            .map_or_else(|| PathBuf::from(id.name()), |m| m.database.bundle_path(id));
        let path = self.config.bundle_path(relative);

        let Some(archive) = self.engine.load_archive_from_path(&path) else {
            log::error!("Archive load failed: {}", path.display());
            return Err(ResourceError::NotFound(path.display().to_string()));
        };

        log::debug!("Bundle loaded: {id}");
        let serial = self.issue_serial();
        self.bundles
            .insert(id.clone(), Bundle::new(id.clone(), serial, archive));
        self.load_dependencies(id);
        Ok(())
    }

    fn load_dependencies(&mut self, id: &BundleId) {
        let names: Vec<String> = self
            .metadata
            .as_ref()
            .map(|metadata| metadata.manifest.direct_dependencies(id.name()).to_vec())
            .unwrap_or_default();

        for name in names {
            let Some(dependency) = self.resolve_bundle_name(&name) else {
                let err = ResourceError::DependencyUnresolved {
                    bundle: id.clone(),
                    dependency: name,
                };
                log::error!("{err}");
                continue;
            };

            if dependency == *id {
                log::warn!("Bundle {id} lists itself as a dependency");
                continue;
            }

            if let Err(e) = self.find_or_load_bundle(&dependency) {
                log::error!("Dependency {dependency} of {id} failed to load: {e}");
                continue;
            }

            log::debug!("Dependency loaded: {id} -> {dependency}");
            let Some(serial) = self.increase_bundle(&dependency) else {
                continue;
            };
            if let Some(bundle) = self.bundles.get_mut(id) {
                bundle.add_dependency((dependency, serial));
            }
        }
    }

    fn ensure_pool(&mut self, id: &AssetId) -> Result<(), ResourceError> {
        if self.pools.contains_key(id) {
            return self.load_asset(id);
        }

        let backing = self.acquire_asset(id)?;
        self.pools.insert(id.clone(), AssetPool::new(backing));
        Ok(())
    }

    fn pool_alloc(&mut self, id: &AssetId, placement: Option<Vec3>) -> Result<E::Object, ResourceError> {
        self.ensure_pool(id)?;

        let (Some(pool), Some(asset)) = (self.pools.get_mut(id), self.assets.get(id)) else {
            return Err(ResourceError::NotFound(id.name().to_string()));
        };

        if pool.free_count() > 0 {
            self.stats.pool_hits += 1;
        } else {
            self.stats.pool_misses += 1;
        }

        Ok(pool.alloc(&mut self.engine, asset.resource(), placement))
    }

    // -------------------------------------------------------------------------
    // Counting
    // -------------------------------------------------------------------------

    fn issue_serial(&mut self) -> Serial {
        let serial = self.next_serial;
        self.next_serial = serial.next();
        serial
    }

    fn increase_asset(&mut self, id: &AssetId) -> Option<Serial> {
        let asset = self.assets.get_mut(id)?;
        asset.refs.increase();
        Some(asset.serial())
    }

    fn decrease_asset(&mut self, id: &AssetId, serial: Serial) {
        match self.assets.get_mut(id) {
            Some(asset) if asset.serial() == serial => {
                if asset.refs.decrease(id.name()) == 0 {
                    self.asset_reclaim.push(id.clone());
                }
            }
            Some(_) => log::warn!("Stale reference to asset {id} ignored"),
            None => log::warn!("Release of unloaded asset {id}"),
        }
    }

    fn increase_bundle(&mut self, id: &BundleId) -> Option<Serial> {
        let bundle = self.bundles.get_mut(id)?;
        bundle.refs.increase();
        let serial = bundle.serial();

        if self.bundle_reclaim.remove(id) {
            self.stats.reclaims_cancelled += 1;
        }
        Some(serial)
    }

    fn decrease_bundle(&mut self, id: &BundleId, serial: Serial) {
        match self.bundles.get_mut(id) {
            Some(bundle) if bundle.serial() == serial => {
                if bundle.refs.decrease(id.name()) == 0 {
                    self.bundle_reclaim.push(id.clone());
                }
            }
            Some(_) => log::warn!("Stale reference to bundle {id} ignored"),
            None => log::warn!("Release of unloaded bundle {id}"),
        }
    }

    /// Queue an asset nobody took a reference on, so a failed request
    /// doesn't leave it loaded
    fn defer_if_unreferenced(&mut self, id: &AssetId) {
        if self.assets.get(id).is_some_and(|asset| asset.refs.is_zero()) {
            self.asset_reclaim.push(id.clone());
        }
    }

    fn defer_bundle_if_unreferenced(&mut self, id: &BundleId) {
        if self.bundles.get(id).is_some_and(|bundle| bundle.refs.is_zero()) {
            self.bundle_reclaim.push(id.clone());
        }
    }

    // -------------------------------------------------------------------------
    // Reclaiming
    // -------------------------------------------------------------------------

    /// Destroy an asset if it is still unreferenced
    fn reclaim_asset(&mut self, id: &AssetId) -> bool {
        if !self.assets.get(id).is_some_and(|asset| asset.refs.is_zero()) {
            return false;
        }

        let Some(asset) = self.assets.remove(id) else {
            return false;
        };

        if self.destroy_asset(asset) {
            self.engine.unload_unused_cached_resources();
        }
        true
    }

    /// Release an asset's resource and the reference it held on its bundle.
    ///
    /// Returns `true` for a loose resource.
    fn destroy_asset(&mut self, asset: AssetObject<E::Resource>) -> bool {
        let (id, bundle, resource) = asset.into_parts();
        log::trace!("Asset reclaimed: {id}");

        self.engine.release_resource(resource);
        self.stats.assets_reclaimed += 1;

        match bundle {
            Some((bundle, serial)) => {
                self.decrease_bundle(&bundle, serial);
                false
            }
            None => true,
        }
    }

    /// Unload a bundle if it is still unreferenced
    fn reclaim_bundle(&mut self, id: &BundleId) -> bool {
        if !self.bundles.get(id).is_some_and(|bundle| bundle.refs.is_zero()) {
            return false;
        }
        self.unload_bundle_inner(id, true)
    }

    fn unload_bundle_inner(&mut self, id: &BundleId, check: bool) -> bool {
        if id.is_null() {
            return false;
        }

        let Some(bundle) = self.bundles.remove(id) else {
            return false;
        };

        if check {
            if !bundle.refs.is_zero() {
                log::warn!(
                    "Bundle reference count error. {id} unloaded at count {}",
                    bundle.count()
                );
            }

            let orphans = self
                .assets
                .values()
                .filter(|asset| asset.bundle() == Some(id))
                .count();
            if orphans > 0 {
                log::error!("Bundle {id} unloaded with {orphans} assets still loaded from it");
            }
        }

        log::debug!("Bundle unloaded: {id}");
        self.bundle_reclaim.remove(id);

        let (archive, dependencies) = bundle.into_parts();
        self.engine.unload_archive(archive);
        self.stats.bundles_unloaded += 1;

        for (dependency, serial) in &dependencies {
            if self.bundles.contains_key(dependency) {
                self.decrease_bundle(dependency, *serial);
            }
        }

        true
    }

    /// Uninitialize a released copy, pool or destroy it, and drop its
    /// reference on the origin asset. Returns `true` if it was pooled.
    fn reclaim_copy(&mut self, copy: CopyObject<E::Object>) -> bool {
        let (asset, serial, object) = copy.into_parts();
        self.engine.uninitialize(&object);

        if !self.assets.get(&asset).is_some_and(|origin| origin.serial() == serial) {
            log::warn!("Stale copy of {asset} destroyed");
            self.engine.destroy_immediate(object);
            return false;
        }

        let pooled = match self.pools.get_mut(&asset) {
            Some(pool) => {
                pool.free(&mut self.engine, object);
                true
            }
            None => {
                self.engine.destroy_immediate(object);
                false
            }
        };

        self.decrease_asset(&asset, serial);
        pooled
    }

    fn release_pool(&mut self, pool: &mut AssetPool<E::Object>) {
        if let Some(backing) = pool.release(&mut self.engine) {
            self.release_asset(backing);
        }
    }
}
