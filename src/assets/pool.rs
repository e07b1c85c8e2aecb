//! Per-asset object pool
//!
//! Some object types are spawned and destroyed so often (particles,
//! projectiles, hit effects) that re-instantiating them every time is the
//! dominant cost. An [`AssetPool`] keeps released instances of one asset on a
//! free list and hands them back out instead of spawning new ones.
//!
//! # Lifetime
//!
//! The pool holds an [`AssetRef`] on its backing asset so the source resource
//! stays loaded while pooled instances exist. [`AssetPool::release`] destroys
//! every free instance and returns that reference for the registry to drop.
//!
//! # Performance Characteristics
//!
//! | Operation  | Cost                                   |
//! |------------|----------------------------------------|
//! | `alloc`    | O(1) on a hit, one instantiate on miss |
//! | `free`     | O(1)                                   |
//! | `add_size` | `n` instantiations                     |

use glam::Vec3;

use super::engine::Engine;
use super::handle::AssetRef;
use super::id::AssetId;

// ============================================================================
// Asset Pool
// ============================================================================

/// Free list of spawned instances of one asset
#[derive(Debug)]
pub struct AssetPool<O> {
    /// Asset the instances are spawned from
    asset: AssetId,
    /// Reference keeping the backing asset loaded
    backing: Option<AssetRef>,
    /// Instances waiting to be reused (LIFO)
    free: Vec<O>,
    /// Instances currently handed out
    outstanding: usize,
}

impl<O> AssetPool<O> {
    /// Create an empty pool backed by `backing`
    pub fn new(backing: AssetRef) -> Self {
        Self {
            asset: backing.id().clone(),
            backing: Some(backing),
            free: Vec::new(),
            outstanding: 0,
        }
    }

    /// Take an instance, reusing a free one if available.
    ///
    /// Reused instances are re-enabled and moved to `placement` by the engine.
    pub fn alloc<E>(
        &mut self,
        engine: &mut E,
        resource: &E::Resource,
        placement: Option<Vec3>,
    ) -> O
    where
        E: Engine<Object = O>,
    {
        self.outstanding += 1;

        if let Some(object) = self.free.pop() {
            engine.activate_pooled(&object, placement);
            object
        } else {
            engine.instantiate(resource, placement)
        }
    }

    /// Return an instance to the free list.
    ///
    /// The caller uninitializes the instance first; the engine disables it.
    pub fn free<E>(&mut self, engine: &mut E, object: O)
    where
        E: Engine<Object = O>,
    {
        engine.deactivate_pooled(&object);
        self.outstanding = self.outstanding.saturating_sub(1);
        self.free.push(object);
    }

    /// Hand back an instance from `alloc` that could not be used.
    ///
    /// The instance is destroyed rather than kept.
    pub fn discard<E>(&mut self, engine: &mut E, object: O)
    where
        E: Engine<Object = O>,
    {
        self.outstanding = self.outstanding.saturating_sub(1);
        engine.destroy_immediate(object);
    }

    /// Grow the free list by `count` pre-built, disabled instances
    pub fn add_size<E>(&mut self, engine: &mut E, resource: &E::Resource, count: usize)
    where
        E: Engine<Object = O>,
    {
        self.free.reserve(count);
        for _ in 0..count {
            let object = engine.instantiate(resource, None);
            engine.deactivate_pooled(&object);
            self.free.push(object);
        }
    }

    /// Destroy every free instance and give up the backing reference.
    ///
    /// Instances still handed out are not touched; they are destroyed when
    /// released since the pool no longer exists.
    pub fn release<E>(&mut self, engine: &mut E) -> Option<AssetRef>
    where
        E: Engine<Object = O>,
    {
        for object in self.free.drain(..) {
            engine.destroy_immediate(object);
        }

        if self.outstanding > 0 {
            log::debug!(
                "Pool {} released with {} instances outstanding",
                self.asset,
                self.outstanding
            );
        }

        self.backing.take()
    }

    /// Number of instances ready for reuse
    #[must_use]
    #[inline]
    pub fn free_count(&self) -> usize {
        self.free.len()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::memory::MemoryEngine;
    use crate::assets::object::Serial;

    fn setup() -> (MemoryEngine, <MemoryEngine as Engine>::Resource) {
        let mut engine = MemoryEngine::new().with_loose("spark");
        let resource = engine.load_loose_resource("spark").unwrap();
        (engine, resource)
    }

    fn spark_pool() -> AssetPool<<MemoryEngine as Engine>::Object> {
        AssetPool::new(AssetRef::new(AssetId::new("spark"), Serial::FIRST))
    }

    #[test]
    fn test_alloc_reuses_freed_instance() {
        let (mut engine, resource) = setup();
        let mut pool = spark_pool();

        let first = pool.alloc(&mut engine, &resource, None);
        let first_id = first.id();
        pool.free(&mut engine, first);
        assert!(!engine.is_active(first_id));

        let second = pool.alloc(&mut engine, &resource, Some(Vec3::Z));
        assert_eq!(second.id(), first_id, "Should reuse the freed instance");
        assert!(engine.is_active(first_id));
        assert_eq!(engine.position(first_id), Some(Vec3::Z));
        assert_eq!(engine.calls().instantiations, 1);
        assert_eq!(engine.calls().activations, 1);
    }

    #[test]
    fn test_add_size_prebuilds_instances() {
        let (mut engine, resource) = setup();
        let mut pool = spark_pool();

        pool.add_size(&mut engine, &resource, 3);
        assert_eq!(pool.free_count(), 3);
        assert_eq!(engine.calls().deactivations, 3);

        let _object = pool.alloc(&mut engine, &resource, None);
        assert_eq!(pool.free_count(), 2);
        assert_eq!(engine.calls().instantiations, 3);
    }

    #[test]
    fn test_release_destroys_free_instances() {
        let (mut engine, resource) = setup();
        let mut pool = spark_pool();
        pool.add_size(&mut engine, &resource, 2);

        let backing = pool.release(&mut engine);
        assert_eq!(backing.map(|r| r.id().clone()), Some(AssetId::new("spark")));
        assert_eq!(engine.live_count(), 0);
        assert_eq!(engine.calls().destroys, 2);
        assert!(pool.release(&mut engine).is_none());
    }
}
