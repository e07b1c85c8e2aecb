//! Headless demo driving the registry against the in-memory engine

use resource_core::assets::memory::{MemoryEngine, ObjectId};
use resource_core::core::logging;
use resource_core::prelude::*;

/// Projectile component, recycled through pools
#[derive(Debug)]
struct Projectile {
    object: ObjectId,
}

/// Player component, spawned once per scene
#[derive(Debug)]
struct Player {
    object: ObjectId,
}

const FRAMES: usize = 8;
const VOLLEY: usize = 4;

fn build_engine() -> MemoryEngine {
    MemoryEngine::new()
        .with_archive("bundles/chars.bundle", &["chars/hero.prefab"])
        .with_archive("bundles/fx.bundle", &["fx/bullet.prefab"])
        .with_archive("bundles/shared.bundle", &["shared/base.mat"])
        .with_loose("ui/crosshair")
        .with_component("chars/hero.prefab", |object| Player { object })
        .with_component("fx/bullet.prefab", |object| Projectile { object })
        .with_pooled::<Projectile>()
}

fn build_metadata() -> (BundleManifest, BundleDatabase) {
    let manifest = BundleManifest::new()
        .with_bundle("chars", &["shared"])
        .with_bundle("fx", &["shared"])
        .with_bundle("shared", &[]);

    let database = BundleDatabase::new()
        .with_bundle("chars", "chars.bundle")
        .with_bundle("fx", "fx.bundle")
        .with_bundle("shared", "shared.bundle")
        .with_asset("chars/hero.prefab", "chars")
        .with_asset("fx/bullet.prefab", "fx")
        .with_asset("shared/base.mat", "shared");

    (manifest, database)
}

fn load_config() -> ResourceConfig {
    let Some(path) = std::env::args().nth(1) else {
        return ResourceConfig::default();
    };

    let result = if path.ends_with(".json") {
        ResourceConfig::load_json(&path)
    } else {
        ResourceConfig::load_ron(&path)
    };

    result.unwrap_or_else(|e| {
        log::warn!("Using default configuration, {path} failed to load: {e}");
        ResourceConfig::default()
    })
}

fn run_scene(registry: &mut AssetRegistry<MemoryEngine>) -> Result<(), ResourceError> {
    let hero = AssetId::new("chars/hero.prefab");
    let bullet = AssetId::new("fx/bullet.prefab");
    let crosshair = AssetId::new("ui/crosshair.png");

    registry.preload_pool_count::<Projectile>(&bullet, VOLLEY)?;

    let player = registry.instantiate::<Player>(&hero, Some(Vec3::ZERO))?;
    log::info!("Player spawned as {:?}", player.component.object);

    let ui = registry.acquire_asset(&crosshair)?;

    for frame in 0..FRAMES {
        let mut volley = Vec::with_capacity(VOLLEY);
        for i in 0..VOLLEY {
            let origin = Vec3::new(i as f32, 1.0, frame as f32);
            let shot = registry.instantiate::<Projectile>(&bullet, Some(origin))?;
            log::trace!("Frame {frame}: projectile {:?}", shot.component.object);
            volley.push(shot.copy);
        }

        for copy in volley {
            registry.release_instance(copy);
        }

        let sweep = registry.update();
        if !sweep.is_empty() {
            log::debug!("Frame {frame}: {sweep:?}");
        }
    }

    registry.release_asset(ui);
    player.copy.destroy(registry);
    registry.update();

    Ok(())
}

fn main() {
    logging::init();

    let mut registry = AssetRegistry::new(build_engine(), load_config());
    if !registry.load_bundle_metadata() {
        let (manifest, database) = build_metadata();
        registry.set_bundle_metadata(manifest, database);
    }

    if let Err(e) = run_scene(&mut registry) {
        log::error!("Scene failed: {e}");
    }

    log::info!(
        "Loaded: {} assets, {} bundles, {} pools",
        registry.asset_count(),
        registry.bundle_count(),
        registry.pool_count()
    );

    let report = registry.on_scene_changing();
    if report.is_clean() {
        log::info!("Teardown clean");
    } else {
        for leak in report.asset_leaks.iter().chain(&report.bundle_leaks) {
            log::error!("{leak}");
        }
    }

    log::info!("{}", registry.stats().format_stats());
    log::info!("Engine calls: {:?}", registry.engine().calls());
}
