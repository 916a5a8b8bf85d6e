//! # VESPER Headless
//!
//! Runs a small scene for a fixed number of frames without a GPU.
//!
//! ```bash
//! # Defaults
//! vesper-headless
//!
//! # With a config file and more frames
//! RUST_LOG=debug vesper-headless vesper.toml 600
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use vesper::core::{MoveTo, ProximityTrigger, Transform, Vec3};
use vesper::rendering::{BufferUsage, HeadlessBackend, MeshData, ResourceKind, VertexFormat, VertexLayout};
use vesper::{FrameDriver, RuntimeConfig, VesperResult};

const DEFAULT_FRAMES: u64 = 120;
const MOVERS: usize = 256;
const FRAME_TIME: f64 = 1.0 / 60.0;

fn main() -> VesperResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => RuntimeConfig::load(path)?,
        None => RuntimeConfig::default(),
    };
    let frames = args
        .next()
        .and_then(|n| n.parse().ok())
        .unwrap_or(DEFAULT_FRAMES);

    let mut driver = FrameDriver::from_config(HeadlessBackend::new(), &config)?;
    driver.add_builtin_systems();

    let entered = Arc::new(AtomicUsize::new(0));
    populate(&driver, &entered)?;

    let mut drained = 0;
    let mut slowest = 0;
    for _ in 0..frames {
        let stats = driver.run_frame(FRAME_TIME);
        drained += stats.tasks_drained;
        slowest = slowest.max(stats.total_us());
    }

    let world = driver.world();
    tracing::info!(
        frames,
        drained,
        slowest_us = slowest,
        entered = entered.load(Ordering::Relaxed),
        batches = world.meshes().batch_count(),
        meshes = world.resources().resource_count_of(ResourceKind::Mesh),
        gpu_constructions = world.resources().backend().total_constructions(),
        "run finished"
    );
    Ok(())
}

/// Movers converge on a beacon at the origin; each has a trigger on it and a cube mesh.
fn populate(driver: &FrameDriver<HeadlessBackend>, entered: &Arc<AtomicUsize>) -> VesperResult<()> {
    let world = driver.world();

    let beacon = world.spawn();
    world.transforms().add_component(beacon, Transform::default())?;

    world
        .resources()
        .create_buffer_object_async("camera", BufferUsage::Uniform, vec![0; 64]);

    let layout = VertexLayout::packed(&[VertexFormat::Float32x3], 0);
    for i in 0..MOVERS {
        #[allow(clippy::cast_precision_loss)]
        let angle = i as f32 / MOVERS as f32 * std::f32::consts::TAU;
        let start = Vec3::new(angle.cos() * 20.0, 0.0, angle.sin() * 20.0);

        let e = world.spawn();
        world.transforms().add_component(e, Transform::at(start))?;
        world
            .move_to()
            .add_component(e, MoveTo::global(Vec3::default(), 4.0))?;

        let entered = Arc::clone(entered);
        world.proximity_triggers().add_component(
            e,
            ProximityTrigger::new(beacon, 2.0).on_enter(move || {
                entered.fetch_add(1, Ordering::Relaxed);
            }),
        )?;

        world
            .meshes()
            .add_component(e, format!("cube{i}"), cube(layout.clone(), start), false)?;
    }

    tracing::info!(
        entities = world.entities().alive_count(),
        pending = world.resources().pending_task_count(),
        "scene populated"
    );
    Ok(())
}

fn cube(layout: VertexLayout, center: Vec3) -> MeshData {
    let corners: Vec<[f32; 3]> = (0..8u8)
        .map(|c| {
            let offset = |bit: u8| if c & bit == 0 { -0.5 } else { 0.5 };
            [center.x + offset(1), center.y + offset(2), center.z + offset(4)]
        })
        .collect();
    let indices = [
        0, 1, 3, 0, 3, 2, 4, 6, 7, 4, 7, 5, 0, 4, 5, 0, 5, 1, 2, 3, 7, 2, 7, 6, 0, 2, 6, 0, 6, 4, 1,
        5, 7, 1, 7, 3,
    ];
    MeshData::from_pod(layout, &corners, &indices)
}
