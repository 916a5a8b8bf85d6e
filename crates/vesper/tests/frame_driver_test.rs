//! End-to-end frames: movement, proximity callbacks and mesh uploads together.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use vesper::core::{MoveTo, ProximityTrigger, Transform, Vec3};
use vesper::rendering::{
    HeadlessBackend, MeshData, ResourceManager, ResourceState, VertexFormat, VertexLayout,
};
use vesper::{FrameDriver, RuntimeConfig, WorldState};

const CONFIG: &str = r#"
[core.scheduler]
worker_threads = 3

[core.systems]
bucket_count = 4

[rendering]
drain_budget = 16
"#;

#[test]
fn test_movers_reach_beacon_and_fire_once() {
    let config = RuntimeConfig::from_toml_str(CONFIG).unwrap();
    let mut driver = FrameDriver::from_config(HeadlessBackend::new(), &config).unwrap();
    driver.add_builtin_systems();

    let entered = Arc::new(AtomicUsize::new(0));
    let world = driver.world();
    let beacon = world.spawn();
    world.transforms().add_component(beacon, Transform::default()).unwrap();

    let mut movers = Vec::new();
    for i in 0..40u8 {
        let e = world.spawn();
        let start = Vec3::new(5.0 + f32::from(i) * 0.1, 0.0, 0.0);
        world.transforms().add_component(e, Transform::at(start)).unwrap();
        world
            .move_to()
            .add_component(e, MoveTo::global(Vec3::ZERO, 10.0))
            .unwrap();
        let entered = Arc::clone(&entered);
        world
            .proximity_triggers()
            .add_component(
                e,
                ProximityTrigger::new(beacon, 1.0).on_enter(move || {
                    entered.fetch_add(1, Ordering::Relaxed);
                }),
            )
            .unwrap();
        movers.push(e);
    }

    for _ in 0..120 {
        driver.run_frame(1.0 / 60.0);
    }

    let world = driver.world();
    for &e in &movers {
        let index = world.transforms().get_index(e).unwrap();
        let position = world.transforms().world_position(index).unwrap();
        assert!(position.distance(Vec3::ZERO) < 1e-3);
    }
    assert_eq!(entered.load(Ordering::Relaxed), movers.len());
}

#[test]
fn test_drain_budget_spreads_uploads_over_frames() {
    let config = RuntimeConfig::from_toml_str(CONFIG).unwrap();
    let mut driver = FrameDriver::from_config(HeadlessBackend::new(), &config).unwrap();

    let world = driver.world();
    let layout = VertexLayout::packed(&[VertexFormat::Float32x3], 0);
    let mut resource = None;
    for _ in 0..40 {
        let e = world.spawn();
        let data = MeshData::from_pod(layout.clone(), &[[0.0f32; 3]; 3], &[0, 1, 2]);
        resource = Some(world.meshes().add_component(e, "tri", data, false).unwrap());
    }
    let resource = resource.unwrap();

    // One allocation and 40 uploads, 16 per frame
    assert_eq!(driver.run_frame(0.0).tasks_drained, 16);
    assert_eq!(driver.world().resources().get_mesh(resource).state, ResourceState::Ready);
    assert_eq!(driver.run_frame(0.0).tasks_drained, 16);
    assert_eq!(driver.run_frame(0.0).tasks_drained, 9);
    assert_eq!(driver.world().resources().backend().mesh_update_count(), 40);
}

#[test]
fn test_despawned_entities_leave_systems() {
    let config = RuntimeConfig::default();
    let mut driver = FrameDriver::from_config(HeadlessBackend::new(), &config).unwrap();
    driver.add_builtin_systems();

    let world = driver.world();
    let e = world.spawn();
    world.transforms().add_component(e, Transform::default()).unwrap();
    world
        .move_to()
        .add_component(e, MoveTo::global(Vec3::new(1.0, 0.0, 0.0), 1.0))
        .unwrap();
    assert!(world.despawn(e));

    driver.run_frame(0.5);
    assert_eq!(driver.world().move_to().component_count(), 0);
    assert_eq!(driver.world().transforms().component_count(), 0);
}

#[test]
fn test_worlds_sharing_resources_keep_their_geometry() {
    let config = RuntimeConfig::default();
    let resources = Arc::new(ResourceManager::new(HeadlessBackend::new()));
    let world_a = WorldState::with_resources(Arc::clone(&resources), &config);
    let world_b = WorldState::with_resources(Arc::clone(&resources), &config);

    let layout = VertexLayout::packed(&[VertexFormat::Float32x3], 0);
    let add = |world: &WorldState<HeadlessBackend>, value: f32| {
        let data = MeshData::from_pod(layout.clone(), &[[value; 3]; 3], &[0, 1, 2]);
        let e = world.spawn();
        let batch = world.meshes().add_component(e, "tri", data, false).unwrap();
        (e, batch)
    };
    let (ea, ra) = add(&world_a, 1.0);
    let (eb, rb) = add(&world_b, 9.0);
    assert_ne!(ra, rb);

    resources.drain();
    for (world, e, batch, value) in [(&world_a, ea, ra, 1.0f32), (&world_b, eb, rb, 9.0)] {
        let index = world.meshes().components().get_index(e).unwrap();
        let params = world.meshes().get_draw_indexed_params(index).unwrap();
        let bytes = resources.get_mesh(batch).upgrade().unwrap().vertex_bytes(0).unwrap();
        let positions: &[[f32; 3]] = bytemuck::cast_slice(&bytes);
        assert_eq!(positions[params.base_vertex], [value; 3]);
    }
}
