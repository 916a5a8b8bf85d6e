//! Integration tests for managers, the scheduler and the built-in systems.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use vesper_core::{
    animate_move_to, check_proximity_triggers, CoreConfig, EntityManager, MoveTo,
    MoveToComponentManager, ProximityTrigger, ProximityTriggerComponentManager, TaskScheduler,
    Transform, TransformComponentManager, Vec3,
};

#[test]
fn test_thousand_tasks_then_barrier() {
    let scheduler = TaskScheduler::with_workers(4).unwrap();
    let counter = Arc::new(AtomicUsize::new(0));

    for _ in 0..1000 {
        let counter = Arc::clone(&counter);
        scheduler.submit_task(move || {
            counter.fetch_add(1, Ordering::Relaxed);
        });
    }
    scheduler.wait_while_busy();

    assert_eq!(counter.load(Ordering::Relaxed), 1000);
    assert_eq!(scheduler.queued_task_count(), 0);
}

#[test]
fn test_move_to_delete_scenario() {
    let entities = EntityManager::new();
    let moves = MoveToComponentManager::default();

    let e = entities.create();
    let other = entities.create();
    moves
        .add_component(e, MoveTo::new(Vec3::new(1.0, 0.0, 0.0), 1.0))
        .unwrap();
    moves
        .add_component(other, MoveTo::new(Vec3::new(0.0, 1.0, 0.0), 1.0))
        .unwrap();

    let before = moves.component_count();
    assert!(moves.delete_component(e));
    assert_eq!(moves.component_count(), before - 1);
    assert!(!moves.check_component(e));
    assert!(moves.check_component(other));
}

#[test]
fn test_stale_entity_never_matches_new_one() {
    let entities = EntityManager::new();
    let transforms = TransformComponentManager::default();

    let old = entities.create();
    transforms.add_component(old, Transform::default()).unwrap();
    assert!(entities.destroy(old));
    transforms.delete_component(old);

    let new = entities.create();
    assert_eq!(new.index(), old.index());
    assert_ne!(new, old);
    transforms.add_component(new, Transform::default()).unwrap();

    assert!(!transforms.check_component(old));
    assert!(transforms.check_component(new));
    assert!(!entities.is_alive(old));
}

#[test]
fn test_multi_instance_order_survives_other_deletes() {
    let entities = EntityManager::new();
    let triggers = ProximityTriggerComponentManager::new(4);
    let a = entities.create();
    let b = entities.create();

    for distance in [1.0, 2.0, 3.0] {
        triggers
            .add_component(a, ProximityTrigger::new(b, distance))
            .unwrap();
        triggers
            .add_component(b, ProximityTrigger::new(a, distance * 10.0))
            .unwrap();
    }
    triggers.delete_component(b);
    triggers.add_component(a, ProximityTrigger::new(b, 4.0)).unwrap();

    let distances: Vec<f32> = triggers
        .get_indices(a)
        .into_iter()
        .map(|i| triggers.get_component(i).unwrap().trigger_distance)
        .collect();
    assert_eq!(distances, vec![1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn test_concurrent_adds_from_many_threads() {
    let entities = Arc::new(EntityManager::new());
    let transforms = Arc::new(TransformComponentManager::new(64));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let entities = Arc::clone(&entities);
            let transforms = Arc::clone(&transforms);
            thread::spawn(move || {
                for _ in 0..500 {
                    let e = entities.create();
                    transforms.add_component(e, Transform::default()).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(entities.alive_count(), 4000);
    assert_eq!(transforms.component_count(), 4000);
}

#[test]
fn test_systems_share_one_scheduler() {
    let config: CoreConfig = toml::from_str("[scheduler]\nworker_threads = 3\n").unwrap();
    let scheduler = TaskScheduler::new(&config.scheduler).unwrap();
    assert_eq!(scheduler.worker_count(), 3);

    let entities = EntityManager::new();
    let transforms = TransformComponentManager::default();
    let moves = MoveToComponentManager::default();
    let triggers = ProximityTriggerComponentManager::default();

    let beacon = entities.create();
    transforms
        .add_component(beacon, Transform::at(Vec3::new(10.0, 0.0, 0.0)))
        .unwrap();

    let runner = entities.create();
    transforms.add_component(runner, Transform::default()).unwrap();
    moves
        .add_component(runner, MoveTo::global(Vec3::new(10.0, 0.0, 0.0), 1.0))
        .unwrap();

    let entered = Arc::new(AtomicUsize::new(0));
    let hits = Arc::clone(&entered);
    triggers
        .add_component(
            runner,
            ProximityTrigger::new(beacon, 2.5).on_enter(move || {
                hits.fetch_add(1, Ordering::Relaxed);
            }),
        )
        .unwrap();

    let buckets = config.systems.bucket_count;
    for _ in 0..20 {
        animate_move_to(&transforms, &moves, 1.0, &scheduler, buckets);
        check_proximity_triggers(&transforms, &triggers, 1.0, &scheduler, buckets);
    }

    assert_eq!(entered.load(Ordering::Relaxed), 1);
    let index = transforms.get_index(runner).unwrap();
    assert_eq!(transforms.world_position(index), Some(Vec3::new(10.0, 0.0, 0.0)));
}
