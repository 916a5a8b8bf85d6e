use crate::components::{
    ProximityCallback, ProximityTrigger, Transform, TransformComponentManager,
    ProximityTriggerComponentManager,
};
use crate::ecs::{ComponentData, ComponentRecord, SingleInstanceIndex};
use crate::sched::{bucket_ranges, TaskScheduler};

use super::position_of;

/// Updates every proximity trigger and fires enter/leave callbacks.
///
/// A trigger enters when the distance between its entity and its target drops
/// below `trigger_distance` while `in_proximity` is clear, and leaves when the
/// distance exceeds it while the flag is set. Triggers whose entity or target
/// has no transform are skipped.
///
/// Callbacks run on the calling thread after the barrier, in slot order, with
/// no manager lock held, so they may freely touch any manager.
///
/// # Arguments
///
/// * `transforms` - Positions of trigger owners and targets
/// * `triggers` - Triggers to update
/// * `_dt` - Frame time (unused; kept so all systems share one signature)
/// * `scheduler` - Pool running the buckets
/// * `bucket_count` - Number of tasks to split the slot range into
///
/// # Returns
///
/// The number of callbacks fired.
pub fn check_proximity_triggers(
    transforms: &TransformComponentManager,
    triggers: &ProximityTriggerComponentManager,
    _dt: f64,
    scheduler: &TaskScheduler,
    bucket_count: usize,
) -> usize {
    let fired: Vec<ProximityCallback> = {
        let transforms = transforms.read();
        let transforms = &*transforms;
        let mut triggers = triggers.write();

        let ranges = bucket_ranges(triggers.slot_count(), bucket_count);
        let buckets = triggers.buckets_mut(&ranges);
        let mut results: Vec<Vec<ProximityCallback>> = Vec::new();
        results.resize_with(buckets.len(), Vec::new);

        scheduler.scope(|s| {
            for (bucket, out) in buckets.into_iter().zip(results.iter_mut()) {
                s.spawn(move || *out = check_bucket(transforms, bucket));
            }
        });

        results.into_iter().flatten().collect()
    };

    for callback in &fired {
        callback();
    }
    fired.len()
}

fn check_bucket(
    transforms: &ComponentData<Transform, SingleInstanceIndex>,
    bucket: Vec<(usize, &mut ComponentRecord<ProximityTrigger>)>,
) -> Vec<ProximityCallback> {
    let mut fired = Vec::new();

    for (_, record) in bucket {
        let (Some(own), Some(target)) = (
            position_of(transforms, record.entity),
            position_of(transforms, record.data.target),
        ) else {
            continue;
        };

        let trigger = &mut record.data;
        let distance = own.distance(target);

        if distance < trigger.trigger_distance && !trigger.in_proximity {
            trigger.in_proximity = true;
            fired.extend(trigger.enter_callback.clone());
        } else if distance > trigger.trigger_distance && trigger.in_proximity {
            trigger.in_proximity = false;
            fired.extend(trigger.leave_callback.clone());
        }
    }

    fired
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::ecs::{Entity, Vec3};

    struct Scene {
        transforms: TransformComponentManager,
        triggers: ProximityTriggerComponentManager,
        enters: Arc<AtomicUsize>,
        leaves: Arc<AtomicUsize>,
        target_index: usize,
    }

    fn scene(trigger_owners: u32) -> Scene {
        let transforms = TransformComponentManager::new(16);
        let triggers = ProximityTriggerComponentManager::new(16);
        let enters = Arc::new(AtomicUsize::new(0));
        let leaves = Arc::new(AtomicUsize::new(0));

        let target = Entity::new(1000, 0);
        let target_index = transforms
            .add_component(target, Transform::at(Vec3::new(100.0, 0.0, 0.0)))
            .unwrap();

        for i in 0..trigger_owners {
            let owner = Entity::new(i, 0);
            transforms.add_component(owner, Transform::default()).unwrap();
            let (e, l) = (Arc::clone(&enters), Arc::clone(&leaves));
            triggers
                .add_component(
                    owner,
                    ProximityTrigger::new(target, 5.0)
                        .on_enter(move || {
                            e.fetch_add(1, Ordering::Relaxed);
                        })
                        .on_leave(move || {
                            l.fetch_add(1, Ordering::Relaxed);
                        }),
                )
                .unwrap();
        }

        Scene {
            transforms,
            triggers,
            enters,
            leaves,
            target_index,
        }
    }

    #[test]
    fn test_enter_and_leave_fire_once() {
        let scheduler = TaskScheduler::with_workers(3).unwrap();
        let s = scene(20);

        assert_eq!(check_proximity_triggers(&s.transforms, &s.triggers, 0.016, &scheduler, 6), 0);

        s.transforms.set_world_position(s.target_index, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(check_proximity_triggers(&s.transforms, &s.triggers, 0.016, &scheduler, 6), 20);
        // Still near: no repeat
        assert_eq!(check_proximity_triggers(&s.transforms, &s.triggers, 0.016, &scheduler, 6), 0);
        assert_eq!(s.enters.load(Ordering::Relaxed), 20);

        s.transforms.set_world_position(s.target_index, Vec3::new(50.0, 0.0, 0.0));
        assert_eq!(check_proximity_triggers(&s.transforms, &s.triggers, 0.016, &scheduler, 6), 20);
        assert_eq!(s.leaves.load(Ordering::Relaxed), 20);
    }

    #[test]
    fn test_exact_distance_changes_nothing() {
        let scheduler = TaskScheduler::with_workers(1).unwrap();
        let s = scene(1);

        s.transforms.set_world_position(s.target_index, Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(check_proximity_triggers(&s.transforms, &s.triggers, 0.0, &scheduler, 6), 0);
        assert!(!s.triggers.get_component(0).unwrap().in_proximity);
    }

    #[test]
    fn test_trigger_without_target_transform_is_skipped() {
        let scheduler = TaskScheduler::with_workers(1).unwrap();
        let transforms = TransformComponentManager::default();
        let triggers = ProximityTriggerComponentManager::default();
        let owner = Entity::new(0, 0);
        transforms.add_component(owner, Transform::default()).unwrap();
        triggers
            .add_component(owner, ProximityTrigger::new(Entity::new(7, 0), 100.0))
            .unwrap();

        assert_eq!(check_proximity_triggers(&transforms, &triggers, 0.0, &scheduler, 6), 0);
    }

    #[test]
    fn test_callbacks_may_use_managers() {
        let scheduler = TaskScheduler::with_workers(2).unwrap();
        let transforms = Arc::new(TransformComponentManager::default());
        let triggers = ProximityTriggerComponentManager::default();
        let owner = Entity::new(0, 0);
        let target = Entity::new(1, 0);
        transforms.add_component(owner, Transform::default()).unwrap();
        let target_index = transforms
            .add_component(target, Transform::at(Vec3::new(1.0, 0.0, 0.0)))
            .unwrap();

        let handle = Arc::clone(&transforms);
        triggers
            .add_component(
                owner,
                ProximityTrigger::new(target, 2.0).on_enter(move || {
                    handle.set_world_position(target_index, Vec3::new(10.0, 0.0, 0.0));
                }),
            )
            .unwrap();

        assert_eq!(check_proximity_triggers(&transforms, &triggers, 0.0, &scheduler, 2), 1);
        assert_eq!(transforms.world_position(target_index), Some(Vec3::new(10.0, 0.0, 0.0)));
    }
}
