use crate::components::{MoveTo, MoveToComponentManager, Transform, TransformComponentManager};
use crate::ecs::{ComponentData, ComponentRecord, SingleInstanceIndex, Vec3};
use crate::sched::{bucket_ranges, TaskScheduler};

/// Moves every entity with a [`MoveTo`] toward its target.
///
/// Each entity advances by `speed * dt` and never overshoots. Buckets compute
/// new positions in parallel under the transform read lock; the positions are
/// committed under the transform write lock after the barrier. Entities
/// without a transform are skipped.
///
/// # Returns
///
/// The number of transforms that changed.
pub fn animate_move_to(
    transforms: &TransformComponentManager,
    moves: &MoveToComponentManager,
    dt: f64,
    scheduler: &TaskScheduler,
    bucket_count: usize,
) -> usize {
    #[allow(clippy::cast_possible_truncation)]
    let dt = dt as f32;

    let updates: Vec<(usize, Vec3)> = {
        let transforms = transforms.read();
        let transforms = &*transforms;
        let mut moves = moves.write();

        let ranges = bucket_ranges(moves.slot_count(), bucket_count);
        let buckets = moves.buckets_mut(&ranges);
        let mut results: Vec<Vec<(usize, Vec3)>> = Vec::new();
        results.resize_with(buckets.len(), Vec::new);

        scheduler.scope(|s| {
            for (bucket, out) in buckets.into_iter().zip(results.iter_mut()) {
                s.spawn(move || *out = step_bucket(transforms, bucket, dt));
            }
        });

        results.into_iter().flatten().collect()
    };

    let mut transforms = transforms.write();
    for (index, position) in &updates {
        if let Some(record) = transforms.get_mut(*index) {
            record.data.position = *position;
        }
    }
    updates.len()
}

fn step_bucket(
    transforms: &ComponentData<Transform, SingleInstanceIndex>,
    bucket: Vec<(usize, &mut ComponentRecord<MoveTo>)>,
    dt: f32,
) -> Vec<(usize, Vec3)> {
    let mut updates = Vec::new();

    for (_, record) in bucket {
        let Some(transform_index) = transforms.index_of(record.entity) else {
            continue;
        };
        let Some(position) = transforms.get(transform_index).map(|t| t.data.position) else {
            continue;
        };

        let target = record.data.resolve(position);
        let remaining = target - position;
        let distance = remaining.length();
        if distance <= f32::EPSILON {
            continue;
        }

        let step = record.data.speed * dt;
        let next = if step >= distance {
            target
        } else {
            position + remaining * (step / distance)
        };
        updates.push((transform_index, next));
    }

    updates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::Entity;

    fn approx(a: Vec3, b: Vec3) -> bool {
        a.distance(b) < 1e-4
    }

    #[test]
    fn test_global_move_advances_and_stops() {
        let scheduler = TaskScheduler::with_workers(2).unwrap();
        let transforms = TransformComponentManager::default();
        let moves = MoveToComponentManager::default();
        let e = Entity::new(0, 0);
        let ti = transforms.add_component(e, Transform::default()).unwrap();
        moves
            .add_component(e, MoveTo::global(Vec3::new(1.0, 0.0, 0.0), 1.0))
            .unwrap();

        assert_eq!(animate_move_to(&transforms, &moves, 0.5, &scheduler, 6), 1);
        assert!(approx(transforms.world_position(ti).unwrap(), Vec3::new(0.5, 0.0, 0.0)));

        // Large step clamps to the target
        assert_eq!(animate_move_to(&transforms, &moves, 10.0, &scheduler, 6), 1);
        assert_eq!(transforms.world_position(ti), Some(Vec3::new(1.0, 0.0, 0.0)));

        // Arrived: nothing left to do
        assert_eq!(animate_move_to(&transforms, &moves, 1.0, &scheduler, 6), 0);
    }

    #[test]
    fn test_local_move_is_relative_to_start() {
        let scheduler = TaskScheduler::with_workers(2).unwrap();
        let transforms = TransformComponentManager::default();
        let moves = MoveToComponentManager::default();
        let e = Entity::new(0, 0);
        let ti = transforms
            .add_component(e, Transform::at(Vec3::new(10.0, 0.0, 0.0)))
            .unwrap();
        moves
            .add_component(e, MoveTo::new(Vec3::new(0.0, 2.0, 0.0), 1.0))
            .unwrap();

        for _ in 0..4 {
            animate_move_to(&transforms, &moves, 1.0, &scheduler, 6);
        }
        assert!(approx(transforms.world_position(ti).unwrap(), Vec3::new(10.0, 2.0, 0.0)));
    }

    #[test]
    fn test_many_entities_across_buckets() {
        let scheduler = TaskScheduler::with_workers(4).unwrap();
        let transforms = TransformComponentManager::new(8);
        let moves = MoveToComponentManager::new(8);

        for i in 0..100 {
            let e = Entity::new(i, 0);
            transforms.add_component(e, Transform::default()).unwrap();
            moves
                .add_component(e, MoveTo::global(Vec3::new(0.0, 0.0, 4.0), 2.0))
                .unwrap();
        }

        assert_eq!(animate_move_to(&transforms, &moves, 1.0, &scheduler, 6), 100);
        let data = transforms.read();
        assert!(data
            .iter()
            .all(|(_, r)| approx(r.data.position, Vec3::new(0.0, 0.0, 2.0))));
    }
}
