//! # Frame Driver
//!
//! Runs registered systems in order, then drains the resource manager on
//! the calling thread, which is treated as the context-owning thread.

use std::time::{Duration, Instant};

use vesper_core::{animate_move_to, check_proximity_triggers, TaskScheduler};
use vesper_rendering::GraphicsBackend;

use crate::config::RuntimeConfig;
use crate::error::VesperResult;
use crate::world::WorldState;

/// Frame time above which a warning is logged.
pub const MAX_FRAME_TIME: Duration = Duration::from_millis(33);

/// A per-frame system. Receives the world, the frame time in seconds and the pool.
pub type System<B> = Box<dyn FnMut(&WorldState<B>, f64, &TaskScheduler) + Send>;

/// Timing of one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frame number, starting at 0.
    pub frame: u64,
    /// Systems executed.
    pub systems_run: usize,
    /// Deferred resource tasks executed by the drain.
    pub tasks_drained: usize,
    /// Time spent in systems, in microseconds.
    pub systems_us: u64,
    /// Time spent draining, in microseconds.
    pub drain_us: u64,
}

impl FrameStats {
    /// Total frame time in microseconds.
    #[inline]
    #[must_use]
    pub fn total_us(&self) -> u64 {
        self.systems_us + self.drain_us
    }
}

/// Owns the world, the worker pool and the system list.
pub struct FrameDriver<B: GraphicsBackend> {
    world: WorldState<B>,
    scheduler: TaskScheduler,
    systems: Vec<(String, System<B>)>,
    drain_budget: Option<usize>,
    frame: u64,
}

impl<B: GraphicsBackend> FrameDriver<B> {
    /// Creates a driver from existing parts.
    #[must_use]
    pub fn new(world: WorldState<B>, scheduler: TaskScheduler, drain_budget: Option<usize>) -> Self {
        Self {
            world,
            scheduler,
            systems: Vec::new(),
            drain_budget,
            frame: 0,
        }
    }

    /// Builds the world and the worker pool from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`VesperError::Config`](crate::VesperError::Config) for invalid
    /// values and [`VesperError::Ecs`](crate::VesperError::Ecs) if the
    /// workers cannot be spawned.
    pub fn from_config(backend: B, config: &RuntimeConfig) -> VesperResult<Self> {
        config.validate()?;
        let scheduler = TaskScheduler::new(&config.core.scheduler)?;
        tracing::info!(
            workers = scheduler.worker_count(),
            buckets = config.core.systems.bucket_count,
            drain_budget = ?config.rendering.drain_budget,
            "frame driver ready"
        );
        Ok(Self::new(
            WorldState::new(backend, config),
            scheduler,
            config.rendering.drain_budget,
        ))
    }

    /// Appends a system; systems run in registration order.
    pub fn add_system(
        &mut self,
        name: impl Into<String>,
        system: impl FnMut(&WorldState<B>, f64, &TaskScheduler) + Send + 'static,
    ) -> &mut Self {
        self.systems.push((name.into(), Box::new(system)));
        self
    }

    /// Registers movement, then proximity checks.
    pub fn add_builtin_systems(&mut self) -> &mut Self {
        self.add_system("animate_move_to", |world, dt, scheduler| {
            animate_move_to(
                world.transforms(),
                world.move_to(),
                dt,
                scheduler,
                world.bucket_count(),
            );
        })
        .add_system("check_proximity_triggers", |world, dt, scheduler| {
            check_proximity_triggers(
                world.transforms(),
                world.proximity_triggers(),
                dt,
                scheduler,
                world.bucket_count(),
            );
        })
    }

    /// Runs one frame: every system, then the resource drain.
    pub fn run_frame(&mut self, dt: f64) -> FrameStats {
        let start = Instant::now();
        for (name, system) in &mut self.systems {
            system(&self.world, dt, &self.scheduler);
            tracing::trace!(frame = self.frame, system = %name, "system done");
        }
        let systems_done = Instant::now();

        let resources = self.world.resources();
        let tasks_drained = match self.drain_budget {
            Some(budget) => resources.drain_with_budget(budget),
            None => resources.drain(),
        };
        let end = Instant::now();

        let panicked = self.scheduler.take_panicked_tasks();
        if panicked > 0 {
            tracing::warn!(frame = self.frame, panicked, "tasks panicked during frame");
        }

        let stats = FrameStats {
            frame: self.frame,
            systems_run: self.systems.len(),
            tasks_drained,
            systems_us: micros(systems_done.duration_since(start)),
            drain_us: micros(end.duration_since(systems_done)),
        };
        if end.duration_since(start) > MAX_FRAME_TIME {
            tracing::warn!(
                frame = stats.frame,
                total_us = stats.total_us(),
                "frame exceeded budget"
            );
        } else {
            tracing::debug!(
                frame = stats.frame,
                total_us = stats.total_us(),
                tasks_drained,
                "frame done"
            );
        }

        self.frame += 1;
        stats
    }

    /// The world.
    #[inline]
    #[must_use]
    pub fn world(&self) -> &WorldState<B> {
        &self.world
    }

    /// The worker pool.
    #[inline]
    #[must_use]
    pub fn scheduler(&self) -> &TaskScheduler {
        &self.scheduler
    }

    /// Frames completed.
    #[inline]
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Systems registered.
    #[inline]
    #[must_use]
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }
}

fn micros(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}
