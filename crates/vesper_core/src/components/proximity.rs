//! Distance-based enter/leave notifications.

use std::fmt;
use std::sync::Arc;

use crate::ecs::{Component, ComponentKind, Entity, MultiInstanceManager};

/// Callback fired by [`check_proximity_triggers`](crate::systems::check_proximity_triggers).
pub type ProximityCallback = Arc<dyn Fn() + Send + Sync>;

/// Watches the distance between the owning entity and `target`.
#[derive(Clone)]
pub struct ProximityTrigger {
    /// Entity whose distance is tracked.
    pub target: Entity,
    /// Distance below which the target counts as near.
    pub trigger_distance: f32,
    /// Whether the target was near during the last check.
    pub in_proximity: bool,
    /// Fired when the target comes closer than `trigger_distance`.
    pub enter_callback: Option<ProximityCallback>,
    /// Fired when the target moves farther than `trigger_distance`.
    pub leave_callback: Option<ProximityCallback>,
}

impl ProximityTrigger {
    /// Creates a trigger with no callbacks.
    #[must_use]
    pub fn new(target: Entity, trigger_distance: f32) -> Self {
        Self {
            target,
            trigger_distance,
            in_proximity: false,
            enter_callback: None,
            leave_callback: None,
        }
    }

    /// Sets the enter callback.
    #[must_use]
    pub fn on_enter(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.enter_callback = Some(Arc::new(callback));
        self
    }

    /// Sets the leave callback.
    #[must_use]
    pub fn on_leave(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.leave_callback = Some(Arc::new(callback));
        self
    }
}

impl fmt::Debug for ProximityTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProximityTrigger")
            .field("target", &self.target)
            .field("trigger_distance", &self.trigger_distance)
            .field("in_proximity", &self.in_proximity)
            .finish_non_exhaustive()
    }
}

impl Component for ProximityTrigger {
    const KIND: ComponentKind = ComponentKind::ProximityTrigger;
}

/// Multi-instance manager for [`ProximityTrigger`].
pub type ProximityTriggerComponentManager = MultiInstanceManager<ProximityTrigger>;
