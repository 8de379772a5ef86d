//! Per-tick collision driver.
//!
//! Runs in the `PostTransform` slot of a tick:
//! 1. [`CollisionSystem::sync`] places every collider's shape at its entity's
//!    current world transform (`start` on first sight, `update` afterwards).
//! 2. [`CollisionSystem::detect`] walks every unordered pair once, gates it
//!    with the layer/mask filter and runs the narrow phase on survivors.
//!
//! Both passes visit entities in ascending `EntityId` order, so a tick over
//! the same world always yields the same events in the same order.

use crossbeam_channel::{Receiver, Sender};

use crate::collider::{Collider, ColliderState, PolygonCollider};
use crate::component::Component;
use crate::config::CollisionConfig;
use crate::narrow_phase::CollisionInformation;
use crate::transform::world_transform;
use crate::world::{EntityId, World};

/// Overlap between two eligible colliders found during a tick.
///
/// `a` is always the lower id; `info.normal()` points from `a` towards `b`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CollisionEvent {
    /// Both colliders are active.
    Contact {
        a: EntityId,
        b: EntityId,
        info: CollisionInformation,
    },
    /// At least one collider is passive.
    Trigger {
        a: EntityId,
        b: EntityId,
        info: CollisionInformation,
    },
}

impl CollisionEvent {
    pub fn entities(&self) -> (EntityId, EntityId) {
        match *self {
            CollisionEvent::Contact { a, b, .. } | CollisionEvent::Trigger { a, b, .. } => (a, b),
        }
    }

    pub fn info(&self) -> CollisionInformation {
        match *self {
            CollisionEvent::Contact { info, .. } | CollisionEvent::Trigger { info, .. } => info,
        }
    }

    pub fn is_trigger(&self) -> bool {
        matches!(self, CollisionEvent::Trigger { .. })
    }

    pub fn involves(&self, entity: EntityId) -> bool {
        let (a, b) = self.entities();
        a == entity || b == entity
    }

    /// The entity paired with `entity`, if `entity` takes part in this event.
    pub fn other(&self, entity: EntityId) -> Option<EntityId> {
        let (a, b) = self.entities();
        if a == entity {
            Some(b)
        } else if b == entity {
            Some(a)
        } else {
            None
        }
    }
}

/// Optional callback for collision events.
pub type CollisionEventCallback = Box<dyn Fn(&CollisionEvent) + Send + Sync>;

pub struct CollisionSystem {
    config: CollisionConfig,
    tick: u64,

    // Collected events for the frame
    pending_events: Vec<CollisionEvent>,
    callbacks: Vec<CollisionEventCallback>,
    subscribers: Vec<Sender<CollisionEvent>>,
}

impl Default for CollisionSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl CollisionSystem {
    pub fn new() -> Self {
        Self::with_config(CollisionConfig::default())
    }

    pub fn with_config(config: CollisionConfig) -> Self {
        Self {
            config,
            tick: 0,
            pending_events: Vec::new(),
            callbacks: Vec::new(),
            subscribers: Vec::new(),
        }
    }

    pub fn config(&self) -> &CollisionConfig {
        &self.config
    }

    /// Number of completed [`step`](Self::step) calls.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn on_event<F>(&mut self, callback: F)
    where
        F: Fn(&CollisionEvent) + Send + Sync + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// Channel receiving a copy of every event produced by `step`.
    ///
    /// Dropping the receiver unsubscribes it on the next delivery.
    pub fn subscribe(&mut self) -> Receiver<CollisionEvent> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Place every collider's shape at its entity's current world transform.
    ///
    /// Must run after transforms are final for the tick. Returns the number of
    /// colliders placed; colliders whose entity has no transform are skipped
    /// and keep their previous placement.
    pub fn sync(&self, world: &mut World, dt: f32) -> usize {
        let mut placed = 0;

        for entity in world.entities_with::<PolygonCollider>() {
            let Some(transform) = world_transform(world, entity) else {
                log::warn!("Collider on {entity} has no transform, skipping sync");
                continue;
            };
            let Some(collider) = world.get_mut::<PolygonCollider>(entity) else {
                continue;
            };

            if collider.state() == ColliderState::Uninitialized {
                collider.start(&transform);
                log::debug!("Collider on {entity} started at {:?}", transform.position);
            } else {
                collider.update(dt, &transform);
            }
            placed += 1;
        }

        placed
    }

    /// Every eligible, overlapping pair of colliders in the world.
    ///
    /// Pairs are reported once, lower id first. Passive pairs are reported as
    /// triggers, or skipped when triggers are disabled in the config.
    pub fn detect(&self, world: &World) -> Vec<CollisionEvent> {
        let colliders = placed_colliders(world);
        let mut events = Vec::new();
        let mut candidates = 0usize;

        for (i, &(a, collider_a)) in colliders.iter().enumerate() {
            for &(b, collider_b) in &colliders[i + 1..] {
                if !collider_a.can_collide_with(collider_b) {
                    continue;
                }

                let trigger = collider_a.passive() || collider_b.passive();
                if trigger && !self.config.report_triggers {
                    continue;
                }

                candidates += 1;
                let info = collider_a.detect_collision_with(collider_b, &self.config);
                log::trace!("Pair {a}/{b}: {info:?}");
                if !info.collision() {
                    continue;
                }

                events.push(if trigger {
                    CollisionEvent::Trigger { a, b, info }
                } else {
                    CollisionEvent::Contact { a, b, info }
                });
            }
        }

        log::debug!(
            "{} colliders, {} candidate pairs, {} overlaps",
            colliders.len(),
            candidates,
            events.len()
        );
        events
    }

    /// Eligible colliders currently overlapping `entity`, in id order.
    ///
    /// The normal in each result points from `entity` towards the other one.
    pub fn collisions_with(
        &self,
        world: &World,
        entity: EntityId,
    ) -> Vec<(EntityId, CollisionInformation)> {
        let Some(subject) = world
            .get::<PolygonCollider>(entity)
            .filter(|c| c.state() != ColliderState::Uninitialized)
        else {
            return Vec::new();
        };

        placed_colliders(world)
            .into_iter()
            .filter(|&(other, collider)| other != entity && subject.can_collide_with(collider))
            .map(|(other, collider)| (other, subject.detect_collision_with(collider, &self.config)))
            .filter(|(_, info)| info.collision())
            .collect()
    }

    /// Sync then detect, queueing and publishing the resulting events.
    /// Returns the number of events produced this tick.
    pub fn step(&mut self, world: &mut World, dt: f32) -> usize {
        self.sync(world, dt);
        let events = self.detect(world);
        let count = events.len();

        for event in events {
            self.push_event(event);
        }
        self.tick += 1;
        count
    }

    /// Drain collision events collected since the last call.
    pub fn drain_events(&mut self) -> Vec<CollisionEvent> {
        std::mem::take(&mut self.pending_events)
    }

    fn push_event(&mut self, event: CollisionEvent) {
        for cb in &self.callbacks {
            cb(&event);
        }
        self.subscribers.retain(|tx| tx.send(event).is_ok());
        self.pending_events.push(event);
    }
}

/// Colliders that `sync` has placed at least once, in id order. A collider
/// still `Uninitialized` has no meaningful placement and is never queried.
fn placed_colliders(world: &World) -> Vec<(EntityId, &PolygonCollider)> {
    world
        .query::<PolygonCollider>()
        .into_iter()
        .filter(|(_, collider)| collider.state() != ColliderState::Uninitialized)
        .collect()
}
