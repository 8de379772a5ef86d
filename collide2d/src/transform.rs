//! Transforms as seen by the collision core.
//!
//! The core only ever reads a world-space placement through
//! [`TransformProvider`]; how that placement is stored is up to the entity
//! framework. [`Transform`] plus [`world_transform`] is the default used with
//! [`World`](crate::world::World).

use crate::math::{Transform2D, Vec2};
use crate::world::{EntityId, World};

/// Parent chains longer than this are treated as cycles.
const MAX_HIERARCHY_DEPTH: usize = 64;

/// Read-only source of an entity's world placement.
pub trait TransformProvider {
    /// World-space position.
    fn position(&self) -> Vec2;

    /// World-space rotation in radians.
    fn rotation(&self) -> f32 {
        0.0
    }
}

impl TransformProvider for Transform2D {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn rotation(&self) -> f32 {
        self.rotation
    }
}

impl TransformProvider for Vec2 {
    fn position(&self) -> Vec2 {
        *self
    }
}

/// Transform component - local position and rotation, optionally relative to
/// a parent entity.
#[derive(Clone, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec2,
    pub rotation: f32,
    /// Parent entity (for hierarchy). None means this is a root entity.
    pub parent: Option<EntityId>,
}

impl Transform {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            rotation: 0.0,
            parent: None,
        }
    }

    /// Set the parent entity (for hierarchy).
    pub fn with_parent(mut self, parent: EntityId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    /// Move by `delta` in the parent's space.
    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }
}

/// A root transform is its own world placement.
impl TransformProvider for Transform {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn rotation(&self) -> f32 {
        self.rotation
    }
}

/// World placement of `entity`, accumulating parent offsets and rotations.
///
/// Returns `None` if the entity has no `Transform`. A missing parent
/// transform ends the chain; a chain deeper than the hierarchy limit is cut
/// and logged.
pub fn world_transform(world: &World, entity: EntityId) -> Option<Transform2D> {
    let own = world.get::<Transform>(entity)?;
    let mut position = own.position;
    let mut rotation = own.rotation;

    let mut parent = own.parent;
    let mut depth = 0;
    while let Some(id) = parent {
        if depth == MAX_HIERARCHY_DEPTH {
            log::warn!("Transform hierarchy of {entity} exceeds {MAX_HIERARCHY_DEPTH} levels, ignoring the rest");
            break;
        }
        let Some(p) = world.get::<Transform>(id) else {
            break;
        };
        position = p.position + position;
        rotation += p.rotation;
        parent = p.parent;
        depth += 1;
    }

    Some(Transform2D::new(position, rotation))
}
