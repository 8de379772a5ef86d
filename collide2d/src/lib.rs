//! Collide2D - layer/mask filtered convex collision for 2D games.
//!
//! Colliders own a convex [`PrimitiveShape`], follow their entity's transform
//! once per tick and answer two questions: may these two colliders interact
//! ([`Collider::can_collide_with`]) and do their shapes overlap right now
//! ([`Collider::detect_collision`]). [`CollisionSystem`] runs both over a
//! [`World`] every tick.

pub mod collider;
pub mod component;
pub mod config;
pub mod error;
pub mod filter;
pub mod math;
pub mod narrow_phase;
pub mod shape;
pub mod system;
pub mod transform;
pub mod world;

pub use crate::collider::{Collider, ColliderState, PolygonCollider};
pub use crate::component::{Component, ComponentOrder};
pub use crate::config::CollisionConfig;
pub use crate::error::{CollisionError, Result};
pub use crate::filter::{can_collide, encode, CollisionBits};
pub use crate::math::{Transform2D, Vec2};
pub use crate::narrow_phase::{CollisionInformation, CONTACT_EPSILON};
pub use crate::shape::{PrimitiveShape, ShapeKind, Shapes, SupportGeometry};
pub use crate::system::{CollisionEvent, CollisionSystem};
pub use crate::transform::{world_transform, Transform, TransformProvider};
pub use crate::world::{EntityId, World};
