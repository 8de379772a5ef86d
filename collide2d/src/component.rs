//! Lifecycle hooks the entity framework drives once per tick.

use crate::transform::TransformProvider;

/// Relative slot a component's hooks run in within a tick.
///
/// Slots run in ascending order. Colliders sit in `PostTransform`: after every
/// transform for the tick is final and before anything is rendered or queried.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ComponentOrder {
    PreTransform,
    Transform,
    PostTransform,
    Render,
}

/// A component with per-tick lifecycle hooks.
pub trait Component {
    fn order(&self) -> ComponentOrder;

    /// Called once, after the owning entity's transform is first established.
    fn start(&mut self, transform: &dyn TransformProvider);

    /// Called once per tick, after the transform has been updated for the tick.
    fn update(&mut self, dt: f32, transform: &dyn TransformProvider);
}
