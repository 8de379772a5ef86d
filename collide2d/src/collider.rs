//! Colliders bind a collision shape to an entity.
//!
//! A collider owns exactly one [`PrimitiveShape`] and is the only writer of
//! its placement: `start` and `update` copy the entity's transform into the
//! shape, so queries issued later in the same tick see current geometry.
//!
//! Broad and narrow phase are separate calls. [`Collider::detect_collision`]
//! does not look at layers or masks; gate it with
//! [`Collider::can_collide_with`] first.

use crate::component::{Component, ComponentOrder};
use crate::config::CollisionConfig;
use crate::error::{CollisionError, Result};
use crate::filter::{self, CollisionBits};
use crate::narrow_phase::{self, CollisionInformation};
use crate::shape::PrimitiveShape;
use crate::transform::TransformProvider;

/// Lifecycle position of a collider.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColliderState {
    /// Constructed; the shape has not been placed yet.
    Uninitialized,
    /// `start` ran.
    Started,
    /// At least one `update` ran.
    Updated,
}

/// Collision capability shared by every collider variant.
pub trait Collider {
    fn shape(&self) -> &PrimitiveShape;

    /// Layers this collider is on.
    fn layers(&self) -> CollisionBits;

    /// Layers this collider watches.
    fn mask(&self) -> CollisionBits;

    /// Detection-only collider. Informational: the overlap test ignores it.
    fn passive(&self) -> bool;

    fn set_layer(&mut self, index: u8, active: bool) -> Result<()>;

    fn set_mask(&mut self, index: u8, active: bool) -> Result<()>;

    fn is_on_layer(&self, index: u8) -> bool {
        self.layers().contains(index)
    }

    fn has_mask(&self, index: u8) -> bool {
        self.mask().contains(index)
    }

    /// Broad-phase test. Symmetric: `a.can_collide_with(b) == b.can_collide_with(a)`.
    fn can_collide_with(&self, other: &dyn Collider) -> bool {
        filter::can_collide(self.layers(), self.mask(), other.layers(), other.mask())
    }

    /// Narrow-phase test between the two current shapes.
    fn detect_collision(&self, other: &dyn Collider) -> CollisionInformation {
        narrow_phase::test_overlap(self.shape(), other.shape())
    }

    /// [`detect_collision`](Self::detect_collision) with explicit tolerances.
    fn detect_collision_with(
        &self,
        other: &dyn Collider,
        config: &CollisionConfig,
    ) -> CollisionInformation {
        narrow_phase::detect(self.shape(), other.shape(), config)
    }
}

/// Collider backed by a convex polygon outline.
#[derive(Clone, Debug)]
pub struct PolygonCollider {
    shape: PrimitiveShape,
    layers: CollisionBits,
    mask: CollisionBits,
    passive: bool,
    state: ColliderState,
}

impl PolygonCollider {
    /// Active collider on no layers, watching nothing.
    pub fn new(shape: PrimitiveShape) -> Self {
        Self::with_passive(shape, false)
    }

    /// Passive (detection-only) collider.
    pub fn sensor(shape: PrimitiveShape) -> Self {
        Self::with_passive(shape, true)
    }

    pub fn with_passive(shape: PrimitiveShape, passive: bool) -> Self {
        Self {
            shape,
            layers: CollisionBits::EMPTY,
            mask: CollisionBits::EMPTY,
            passive,
            state: ColliderState::Uninitialized,
        }
    }

    /// Construct from a shape that may be missing, failing immediately if it is.
    pub fn try_new(shape: Option<PrimitiveShape>, passive: bool) -> Result<Self> {
        let shape = shape.ok_or(CollisionError::MissingShape)?;
        Ok(Self::with_passive(shape, passive))
    }

    /// Add every listed layer. Either all indices are applied or, on an
    /// out-of-range index, none are.
    pub fn with_layers(mut self, indices: &[u8]) -> Result<Self> {
        self.layers = self.layers | CollisionBits::from_indices(indices)?;
        Ok(self)
    }

    /// Watch every listed layer, with the same all-or-nothing rule as
    /// [`with_layers`](Self::with_layers).
    pub fn with_mask(mut self, indices: &[u8]) -> Result<Self> {
        self.mask = self.mask | CollisionBits::from_indices(indices)?;
        Ok(self)
    }

    /// Replace the bound shape. The new shape keeps the current placement so
    /// queries before the next tick do not see it at the origin.
    pub fn set_shape(&mut self, mut shape: PrimitiveShape) {
        shape.set_position(self.shape.position());
        shape.set_rotation(self.shape.rotation());
        self.shape = shape;
        log::debug!("Collider shape replaced ({:?})", self.shape.kind());
    }

    /// [`set_shape`](Self::set_shape) for a shape that may be missing. The
    /// current shape is kept on error.
    pub fn try_set_shape(&mut self, shape: Option<PrimitiveShape>) -> Result<()> {
        let shape = shape.ok_or(CollisionError::MissingShape)?;
        self.set_shape(shape);
        Ok(())
    }

    pub fn state(&self) -> ColliderState {
        self.state
    }

    fn sync(&mut self, transform: &dyn TransformProvider) {
        self.shape.set_position(transform.position());
        self.shape.set_rotation(transform.rotation());
    }
}

impl Collider for PolygonCollider {
    fn shape(&self) -> &PrimitiveShape {
        &self.shape
    }

    fn layers(&self) -> CollisionBits {
        self.layers
    }

    fn mask(&self) -> CollisionBits {
        self.mask
    }

    fn passive(&self) -> bool {
        self.passive
    }

    fn set_layer(&mut self, index: u8, active: bool) -> Result<()> {
        self.layers.set(index, active)
    }

    fn set_mask(&mut self, index: u8, active: bool) -> Result<()> {
        self.mask.set(index, active)
    }
}

impl Component for PolygonCollider {
    fn order(&self) -> ComponentOrder {
        ComponentOrder::PostTransform
    }

    fn start(&mut self, transform: &dyn TransformProvider) {
        self.sync(transform);
        self.state = ColliderState::Started;
    }

    fn update(&mut self, _dt: f32, transform: &dyn TransformProvider) {
        if self.state == ColliderState::Uninitialized {
            log::debug!("Collider updated before start, starting it now");
        }
        self.sync(transform);
        self.state = ColliderState::Updated;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Transform2D, Vec2};
    use crate::shape::Shapes;

    fn square() -> PrimitiveShape {
        Shapes::centered_rectangle(1.0, 1.0).unwrap()
    }

    #[test]
    fn missing_shape_fails_fast() {
        for passive in [false, true] {
            assert_eq!(
                PolygonCollider::try_new(None, passive).unwrap_err(),
                CollisionError::MissingShape
            );
        }
    }

    #[test]
    fn missing_replacement_shape_keeps_the_old_one() {
        let mut collider = PolygonCollider::new(square());
        for _ in 0..3 {
            assert_eq!(
                collider.try_set_shape(None),
                Err(CollisionError::MissingShape)
            );
        }
        assert_eq!(collider.shape().vertices(), square().vertices());
    }

    #[test]
    fn starts_empty_and_uninitialized() {
        let collider = PolygonCollider::new(square());
        assert_eq!(collider.layers(), CollisionBits::EMPTY);
        assert_eq!(collider.mask(), CollisionBits::EMPTY);
        assert!(!collider.passive());
        assert_eq!(collider.state(), ColliderState::Uninitialized);
        assert!(PolygonCollider::sensor(square()).passive());
    }

    #[test]
    fn layer_and_mask_round_trip() {
        let mut collider = PolygonCollider::new(square());
        for i in 0..CollisionBits::WIDTH {
            collider.set_layer(i, true).unwrap();
            assert!(collider.is_on_layer(i));
            collider.set_layer(i, false).unwrap();
            assert!(!collider.is_on_layer(i));

            collider.set_mask(i, true).unwrap();
            assert!(collider.has_mask(i));
            collider.set_mask(i, false).unwrap();
            assert!(!collider.has_mask(i));
        }
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mut collider = PolygonCollider::new(square());
        assert_eq!(
            collider.set_layer(16, true),
            Err(CollisionError::LayerOutOfRange { index: 16 })
        );
        assert!(collider.set_mask(200, true).is_err());
        assert!(!collider.is_on_layer(0));
        assert!(collider.mask().is_empty());
    }

    #[test]
    fn builders_match_repeated_setters() {
        let built = PolygonCollider::new(square())
            .with_layers(&[1, 4])
            .unwrap()
            .with_mask(&[0, 15])
            .unwrap();

        let mut manual = PolygonCollider::new(square());
        manual.set_layer(1, true).unwrap();
        manual.set_layer(4, true).unwrap();
        manual.set_mask(0, true).unwrap();
        manual.set_mask(15, true).unwrap();

        assert_eq!(built.layers(), manual.layers());
        assert_eq!(built.mask(), manual.mask());
    }

    #[test]
    fn builder_with_bad_index_fails() {
        assert!(PolygonCollider::new(square()).with_layers(&[2, 16]).is_err());
        assert!(PolygonCollider::new(square()).with_mask(&[99]).is_err());
    }

    #[test]
    fn can_collide_with_is_symmetric() {
        let player = PolygonCollider::new(square()).with_layers(&[0]).unwrap();
        let bullet = PolygonCollider::sensor(square())
            .with_layers(&[2])
            .unwrap()
            .with_mask(&[0])
            .unwrap();
        let scenery = PolygonCollider::new(square()).with_layers(&[5]).unwrap();

        assert!(player.can_collide_with(&bullet));
        assert!(bullet.can_collide_with(&player));
        assert!(!player.can_collide_with(&scenery));
        assert!(!scenery.can_collide_with(&player));
    }

    #[test]
    fn start_and_update_place_the_shape() {
        let mut collider = PolygonCollider::new(square());
        collider.start(&Vec2::new(2.0, 3.0));
        assert_eq!(collider.state(), ColliderState::Started);
        assert_eq!(collider.shape().position(), Vec2::new(2.0, 3.0));

        let moved = Transform2D::new(Vec2::new(-7.25, 0.125), 0.5);
        collider.update(1.0 / 60.0, &moved);
        assert_eq!(collider.state(), ColliderState::Updated);
        assert_eq!(collider.shape().position(), moved.position);
        assert_eq!(collider.shape().rotation(), 0.5);
    }

    #[test]
    fn update_before_start_still_places_the_shape() {
        let mut collider = PolygonCollider::new(square());
        collider.update(0.016, &Vec2::new(1.0, 1.0));
        assert_eq!(collider.state(), ColliderState::Updated);
        assert_eq!(collider.shape().position(), Vec2::new(1.0, 1.0));
    }

    #[test]
    fn replaced_shape_keeps_placement() {
        let mut collider = PolygonCollider::new(square());
        collider.start(&Vec2::new(5.0, 5.0));
        collider.set_shape(Shapes::circle(2.0).unwrap());
        assert_eq!(collider.shape().position(), Vec2::new(5.0, 5.0));
        assert!(collider.shape().area() > 10.0);
    }

    #[test]
    fn detect_collision_ignores_layers() {
        let mut a = PolygonCollider::new(square());
        let mut b = PolygonCollider::new(square());
        a.start(&Vec2::ZERO);
        b.start(&Vec2::new(0.5, 0.5));

        assert!(!a.can_collide_with(&b));
        assert!(a.detect_collision(&b).collision());
    }

    #[test]
    fn passive_flag_does_not_change_the_result() {
        let mut active = PolygonCollider::new(square());
        let mut sensor = PolygonCollider::sensor(square());
        let mut twin = PolygonCollider::new(square());
        active.start(&Vec2::ZERO);
        sensor.start(&Vec2::new(0.25, 0.0));
        twin.start(&Vec2::new(0.25, 0.0));

        assert_eq!(active.detect_collision(&sensor), active.detect_collision(&twin));
    }

    #[test]
    fn collider_runs_after_transforms() {
        assert_eq!(
            PolygonCollider::new(square()).order(),
            ComponentOrder::PostTransform
        );
    }
}
