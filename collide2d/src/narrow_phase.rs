//! Narrow-phase overlap test between two convex outlines.
//!
//! Separating-axis test over the edge normals of both polygons. Axes are
//! visited in a fixed order (first shape's edges, then the second's, each in
//! outline order) so identical inputs always produce identical results,
//! including which axis wins a tie for the minimum overlap.
//!
//! Touching outlines count as colliding: an axis only separates the shapes
//! when the gap along it is larger than the configured epsilon.

use serde::{Deserialize, Serialize};

use crate::config::CollisionConfig;
use crate::math::Vec2;
use crate::shape::{is_degenerate_outline, SupportGeometry};

/// Default separation tolerance.
pub const CONTACT_EPSILON: f32 = 1e-4;

/// Result of a single overlap query.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CollisionInformation {
    collided: bool,
    depth: f32,
    normal: Vec2,
}

impl CollisionInformation {
    /// Non-colliding result.
    pub const NONE: Self = Self {
        collided: false,
        depth: 0.0,
        normal: Vec2::ZERO,
    };

    fn contact(depth: f32, normal: Vec2) -> Self {
        Self {
            collided: true,
            depth,
            normal,
        }
    }

    pub fn collision(&self) -> bool {
        self.collided
    }

    /// Penetration depth along [`normal`](Self::normal); zero when touching or
    /// not colliding.
    pub fn depth(&self) -> f32 {
        self.depth
    }

    /// Unit axis of minimum penetration, pointing from the first shape towards
    /// the second. Zero when not colliding.
    pub fn normal(&self) -> Vec2 {
        self.normal
    }

    /// Minimum translation that moves the second shape out of the first.
    pub fn mtv(&self) -> Vec2 {
        self.normal * self.depth
    }
}

impl Default for CollisionInformation {
    fn default() -> Self {
        Self::NONE
    }
}

/// Overlap test with the default configuration.
pub fn test_overlap(a: &dyn SupportGeometry, b: &dyn SupportGeometry) -> CollisionInformation {
    detect(a, b, &CollisionConfig::default())
}

/// Overlap test between two world-space outlines.
///
/// Degenerate outlines (fewer than three vertices or no area) never collide.
pub fn detect(
    a: &dyn SupportGeometry,
    b: &dyn SupportGeometry,
    config: &CollisionConfig,
) -> CollisionInformation {
    let va = a.world_vertices();
    let vb = b.world_vertices();
    overlap(&va, &vb, config)
}

fn overlap(va: &[Vec2], vb: &[Vec2], config: &CollisionConfig) -> CollisionInformation {
    let epsilon = config.epsilon;

    if is_degenerate_outline(va, epsilon) || is_degenerate_outline(vb, epsilon) {
        if config.warn_on_degenerate {
            log::warn!(
                "Degenerate shape in overlap test ({} vs {} vertices), reporting no collision",
                va.len(),
                vb.len()
            );
        }
        return CollisionInformation::NONE;
    }

    let mut best_depth = f32::INFINITY;
    let mut best_axis = Vec2::ZERO;

    for outline in [va, vb] {
        let n = outline.len();
        for i in 0..n {
            let edge = outline[(i + 1) % n] - outline[i];
            if edge.length_squared() <= epsilon * epsilon {
                // Repeated vertex.
                continue;
            }
            let axis = edge.perp().normalized();

            let (min_a, max_a) = project(va, axis);
            let (min_b, max_b) = project(vb, axis);

            // Push needed to move B out along +axis, or along -axis.
            let forward = max_a - min_b;
            let backward = max_b - min_a;
            let (depth, direction) = if forward <= backward {
                (forward, axis)
            } else {
                (backward, -axis)
            };

            if depth < -epsilon {
                return CollisionInformation::NONE;
            }
            if depth < best_depth {
                best_depth = depth;
                best_axis = direction;
            }
        }
    }

    CollisionInformation::contact(best_depth.max(0.0), best_axis)
}

fn project(vertices: &[Vec2], axis: Vec2) -> (f32, f32) {
    vertices
        .iter()
        .map(|v| v.dot(axis))
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p), hi.max(p))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{PrimitiveShape, Shapes};
    use approx::assert_relative_eq;

    fn unit_square_at(x: f32, y: f32) -> PrimitiveShape {
        Shapes::centered_rectangle(1.0, 1.0)
            .unwrap()
            .with_position(Vec2::new(x, y))
    }

    #[test]
    fn separated_squares_do_not_collide() {
        let info = test_overlap(&unit_square_at(0.0, 0.0), &unit_square_at(10.0, 10.0));
        assert!(!info.collision());
        assert_eq!(info, CollisionInformation::NONE);
    }

    #[test]
    fn intersecting_squares_collide() {
        let info = test_overlap(&unit_square_at(0.0, 0.0), &unit_square_at(0.5, 0.5));
        assert!(info.collision());
        assert_relative_eq!(info.depth(), 0.5, epsilon = 1e-6);
    }

    #[test]
    fn touching_squares_collide_with_zero_depth() {
        let info = test_overlap(&unit_square_at(0.0, 0.0), &unit_square_at(1.0, 0.0));
        assert!(info.collision());
        assert_eq!(info.depth(), 0.0);
        assert_eq!(info.normal(), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn normal_points_from_first_to_second() {
        let a = unit_square_at(0.0, 0.0);
        let b = unit_square_at(0.0, 0.8);

        let ab = test_overlap(&a, &b);
        let ba = test_overlap(&b, &a);

        assert_relative_eq!(ab.normal().y, 1.0, epsilon = 1e-6);
        assert_relative_eq!(ba.normal().y, -1.0, epsilon = 1e-6);
        assert_relative_eq!(ab.depth(), ba.depth(), epsilon = 1e-6);
        assert_relative_eq!(ab.mtv().y, 0.2, epsilon = 1e-5);
    }

    #[test]
    fn gap_inside_epsilon_is_resting_contact() {
        let a = unit_square_at(0.0, 0.0);
        let resting = test_overlap(&a, &unit_square_at(1.00005, 0.0));
        assert!(resting.collision());
        assert_eq!(resting.depth(), 0.0);

        let apart = test_overlap(&a, &unit_square_at(1.001, 0.0));
        assert!(!apart.collision());
    }

    #[test]
    fn epsilon_comes_from_config() {
        let a = unit_square_at(0.0, 0.0);
        let b = unit_square_at(1.05, 0.0);
        assert!(!detect(&a, &b, &CollisionConfig::default()).collision());
        assert!(detect(&a, &b, &CollisionConfig::default().with_epsilon(0.1)).collision());
    }

    #[test]
    fn bounding_boxes_overlapping_is_not_enough() {
        let diamond = Shapes::centered_rectangle(1.0, 1.0)
            .unwrap()
            .with_rotation(std::f32::consts::FRAC_PI_4)
            .with_position(Vec2::new(1.1, 1.1));
        let square = unit_square_at(0.0, 0.0);

        let (lo, _) = diamond.bounds();
        assert!(lo.x < 0.5 && lo.y < 0.5);
        assert!(!test_overlap(&square, &diamond).collision());
    }

    #[test]
    fn rotated_square_tip_reaches_into_square() {
        let square = unit_square_at(0.0, 0.0);
        let diamond = |x: f32| {
            Shapes::centered_rectangle(1.0, 1.0)
                .unwrap()
                .with_rotation(std::f32::consts::FRAC_PI_4)
                .with_position(Vec2::new(x, 0.0))
        };
        assert!(test_overlap(&square, &diamond(1.2)).collision());
        assert!(!test_overlap(&square, &diamond(1.3)).collision());
    }

    #[test]
    fn contained_shape_collides() {
        let big = Shapes::centered_rectangle(10.0, 10.0).unwrap();
        let small = unit_square_at(1.0, 1.0);
        let info = test_overlap(&big, &small);
        assert!(info.collision());
        assert!(info.depth() > 1.0);
    }

    #[test]
    fn triangle_against_circle() {
        let triangle = PrimitiveShape::polygon(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(0.0, 2.0),
        ])
        .unwrap();
        let near = Shapes::circle(0.5).unwrap().with_position(Vec2::new(1.2, 1.2));
        let far = Shapes::circle(0.5).unwrap().with_position(Vec2::new(2.0, 2.0));

        assert!(test_overlap(&triangle, &near).collision());
        assert!(!test_overlap(&triangle, &far).collision());
    }

    #[test]
    fn degenerate_shapes_never_collide() {
        let square = unit_square_at(0.0, 0.0);
        let segment = PrimitiveShape::polygon(vec![Vec2::new(-1.0, 0.0), Vec2::new(1.0, 0.0)]).unwrap();
        let flat = Shapes::axis_aligned_rectangle(-1.0, 0.0, 2.0, 0.0).unwrap();
        let config = CollisionConfig::default().with_degenerate_warnings(false);

        assert_eq!(detect(&square, &segment, &config), CollisionInformation::NONE);
        assert_eq!(detect(&flat, &square, &config), CollisionInformation::NONE);
    }

    #[test]
    fn custom_geometry_goes_through_the_same_test() {
        struct Outline(Vec<Vec2>);

        impl SupportGeometry for Outline {
            fn world_vertices(&self) -> Vec<Vec2> {
                self.0.clone()
            }
        }

        let wedge = Outline(vec![
            Vec2::new(0.4, -1.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(0.4, 1.0),
        ]);
        assert!(test_overlap(&unit_square_at(0.0, 0.0), &wedge).collision());
        assert!(!test_overlap(&unit_square_at(-2.0, 0.0), &wedge).collision());
    }

    #[test]
    fn repeated_queries_are_identical() {
        let a = Shapes::regular_polygon(7, 1.0).unwrap().with_rotation(0.3);
        let b = Shapes::circle(0.75)
            .unwrap()
            .with_position(Vec2::new(1.3, -0.4));
        let first = test_overlap(&a, &b);
        for _ in 0..10 {
            assert_eq!(test_overlap(&a, &b), first);
        }
        assert_eq!(test_overlap(&b, &a).collision(), first.collision());
    }
}
