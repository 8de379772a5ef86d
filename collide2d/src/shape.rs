//! Collision geometry.
//!
//! A [`PrimitiveShape`] is an immutable convex outline in local space plus a
//! world placement (position and rotation) that its owning collider rewrites
//! every tick. The narrow phase never looks at the shape variant; it only asks
//! for world-space vertices through [`SupportGeometry`].

use serde::{Deserialize, Serialize};

use crate::error::{CollisionError, Result};
use crate::math::{Transform2D, Vec2};

/// Segment count used when a circle is built without an explicit one.
pub const DEFAULT_CIRCLE_SEGMENTS: u32 = 16;

/// Turns smaller than this (in squared units) are treated as collinear when
/// checking convexity.
const COLLINEAR_TOLERANCE: f32 = 1e-6;

/// Allowed error, in radians, on the total turning of a convex outline.
const TURNING_TOLERANCE: f32 = 0.5;

/// Shape variants known to the collision core.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ShapeKind {
    Polygon,
    /// A circle approximated by a regular polygon inscribed in `radius`.
    Circle { radius: f32 },
}

/// World-space geometry consumed by the narrow phase.
pub trait SupportGeometry {
    /// Outline vertices in world space, counter-clockwise.
    fn world_vertices(&self) -> Vec<Vec2>;
}

/// Convex collision outline with a mutable world placement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ShapeRecord")]
pub struct PrimitiveShape {
    kind: ShapeKind,
    vertices: Vec<Vec2>,
    position: Vec2,
    rotation: f32,
}

impl PrimitiveShape {
    /// Build a polygon from local-space vertices.
    ///
    /// Vertices may be given in either winding; they are stored
    /// counter-clockwise. Fewer than three vertices or a zero-area outline is
    /// accepted here and simply never collides.
    pub fn polygon(vertices: Vec<Vec2>) -> Result<Self> {
        Self::from_outline(ShapeKind::Polygon, vertices)
    }

    /// Build a circle approximated by `segments` vertices.
    pub fn circle(radius: f32, segments: u32) -> Result<Self> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(CollisionError::InvalidDimensions(format!(
                "circle radius must be finite and non-negative, got {radius}"
            )));
        }
        if segments < 3 {
            return Err(CollisionError::InvalidDimensions(format!(
                "a circle needs at least 3 segments, got {segments}"
            )));
        }

        let step = std::f32::consts::TAU / segments as f32;
        let vertices = (0..segments)
            .map(|i| Vec2::from_angle(i as f32 * step) * radius)
            .collect();

        Self::from_outline(ShapeKind::Circle { radius }, vertices)
    }

    fn from_outline(kind: ShapeKind, mut vertices: Vec<Vec2>) -> Result<Self> {
        if vertices.is_empty() {
            return Err(CollisionError::EmptyShape);
        }
        if let Some(bad) = vertices.iter().find(|v| !v.is_finite()) {
            return Err(CollisionError::InvalidDimensions(format!(
                "vertex {bad:?} is not finite"
            )));
        }

        check_convex(&vertices)?;
        if signed_area(&vertices) < 0.0 {
            vertices.reverse();
        }

        Ok(Self {
            kind,
            vertices,
            position: Vec2::ZERO,
            rotation: 0.0,
        })
    }

    /// Same shape placed at `position`.
    #[must_use]
    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    /// Same shape rotated by `rotation` radians.
    #[must_use]
    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    /// Local-space outline, counter-clockwise.
    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn set_rotation(&mut self, rotation: f32) {
        self.rotation = rotation;
    }

    /// Copy world placement from a transform.
    pub fn set_transform(&mut self, transform: &Transform2D) {
        self.position = transform.position;
        self.rotation = transform.rotation;
    }

    /// Area of the outline (placement does not change it).
    pub fn area(&self) -> f32 {
        signed_area(&self.vertices).abs()
    }

    /// True when the outline cannot take part in an overlap test.
    pub fn is_degenerate(&self, epsilon: f32) -> bool {
        is_degenerate_outline(&self.vertices, epsilon)
    }

    /// World-space axis-aligned bounds as `(min, max)`. An outline without
    /// vertices collapses to its position.
    pub fn bounds(&self) -> (Vec2, Vec2) {
        let world = self.world_vertices();
        let Some(&first) = world.first() else {
            return (self.position, self.position);
        };
        world
            .iter()
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v)))
    }
}

impl SupportGeometry for PrimitiveShape {
    fn world_vertices(&self) -> Vec<Vec2> {
        let placement = Transform2D::new(self.position, self.rotation);
        self.vertices.iter().map(|&v| placement.apply(v)).collect()
    }
}

/// Builders for commonly used outlines.
pub struct Shapes;

impl Shapes {
    /// Rectangle with its minimum corner at `(x, y)` in local space.
    ///
    /// Sprite-sized colliders are usually built as
    /// `axis_aligned_rectangle(-w / 2, -h / 2, w, h)` so the outline is centered
    /// on the entity's position.
    pub fn axis_aligned_rectangle(x: f32, y: f32, width: f32, height: f32) -> Result<PrimitiveShape> {
        if !(width >= 0.0 && height >= 0.0) || !x.is_finite() || !y.is_finite() {
            return Err(CollisionError::InvalidDimensions(format!(
                "rectangle at ({x}, {y}) with size {width}x{height}"
            )));
        }
        PrimitiveShape::polygon(vec![
            Vec2::new(x, y),
            Vec2::new(x + width, y),
            Vec2::new(x + width, y + height),
            Vec2::new(x, y + height),
        ])
    }

    /// Rectangle centered on the local origin.
    pub fn centered_rectangle(width: f32, height: f32) -> Result<PrimitiveShape> {
        Self::axis_aligned_rectangle(-width * 0.5, -height * 0.5, width, height)
    }

    /// Regular polygon with `sides` vertices on a circle of `radius`.
    pub fn regular_polygon(sides: u32, radius: f32) -> Result<PrimitiveShape> {
        let circle = PrimitiveShape::circle(radius, sides)?;
        PrimitiveShape::polygon(circle.vertices)
    }

    pub fn circle(radius: f32) -> Result<PrimitiveShape> {
        PrimitiveShape::circle(radius, DEFAULT_CIRCLE_SEGMENTS)
    }

    pub fn circle_with_segments(radius: f32, segments: u32) -> Result<PrimitiveShape> {
        PrimitiveShape::circle(radius, segments)
    }
}

/// Shoelace area; positive for counter-clockwise outlines.
pub(crate) fn signed_area(vertices: &[Vec2]) -> f32 {
    let n = vertices.len();
    if n < 3 {
        return 0.0;
    }
    let twice: f32 = (0..n)
        .map(|i| vertices[i].cross(vertices[(i + 1) % n]))
        .sum();
    twice * 0.5
}

pub(crate) fn is_degenerate_outline(vertices: &[Vec2], epsilon: f32) -> bool {
    vertices.len() < 3 || signed_area(vertices).abs() <= epsilon * epsilon
}

fn check_convex(vertices: &[Vec2]) -> Result<()> {
    let n = vertices.len();
    if n < 4 {
        return Ok(());
    }

    // Edges leaving each vertex, skipping repeated points.
    let edges: Vec<(usize, Vec2)> = (0..n)
        .map(|i| (i, vertices[(i + 1) % n] - vertices[i]))
        .filter(|(_, e)| e.length_squared() > COLLINEAR_TOLERANCE)
        .collect();
    if edges.len() < 3 {
        return Ok(());
    }

    let mut winding = 0.0f32;
    let mut turning = 0.0f32;
    for k in 0..edges.len() {
        let (_, incoming) = edges[k];
        let (vertex, outgoing) = edges[(k + 1) % edges.len()];
        let turn = incoming.cross(outgoing);
        turning += turn.atan2(incoming.dot(outgoing));

        if turn.abs() <= COLLINEAR_TOLERANCE {
            continue;
        }
        if winding == 0.0 {
            winding = turn.signum();
        } else if turn.signum() != winding {
            return Err(CollisionError::NonConvexShape { vertex });
        }
    }

    // A simple convex outline turns exactly once; a star turns the same way
    // at every vertex but winds around more than once.
    if winding != 0.0 && (turning.abs() - std::f32::consts::TAU).abs() > TURNING_TOLERANCE {
        return Err(CollisionError::NonConvexShape { vertex: 0 });
    }
    Ok(())
}

/// Wire form of [`PrimitiveShape`]; decoded outlines are validated like built ones.
#[derive(Deserialize)]
struct ShapeRecord {
    kind: ShapeKind,
    vertices: Vec<Vec2>,
    position: Vec2,
    rotation: f32,
}

impl TryFrom<ShapeRecord> for PrimitiveShape {
    type Error = CollisionError;

    fn try_from(record: ShapeRecord) -> Result<Self> {
        Ok(Self::from_outline(record.kind, record.vertices)?
            .with_position(record.position)
            .with_rotation(record.rotation))
    }
}
