use thiserror::Error;

use crate::filter::CollisionBits;

/// Errors surfaced synchronously by the collision core.
///
/// Per-tick geometric anomalies are not represented here: the narrow phase
/// absorbs them into a non-colliding result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CollisionError {
    #[error("the shape of a collider shall not be missing")]
    MissingShape,

    #[error("collision layer index {index} is outside the supported range 0..{}", CollisionBits::WIDTH)]
    LayerOutOfRange { index: u8 },

    #[error("a shape needs at least one vertex")]
    EmptyShape,

    #[error("shape vertices do not describe a convex polygon (winding changes at vertex {vertex})")]
    NonConvexShape { vertex: usize },

    #[error("invalid shape dimensions: {0}")]
    InvalidDimensions(String),
}

pub type Result<T> = std::result::Result<T, CollisionError>;
