use anyhow::Result;
use collide2d::{PolygonCollider, PrimitiveShape, Shapes, Vec2};

pub const PLAYER: u8 = 0;
pub const ENEMY: u8 = 1;
pub const PLAYER_SHOT: u8 = 2;

/// What an entity is, for deciding how a collision event plays out.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Kind {
    Ship,
    Bullet,
    Asteroid(AsteroidSize),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AsteroidSize {
    Large,
    Medium,
    Small,
}

impl AsteroidSize {
    pub fn radius(self) -> f32 {
        match self {
            AsteroidSize::Large => 40.0,
            AsteroidSize::Medium => 20.0,
            AsteroidSize::Small => 10.0,
        }
    }

    pub fn speed(self) -> f32 {
        match self {
            AsteroidSize::Large => 50.0,
            AsteroidSize::Medium => 80.0,
            AsteroidSize::Small => 120.0,
        }
    }

    pub fn points(self) -> u32 {
        match self {
            AsteroidSize::Large => 20,
            AsteroidSize::Medium => 50,
            AsteroidSize::Small => 100,
        }
    }

    /// Size of the fragments this asteroid breaks into, if any.
    pub fn split(self) -> Option<AsteroidSize> {
        match self {
            AsteroidSize::Large => Some(AsteroidSize::Medium),
            AsteroidSize::Medium => Some(AsteroidSize::Small),
            AsteroidSize::Small => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Velocity {
    pub linear: Vec2,
    /// Radians per second.
    pub angular: f32,
}

/// Seconds left before a bullet expires.
#[derive(Clone, Copy, Debug)]
pub struct Lifetime(pub f32);

/// Nose points along +x at rotation 0.
fn ship_outline() -> Result<PrimitiveShape> {
    let size = 20.0;
    Ok(PrimitiveShape::polygon(vec![
        Vec2::new(size, 0.0),
        Vec2::new(-size * 0.5, -size * 0.6),
        Vec2::new(-size * 0.5, size * 0.6),
    ])?)
}

pub fn ship_collider() -> Result<PolygonCollider> {
    Ok(PolygonCollider::new(ship_outline()?)
        .with_layers(&[PLAYER])?
        .with_mask(&[ENEMY])?)
}

pub fn asteroid_collider(size: AsteroidSize, sides: u32) -> Result<PolygonCollider> {
    Ok(
        PolygonCollider::new(Shapes::regular_polygon(sides, size.radius())?)
            .with_layers(&[ENEMY])?
            .with_mask(&[PLAYER])?,
    )
}

pub fn bullet_collider() -> Result<PolygonCollider> {
    Ok(PolygonCollider::sensor(Shapes::centered_rectangle(6.0, 6.0)?)
        .with_layers(&[PLAYER_SHOT])?
        .with_mask(&[ENEMY])?)
}
