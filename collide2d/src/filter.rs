//! Layer/mask collision filtering.
//!
//! Every collider carries two 16-bit sets:
//! - the **layer** bits say which groups the collider belongs to,
//! - the **mask** bits say which groups it wants to notice.
//!
//! Two colliders are eligible for a narrow-phase test when either side's mask
//! sees the other side's layer. The bit test is one-directional but the
//! resulting relation is symmetric, so a pairwise sweep only needs to look at
//! each unordered pair once.
//!
//! ```
//! use collide2d::filter::{can_collide, CollisionBits};
//!
//! // Layer 0 = player, layer 1 = enemy projectiles.
//! let player = (CollisionBits::from_indices(&[0]).unwrap(), CollisionBits::EMPTY);
//! let bullet = (CollisionBits::from_indices(&[1]).unwrap(), CollisionBits::from_indices(&[0]).unwrap());
//!
//! assert!(can_collide(player.0, player.1, bullet.0, bullet.1));
//! assert!(can_collide(bullet.0, bullet.1, player.0, player.1));
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CollisionError, Result};

/// Returns the bit for `index` (`1 << index`).
///
/// Indices at or above [`CollisionBits::WIDTH`] are rejected instead of being
/// shifted out of the 16-bit range.
pub fn encode(index: u8) -> Result<u16> {
    if index >= CollisionBits::WIDTH {
        return Err(CollisionError::LayerOutOfRange { index });
    }
    Ok(1u16 << index)
}

/// Broad-phase eligibility test between two layer/mask pairs.
#[inline]
pub fn can_collide(
    a_layer: CollisionBits,
    a_mask: CollisionBits,
    b_layer: CollisionBits,
    b_mask: CollisionBits,
) -> bool {
    a_layer.intersects(b_mask) || a_mask.intersects(b_layer)
}

/// Fixed-width set of collision layer indices.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollisionBits {
    bits: u16,
}

impl CollisionBits {
    /// Number of addressable layers.
    pub const WIDTH: u8 = 16;

    pub const EMPTY: Self = Self { bits: 0 };
    pub const ALL: Self = Self { bits: u16::MAX };

    pub const fn from_bits(bits: u16) -> Self {
        Self { bits }
    }

    /// Builds a set with every listed index switched on.
    pub fn from_indices(indices: &[u8]) -> Result<Self> {
        let mut set = Self::EMPTY;
        for &index in indices {
            set.set(index, true)?;
        }
        Ok(set)
    }

    pub const fn bits(self) -> u16 {
        self.bits
    }

    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// Sets or clears a single index. On error the set is left untouched.
    pub fn set(&mut self, index: u8, active: bool) -> Result<()> {
        let bit = encode(index)?;
        if active {
            self.bits |= bit;
        } else {
            self.bits &= !bit;
        }
        Ok(())
    }

    /// True if `index` is present. Out-of-range indices are never present.
    pub fn contains(self, index: u8) -> bool {
        encode(index).map_or(false, |bit| self.bits & bit != 0)
    }

    #[inline]
    pub const fn intersects(self, other: Self) -> bool {
        self.bits & other.bits != 0
    }

    /// Set indices in ascending order.
    pub fn iter(self) -> impl Iterator<Item = u8> {
        (0..Self::WIDTH).filter(move |&i| self.bits & (1 << i) != 0)
    }
}

impl std::ops::BitOr for CollisionBits {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::from_bits(self.bits | rhs.bits)
    }
}

impl std::ops::BitAnd for CollisionBits {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::from_bits(self.bits & rhs.bits)
    }
}

impl From<u16> for CollisionBits {
    fn from(bits: u16) -> Self {
        Self::from_bits(bits)
    }
}
