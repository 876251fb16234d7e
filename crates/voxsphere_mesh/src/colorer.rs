//! Checkerboard colouring of voxels.

use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_EVEN_COLOR, DEFAULT_ODD_COLOR};
use crate::lattice::LatticeCell;

/// How a voxel's parity is decided.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParityRule {
    /// `(x + y + z) % 2 == 0` on the raw float coordinates.
    ///
    /// Only a true checkerboard when the coordinate sums land on integers;
    /// for other steps the pattern is effectively arbitrary but stable.
    #[default]
    CoordinateSum,
    /// Parity of the integer lattice indices. Always a checkerboard.
    LatticeIndex,
}

/// Picks one of two colours per voxel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CheckerboardColorer {
    /// Colour for even parity.
    pub even: [f32; 3],
    /// Colour for odd parity.
    pub odd: [f32; 3],
    /// Parity rule.
    pub parity: ParityRule,
}

impl Default for CheckerboardColorer {
    fn default() -> Self {
        Self::new(DEFAULT_EVEN_COLOR, DEFAULT_ODD_COLOR, ParityRule::default())
    }
}

impl CheckerboardColorer {
    /// Creates a colorer.
    #[must_use]
    pub const fn new(even: [f32; 3], odd: [f32; 3], parity: ParityRule) -> Self {
        Self { even, odd, parity }
    }

    /// True if the voxel at `position` / `cell` has even parity.
    #[inline]
    #[must_use]
    pub fn is_even(&self, position: [f64; 3], cell: LatticeCell) -> bool {
        match self.parity {
            // Truncated remainder: negative sums give -0.0, which compares
            // equal to 0.0
            ParityRule::CoordinateSum => (position[0] + position[1] + position[2]) % 2.0 == 0.0,
            ParityRule::LatticeIndex => cell.index_sum() % 2 == 0,
        }
    }

    /// Colour of the voxel at `position` / `cell`.
    #[inline]
    #[must_use]
    pub fn color_at(&self, position: [f64; 3], cell: LatticeCell) -> [f32; 3] {
        if self.is_even(position, cell) {
            self.even
        } else {
            self.odd
        }
    }
}
