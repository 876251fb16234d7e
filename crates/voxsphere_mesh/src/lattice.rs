//! # Sampling Lattice
//!
//! Each axis is swept across `[-radius, radius]` in steps of `detail`.
//! Floating rounding means the outermost value rarely lands on `radius`
//! exactly, and a point nominally on the boundary may fall on either side of
//! it. That jitter is accepted behaviour.
//!
//! All three axes visit the same values, so the sequence is built once and
//! shared. Worker threads index into it instead of re-stepping, which keeps
//! every slab bit-identical to the sequential sweep.

use serde::{Deserialize, Serialize};

/// Upper estimate of values on one axis for the given sphere.
///
/// Both ends of `[-radius, radius]` plus one value of slack for
/// accumulation drift.
#[must_use]
pub fn estimated_axis_len(radius: f64, detail: f64) -> u64 {
    // f64 -> u64 casts saturate
    ((2.0 * radius / detail).floor() as u64).saturating_add(2)
}

/// Integer address of a lattice point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LatticeCell {
    /// Index along X.
    pub x: u32,
    /// Index along Y.
    pub y: u32,
    /// Index along Z.
    pub z: u32,
}

impl LatticeCell {
    /// Creates a new cell address.
    #[inline]
    #[must_use]
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// Steps one cell in `direction` (each component -1, 0 or 1).
    ///
    /// Returns `None` when the step would leave the non-negative range.
    #[inline]
    #[must_use]
    pub fn offset(self, direction: [i32; 3]) -> Option<Self> {
        Some(Self {
            x: self.x.checked_add_signed(direction[0])?,
            y: self.y.checked_add_signed(direction[1])?,
            z: self.z.checked_add_signed(direction[2])?,
        })
    }

    /// Sum of the indices, used by the lattice-index parity rule.
    #[inline]
    #[must_use]
    pub const fn index_sum(self) -> u64 {
        self.x as u64 + self.y as u64 + self.z as u64
    }
}

/// Where the lattice is pinned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LatticeAnchor {
    /// Values are whole multiples of `detail`, so the origin is always
    /// sampled and the lattice is symmetric about it.
    #[default]
    Origin,
    /// Values accumulate from `-radius` in steps of `detail`, one `+=` at a
    /// time. The origin is only sampled when `radius` is a multiple of
    /// `detail`.
    NegativeRadius,
}

/// The coordinate sequence shared by all three axes.
#[derive(Clone, Debug, PartialEq)]
pub struct LatticeAxis {
    values: Vec<f64>,
    radius: f64,
    detail: f64,
}

impl LatticeAxis {
    /// Builds the axis for a sphere of `radius` sampled every `detail`.
    ///
    /// Callers validate `radius` and `detail` first. With the
    /// `NegativeRadius` anchor, a step too small to change the running value
    /// ends the sweep instead of spinning.
    #[must_use]
    pub fn new(radius: f64, detail: f64, anchor: LatticeAnchor) -> Self {
        let values = match anchor {
            LatticeAnchor::Origin => Self::origin_values(radius, detail),
            LatticeAnchor::NegativeRadius => Self::accumulated_values(radius, detail),
        };
        Self { values, radius, detail }
    }

    fn origin_values(radius: f64, detail: f64) -> Vec<f64> {
        // Largest n with n * detail <= radius; the quotient can be off by one
        // either way after rounding
        let cap = i64::from(u32::MAX / 2);
        let mut steps = (radius / detail).floor().min(cap as f64) as i64;
        while steps < cap && ((steps + 1) as f64) * detail <= radius {
            steps += 1;
        }
        while steps > 0 && (steps as f64) * detail > radius {
            steps -= 1;
        }
        (-steps..=steps).map(|k| k as f64 * detail).collect()
    }

    fn accumulated_values(radius: f64, detail: f64) -> Vec<f64> {
        let capacity = usize::try_from(estimated_axis_len(radius, detail)).unwrap_or(0);
        let mut values = Vec::with_capacity(capacity.min(1 << 20));

        let mut value = -radius;
        while value <= radius {
            values.push(value);
            let next = value + detail;
            if next <= value {
                break;
            }
            value = next;
        }
        values
    }

    /// Number of values on the axis.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if the sweep visits nothing.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Coordinate at `index`.
    #[inline]
    #[must_use]
    pub fn value(&self, index: u32) -> f64 {
        self.values[index as usize]
    }

    /// All coordinates in sweep order.
    #[inline]
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Radius the axis was built for.
    #[inline]
    #[must_use]
    pub const fn radius(&self) -> f64 {
        self.radius
    }

    /// Step the axis was built with.
    #[inline]
    #[must_use]
    pub const fn detail(&self) -> f64 {
        self.detail
    }

    /// True if `cell` addresses a point on this lattice.
    #[inline]
    #[must_use]
    pub fn contains(&self, cell: LatticeCell) -> bool {
        let len = self.values.len();
        (cell.x as usize) < len && (cell.y as usize) < len && (cell.z as usize) < len
    }

    /// World position of a cell.
    #[inline]
    #[must_use]
    pub fn position(&self, cell: LatticeCell) -> [f64; 3] {
        [self.value(cell.x), self.value(cell.y), self.value(cell.z)]
    }

    /// Total candidate points of the triple sweep.
    #[must_use]
    pub fn point_count(&self) -> u64 {
        let len = self.values.len() as u64;
        len * len * len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_exact_steps() {
        let expected = [-1.0, -0.75, -0.5, -0.25, 0.0, 0.25, 0.5, 0.75, 1.0];
        for anchor in [LatticeAnchor::Origin, LatticeAnchor::NegativeRadius] {
            let axis = LatticeAxis::new(1.0, 0.25, anchor);
            assert_eq!(axis.values(), &expected);
            assert_eq!(axis.point_count(), 729);
        }
    }

    #[test]
    fn test_axis_single_value() {
        let axis = LatticeAxis::new(1.0, 5.0, LatticeAnchor::NegativeRadius);
        assert_eq!(axis.values(), &[-1.0]);

        let axis = LatticeAxis::new(1.0, 5.0, LatticeAnchor::Origin);
        assert_eq!(axis.values(), &[0.0]);
    }

    #[test]
    fn test_origin_anchor_samples_origin() {
        let axis = LatticeAxis::new(0.05, 0.1, LatticeAnchor::Origin);
        assert_eq!(axis.values(), &[0.0]);

        // The literal sweep straddles the origin instead
        let axis = LatticeAxis::new(0.05, 0.1, LatticeAnchor::NegativeRadius);
        assert_eq!(axis.values(), &[-0.05, 0.05]);
    }

    #[test]
    fn test_origin_anchor_is_symmetric() {
        let axis = LatticeAxis::new(6.0, 0.1, LatticeAnchor::Origin);
        assert_eq!(axis.len(), 121);
        assert_eq!(axis.value(60), 0.0);
        let values = axis.values();
        for (low, high) in values.iter().zip(values.iter().rev()) {
            assert_eq!(*low, -*high);
        }
        assert!(values.iter().all(|v| v.abs() <= 6.0));
    }

    #[test]
    fn test_axis_accumulates_like_the_sweep() {
        let axis = LatticeAxis::new(6.0, 0.1, LatticeAnchor::NegativeRadius);
        let mut expected = -6.0_f64;
        for &value in axis.values() {
            assert_eq!(value.to_bits(), expected.to_bits());
            expected += 0.1;
        }
        // 121 nominal values, give or take the final boundary point
        assert!((120..=121).contains(&axis.len()), "len = {}", axis.len());
        assert!(axis.len() as u64 <= estimated_axis_len(6.0, 0.1));
    }

    #[test]
    fn test_axis_stalled_step_terminates() {
        let axis = LatticeAxis::new(1.0e20, 1.0, LatticeAnchor::NegativeRadius);
        assert_eq!(axis.len(), 1);
    }

    #[test]
    fn test_cell_offset() {
        let cell = LatticeCell::new(0, 3, 7);
        assert_eq!(cell.offset([1, 0, 0]), Some(LatticeCell::new(1, 3, 7)));
        assert_eq!(cell.offset([0, 0, -1]), Some(LatticeCell::new(0, 3, 6)));
        assert_eq!(cell.offset([-1, 0, 0]), None);
        assert_eq!(cell.index_sum(), 10);
    }

    #[test]
    fn test_contains() {
        let axis = LatticeAxis::new(1.0, 0.5, LatticeAnchor::Origin);
        assert!(axis.contains(LatticeCell::new(4, 4, 4)));
        assert!(!axis.contains(LatticeCell::new(5, 0, 0)));
    }
}
