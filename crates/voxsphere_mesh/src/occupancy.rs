//! # Occupancy Sampler
//!
//! Decides which lattice points become voxels. A point is occupied when it
//! lies inside the sphere *and* sits on its shell, which keeps the generator
//! from filling the interior.
//!
//! ## Shell Test
//!
//! The shell test probes six neighbours at a small offset along each axis
//! and accepts the point if any of them falls outside the sphere. The
//! reference offset is a literal `0.1`, independent of `detail`; see
//! [`SurfaceProbe`] for the alternatives.
//!
//! ## Memoization
//!
//! Face visibility asks the same question about every neighbour of every
//! voxel. [`OccupancyGrid`] answers it once per lattice cell, up front.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cancel::CancelToken;
use crate::config::ExecutionMode;
use crate::error::{MeshError, MeshResult};
use crate::lattice::{LatticeAxis, LatticeCell};

/// Neighbour offset of the reference shell test.
pub const REFERENCE_PROBE_DELTA: f64 = 0.1;

/// Offset used when probing a point's neighbours for the shell test.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SurfaceProbe {
    /// Literal `0.1`, whatever the lattice step.
    #[default]
    Reference,
    /// Probe one lattice step away.
    MatchDetail,
    /// Probe at a caller-chosen offset.
    Fixed(f64),
}

impl SurfaceProbe {
    /// Offset to probe with for a lattice of step `detail`.
    #[inline]
    #[must_use]
    pub fn delta(self, detail: f64) -> f64 {
        match self {
            Self::Reference => REFERENCE_PROBE_DELTA,
            Self::MatchDetail => detail,
            Self::Fixed(delta) => delta,
        }
    }
}

/// Euclidean distance from the origin.
#[inline]
#[must_use]
pub fn distance(p: [f64; 3]) -> f64 {
    (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt()
}

/// True if any of the six axis neighbours at `delta` lies outside the sphere.
#[must_use]
pub fn is_surface_voxel(p: [f64; 3], radius: f64, delta: f64) -> bool {
    let [x, y, z] = p;
    let neighbors = [
        [x + delta, y, z],
        [x - delta, y, z],
        [x, y + delta, z],
        [x, y - delta, z],
        [x, y, z + delta],
        [x, y, z - delta],
    ];
    neighbors.into_iter().any(|n| distance(n) > radius)
}

/// The occupancy predicate: inside the sphere and on its shell.
#[inline]
#[must_use]
pub fn is_shell_voxel(p: [f64; 3], radius: f64, delta: f64) -> bool {
    distance(p) <= radius && is_surface_voxel(p, radius, delta)
}

/// Walks the full lattice and returns the occupied points in sweep order
/// (x outermost, z innermost).
#[must_use]
pub fn sample_occupied(axis: &LatticeAxis, delta: f64) -> Vec<(LatticeCell, [f64; 3])> {
    let radius = axis.radius();
    let len = axis.len() as u32;
    let mut occupied = Vec::new();

    for x in 0..len {
        for y in 0..len {
            for z in 0..len {
                let cell = LatticeCell::new(x, y, z);
                let position = axis.position(cell);
                if is_shell_voxel(position, radius, delta) {
                    occupied.push((cell, position));
                }
            }
        }
    }
    occupied
}

/// Shell classification of every lattice cell, computed once.
///
/// Cells are stored x-major so that each x-slab is one contiguous run and
/// can be filled by its own worker.
#[derive(Clone, Debug)]
pub struct OccupancyGrid {
    side: usize,
    cells: Vec<bool>,
    occupied: usize,
}

impl OccupancyGrid {
    /// Classifies every cell of `axis`.
    ///
    /// The cancel token is checked once per x-slab.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the token fires before the grid is complete.
    pub fn build(
        axis: &LatticeAxis,
        delta: f64,
        execution: ExecutionMode,
        cancel: &CancelToken,
    ) -> MeshResult<Self> {
        let side = axis.len();
        let slab_len = side * side;
        let mut cells = vec![false; slab_len * side];

        if slab_len == 0 {
            return Ok(Self { side, cells, occupied: 0 });
        }

        let fill = |(x, slab): (usize, &mut [bool])| -> MeshResult<usize> {
            if cancel.is_cancelled() {
                return Err(MeshError::Cancelled);
            }
            Ok(Self::fill_slab(axis, delta, x as u32, slab))
        };

        let occupied = match execution {
            ExecutionMode::Sequential => cells
                .chunks_mut(slab_len)
                .enumerate()
                .map(fill)
                .sum::<MeshResult<usize>>()?,
            ExecutionMode::Parallel => cells
                .par_chunks_mut(slab_len)
                .enumerate()
                .map(fill)
                .try_reduce(|| 0, |a, b| Ok(a + b))?,
        };

        tracing::debug!("occupancy grid: {side}^3 cells, {occupied} occupied");
        Ok(Self { side, cells, occupied })
    }

    fn fill_slab(axis: &LatticeAxis, delta: f64, x: u32, slab: &mut [bool]) -> usize {
        let radius = axis.radius();
        let side = axis.len() as u32;
        let mut occupied = 0;

        for y in 0..side {
            for z in 0..side {
                let shell = is_shell_voxel(axis.position(LatticeCell::new(x, y, z)), radius, delta);
                slab[(y * side + z) as usize] = shell;
                occupied += usize::from(shell);
            }
        }
        occupied
    }

    #[inline]
    fn index(&self, cell: LatticeCell) -> Option<usize> {
        let (x, y, z) = (cell.x as usize, cell.y as usize, cell.z as usize);
        if x < self.side && y < self.side && z < self.side {
            Some((x * self.side + y) * self.side + z)
        } else {
            None
        }
    }

    /// True if `cell` is an occupied shell voxel. Cells off the lattice are
    /// empty.
    #[inline]
    #[must_use]
    pub fn is_occupied(&self, cell: LatticeCell) -> bool {
        self.index(cell).is_some_and(|i| self.cells[i])
    }

    /// Number of values per axis.
    #[inline]
    #[must_use]
    pub const fn side(&self) -> usize {
        self.side
    }

    /// Total occupied cells.
    #[inline]
    #[must_use]
    pub const fn occupied_count(&self) -> usize {
        self.occupied
    }

    /// Occupied cells of one x-slab, in sweep order.
    pub fn occupied_in_slab(&self, x: u32) -> impl Iterator<Item = LatticeCell> + '_ {
        let side = self.side as u32;
        (0..side)
            .flat_map(move |y| (0..side).map(move |z| LatticeCell::new(x, y, z)))
            .filter(move |&cell| self.is_occupied(cell))
    }
}
