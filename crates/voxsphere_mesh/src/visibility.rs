//! # Face Visibility
//!
//! Decides which of an occupied voxel's six faces border empty space.
//!
//! A face is drawn when one `detail` step in its direction either leaves the
//! sphere's axis-aligned bounding box or lands on a point that is not itself
//! a shell voxel. The bounding-box test is a per-axis coordinate comparison,
//! not the spherical distance test the sampler uses.

use bitflags::bitflags;

use crate::occupancy::is_shell_voxel;

/// One of the six axis-aligned faces of a voxel.
///
/// Axis convention: z is depth, y is vertical, x is horizontal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Face {
    /// +Z
    Front,
    /// -Z
    Back,
    /// +Y
    Top,
    /// -Y
    Bottom,
    /// -X
    Left,
    /// +X
    Right,
}

impl Face {
    /// All faces in emission order.
    pub const ALL: [Self; 6] = [
        Self::Front,
        Self::Back,
        Self::Top,
        Self::Bottom,
        Self::Left,
        Self::Right,
    ];

    /// Unit lattice step towards the neighbour across this face.
    #[inline]
    #[must_use]
    pub const fn direction(self) -> [i32; 3] {
        match self {
            Self::Front => [0, 0, 1],
            Self::Back => [0, 0, -1],
            Self::Top => [0, 1, 0],
            Self::Bottom => [0, -1, 0],
            Self::Left => [-1, 0, 0],
            Self::Right => [1, 0, 0],
        }
    }

    /// Index of the axis this face is perpendicular to (0 = x).
    #[inline]
    #[must_use]
    pub const fn axis(self) -> usize {
        match self {
            Self::Left | Self::Right => 0,
            Self::Top | Self::Bottom => 1,
            Self::Front | Self::Back => 2,
        }
    }

    /// True for the +X, +Y and +Z faces.
    #[inline]
    #[must_use]
    pub const fn is_positive(self) -> bool {
        matches!(self, Self::Front | Self::Top | Self::Right)
    }

    /// The mask bit for this face.
    #[inline]
    #[must_use]
    pub const fn flag(self) -> FaceMask {
        match self {
            Self::Front => FaceMask::FRONT,
            Self::Back => FaceMask::BACK,
            Self::Top => FaceMask::TOP,
            Self::Bottom => FaceMask::BOTTOM,
            Self::Left => FaceMask::LEFT,
            Self::Right => FaceMask::RIGHT,
        }
    }

    /// `position` moved one `detail` step across this face.
    #[inline]
    #[must_use]
    pub fn step(self, position: [f64; 3], detail: f64) -> [f64; 3] {
        let mut stepped = position;
        if self.is_positive() {
            stepped[self.axis()] += detail;
        } else {
            stepped[self.axis()] -= detail;
        }
        stepped
    }
}

bitflags! {
    /// Set of visible faces of one voxel.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct FaceMask: u8 {
        /// +Z
        const FRONT = 1 << 0;
        /// -Z
        const BACK = 1 << 1;
        /// +Y
        const TOP = 1 << 2;
        /// -Y
        const BOTTOM = 1 << 3;
        /// -X
        const LEFT = 1 << 4;
        /// +X
        const RIGHT = 1 << 5;
    }
}

impl FaceMask {
    /// Visible faces in emission order.
    pub fn faces(self) -> impl Iterator<Item = Face> {
        Face::ALL.into_iter().filter(move |face| self.contains(face.flag()))
    }

    /// Number of visible faces.
    #[inline]
    #[must_use]
    pub const fn face_count(self) -> u32 {
        self.bits().count_ones()
    }
}

/// Resolves the visible faces of the voxel at `position`.
///
/// `neighbor_is_shell` answers whether the lattice point across `face` is an
/// occupied shell voxel. It is only asked when the step stays inside the
/// bounding box.
pub fn resolve_faces(
    position: [f64; 3],
    detail: f64,
    radius: f64,
    mut neighbor_is_shell: impl FnMut(Face) -> bool,
) -> FaceMask {
    let mut mask = FaceMask::empty();

    for face in Face::ALL {
        let coordinate = position[face.axis()];
        let leaves_bounds = if face.is_positive() {
            coordinate + detail > radius
        } else {
            coordinate - detail < -radius
        };

        if leaves_bounds || !neighbor_is_shell(face) {
            mask |= face.flag();
        }
    }
    mask
}

/// Neighbour lookup that classifies the stepped coordinate directly, with no
/// memoization.
#[must_use]
pub fn reference_neighbor_is_shell(
    position: [f64; 3],
    face: Face,
    detail: f64,
    radius: f64,
    probe_delta: f64,
) -> bool {
    is_shell_voxel(face.step(position, detail), radius, probe_delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::occupancy::REFERENCE_PROBE_DELTA;

    #[test]
    fn test_single_voxel_all_faces() {
        // Every step from the origin leaves a 0.05 box
        let mask = resolve_faces([0.0; 3], 0.1, 0.05, |_| true);
        assert_eq!(mask, FaceMask::all());
        assert_eq!(mask.face_count(), 6);
    }

    #[test]
    fn test_buried_voxel_has_no_faces() {
        let mask = resolve_faces([0.0; 3], 0.1, 6.0, |_| true);
        assert!(mask.is_empty());
        assert_eq!(mask.faces().count(), 0);
    }

    #[test]
    fn test_empty_neighbor_exposes_face() {
        let mask = resolve_faces([0.0; 3], 0.1, 6.0, |face| face != Face::Top);
        assert_eq!(mask, FaceMask::TOP);
    }

    #[test]
    fn test_bounding_box_is_per_axis() {
        // Near the +x edge: only the right face leaves the box
        let mask = resolve_faces([0.95, 0.0, 0.0], 0.1, 1.0, |_| true);
        assert_eq!(mask, FaceMask::RIGHT);

        // Near the -z edge: only the back face leaves the box
        let mask = resolve_faces([0.0, 0.0, -0.95], 0.1, 1.0, |_| true);
        assert_eq!(mask, FaceMask::BACK);
    }

    #[test]
    fn test_neighbor_not_queried_when_leaving_bounds() {
        let mut asked = Vec::new();
        let _ = resolve_faces([0.95, 0.0, 0.0], 0.1, 1.0, |face| {
            asked.push(face);
            true
        });
        assert!(!asked.contains(&Face::Right));
        assert_eq!(asked.len(), 5);
    }

    #[test]
    fn test_face_order_and_directions() {
        let faces: Vec<_> = FaceMask::all().faces().collect();
        assert_eq!(faces, Face::ALL);
        for face in Face::ALL {
            let dir = face.direction();
            assert_eq!(dir[face.axis()].is_positive(), face.is_positive());
            assert_eq!(dir.iter().map(|d| d.abs()).sum::<i32>(), 1);
        }
    }

    #[test]
    fn test_reference_neighbor() {
        // Stepping outward from the shell lands outside the sphere
        assert!(!reference_neighbor_is_shell(
            [0.0, 0.0, 1.0],
            Face::Front,
            0.25,
            1.0,
            REFERENCE_PROBE_DELTA
        ));
        // Stepping inward from the shell lands in the interior
        assert!(!reference_neighbor_is_shell(
            [0.0, 0.0, 1.0],
            Face::Back,
            0.25,
            1.0,
            REFERENCE_PROBE_DELTA
        ));
        // Stepping sideways stays on the shell
        assert!(reference_neighbor_is_shell(
            [0.0, 0.0, 0.95],
            Face::Right,
            0.25,
            1.0,
            REFERENCE_PROBE_DELTA
        ));
    }
}
