//! # Voxel Face Emitter
//!
//! Turns one voxel into quads. Each visible face becomes four vertices and
//! two triangles `(v0, v1, v2)` and `(v2, v3, v0)`, wound counter-clockwise
//! when seen from outside so the triangle normal points away from the voxel.
//!
//! Faces own their vertices. Nothing is welded across voxels, so a shared
//! edge appears once per voxel that draws it.

use crate::buffer::GeometryBuffer;
use crate::visibility::{Face, FaceMask};

/// Vertices per emitted face.
pub const VERTICES_PER_FACE: usize = 4;

/// Indices per emitted face.
pub const INDICES_PER_FACE: usize = 6;

/// Triangle order within a face.
pub const FACE_INDICES: [u32; INDICES_PER_FACE] = [0, 1, 2, 2, 3, 0];

/// Corner offsets of a unit voxel centred on the origin, per face, in
/// [`Face::ALL`] order.
const FACE_TEMPLATES: [[[f64; 3]; VERTICES_PER_FACE]; 6] = [
    // Front (+Z)
    [[-0.5, -0.5, 0.5], [0.5, -0.5, 0.5], [0.5, 0.5, 0.5], [-0.5, 0.5, 0.5]],
    // Back (-Z)
    [[0.5, -0.5, -0.5], [-0.5, -0.5, -0.5], [-0.5, 0.5, -0.5], [0.5, 0.5, -0.5]],
    // Top (+Y)
    [[-0.5, 0.5, 0.5], [0.5, 0.5, 0.5], [0.5, 0.5, -0.5], [-0.5, 0.5, -0.5]],
    // Bottom (-Y)
    [[-0.5, -0.5, -0.5], [0.5, -0.5, -0.5], [0.5, -0.5, 0.5], [-0.5, -0.5, 0.5]],
    // Left (-X)
    [[-0.5, -0.5, -0.5], [-0.5, -0.5, 0.5], [-0.5, 0.5, 0.5], [-0.5, 0.5, -0.5]],
    // Right (+X)
    [[0.5, -0.5, 0.5], [0.5, -0.5, -0.5], [0.5, 0.5, -0.5], [0.5, 0.5, 0.5]],
];

/// Corner offsets of `face` for a unit voxel.
#[inline]
#[must_use]
pub fn face_template(face: Face) -> &'static [[f64; 3]; VERTICES_PER_FACE] {
    let slot = match face {
        Face::Front => 0,
        Face::Back => 1,
        Face::Top => 2,
        Face::Bottom => 3,
        Face::Left => 4,
        Face::Right => 5,
    };
    &FACE_TEMPLATES[slot]
}

/// Appends the visible faces of one voxel to `out`.
///
/// Every vertex of the voxel gets `color`. Indices are relative to the
/// vertices already in `out`, so a fresh buffer yields indices from 0.
/// An empty mask appends nothing.
pub fn emit_voxel(position: [f64; 3], detail: f64, mask: FaceMask, color: [f32; 3], out: &mut GeometryBuffer) {
    let face_count = mask.face_count() as usize;
    out.vertices.reserve(face_count * VERTICES_PER_FACE);
    out.colors.reserve(face_count * VERTICES_PER_FACE);
    out.indices.reserve(face_count * INDICES_PER_FACE);

    for face in mask.faces() {
        let base = out.vertices.len() as u32;
        for corner in face_template(face) {
            out.vertices.push([
                (position[0] + corner[0] * detail) as f32,
                (position[1] + corner[1] * detail) as f32,
                (position[2] + corner[2] * detail) as f32,
            ]);
            out.colors.push(color);
        }
        out.indices.extend(FACE_INDICES.iter().map(|i| base + i));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
    }

    fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
        a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
    }

    #[test]
    fn test_full_voxel_counts() {
        let mut out = GeometryBuffer::new();
        emit_voxel([0.0; 3], 0.1, FaceMask::all(), [0.0, 1.0, 0.0], &mut out);

        assert_eq!(out.vertex_count(), 24);
        assert_eq!(out.colors.len(), 24);
        assert_eq!(out.indices.len(), 36);
        assert!(out.indices.iter().all(|&i| i < 24));
        assert!(out.colors.iter().all(|&c| c == [0.0, 1.0, 0.0]));
        assert!(out.is_well_formed());
    }

    #[test]
    fn test_empty_mask_emits_nothing() {
        let mut out = GeometryBuffer::new();
        emit_voxel([1.0, 2.0, 3.0], 0.1, FaceMask::empty(), [1.0; 3], &mut out);
        assert!(out.is_empty());
        assert!(out.indices.is_empty());
    }

    #[test]
    fn test_winding_points_outward() {
        for face in Face::ALL {
            let mut out = GeometryBuffer::new();
            emit_voxel([0.0; 3], 1.0, face.flag(), [1.0; 3], &mut out);
            assert_eq!(out.vertex_count(), 4);

            for tri in out.indices.chunks(3) {
                let [a, b, c] = [0, 1, 2].map(|k| out.vertices[tri[k] as usize]);
                let normal = cross(sub(b, a), sub(c, a));
                let expected = face.direction().map(|d| d as f32);
                assert!(dot(normal, expected) > 0.0, "{face:?} is wound inward");
                // Parallel to the axis normal, not just on its side
                assert!(dot(normal, normal) - dot(normal, expected).powi(2) < 1e-6);
            }
        }
    }

    #[test]
    fn test_faces_sit_half_a_step_out() {
        let detail = 0.5;
        let center = [2.0, -1.0, 0.25];
        for face in Face::ALL {
            let mut out = GeometryBuffer::new();
            emit_voxel(center, detail, face.flag(), [1.0; 3], &mut out);
            let axis = face.axis();
            let expected = if face.is_positive() {
                center[axis] + detail / 2.0
            } else {
                center[axis] - detail / 2.0
            } as f32;
            assert!(out.vertices.iter().all(|v| v[axis] == expected), "{face:?}");
        }
    }

    #[test]
    fn test_indices_continue_after_existing_vertices() {
        let mut out = GeometryBuffer::new();
        emit_voxel([0.0; 3], 1.0, FaceMask::TOP, [1.0; 3], &mut out);
        emit_voxel([1.0, 0.0, 0.0], 1.0, FaceMask::TOP | FaceMask::LEFT, [0.0; 3], &mut out);
        assert_eq!(out.vertex_count(), 12);
        assert_eq!(&out.indices[6..12], &[4, 5, 6, 6, 7, 4]);
        assert_eq!(&out.indices[12..], &[8, 9, 10, 10, 11, 8]);
    }

    #[test]
    fn test_face_order_follows_mask_order() {
        let mut out = GeometryBuffer::new();
        emit_voxel([0.0; 3], 1.0, FaceMask::RIGHT | FaceMask::FRONT, [1.0; 3], &mut out);
        // Front first, then right
        assert!(out.vertices[..4].iter().all(|v| v[2] == 0.5));
        assert!(out.vertices[4..].iter().all(|v| v[0] == 0.5));
    }
}
