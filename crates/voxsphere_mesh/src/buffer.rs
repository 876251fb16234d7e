//! # Geometry Buffers
//!
//! Vertex, colour and index data, per voxel and merged.
//!
//! ## Invariants
//!
//! For every buffer, merged or not:
//! - one colour per vertex
//! - indices come in triangles
//! - every index addresses an existing vertex
//! - data is append-only, in emission order
//!
//! ## Merging
//!
//! [`MeshMerger`] threads a running vertex offset through the per-voxel
//! buffers: vertices and colours are copied verbatim, indices are shifted by
//! the offset, then the offset grows by the part's vertex count. Empty parts
//! leave the offset untouched. Merging is associative, so merged slabs can
//! themselves be merged in order.

use bytemuck::cast_slice;

use crate::error::{MeshError, MeshResult};

/// Vertex positions, per-vertex colours and triangle indices.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeometryBuffer {
    /// Vertex positions.
    pub vertices: Vec<[f32; 3]>,
    /// One RGB colour per vertex.
    pub colors: Vec<[f32; 3]>,
    /// Triangle list indices into `vertices`.
    pub indices: Vec<u32>,
}

impl GeometryBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vertices: Vec::new(),
            colors: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Creates an empty buffer with room for the given counts.
    #[must_use]
    pub fn with_capacity(vertices: usize, indices: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            colors: Vec::with_capacity(vertices),
            indices: Vec::with_capacity(indices),
        }
    }

    /// Empties the buffer, keeping its allocations.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.colors.clear();
        self.indices.clear();
    }

    /// True if the buffer holds no vertices.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Number of vertices.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    #[inline]
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Checks the buffer invariants.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        let vertex_count = self.vertices.len();
        self.colors.len() == vertex_count
            && self.indices.len() % 3 == 0
            && self.indices.iter().all(|&i| (i as usize) < vertex_count)
    }

    /// Positions as a flat `[x, y, z, x, y, z, ...]` slice.
    #[must_use]
    pub fn flat_vertices(&self) -> &[f32] {
        cast_slice(&self.vertices)
    }

    /// Colours as a flat `[r, g, b, r, g, b, ...]` slice.
    #[must_use]
    pub fn flat_colors(&self) -> &[f32] {
        cast_slice(&self.colors)
    }

    /// Position data as bytes for GPU upload.
    #[must_use]
    pub fn vertex_bytes(&self) -> &[u8] {
        cast_slice(&self.vertices)
    }

    /// Colour data as bytes for GPU upload.
    #[must_use]
    pub fn color_bytes(&self) -> &[u8] {
        cast_slice(&self.colors)
    }

    /// Index data as bytes for GPU upload.
    #[must_use]
    pub fn index_bytes(&self) -> &[u8] {
        cast_slice(&self.indices)
    }
}

/// Offset for a part of `added` vertices appended after `current` vertices.
///
/// # Errors
///
/// Returns `IndexOverflow` if the combined vertex count cannot be addressed
/// by `u32` indices.
pub fn checked_offset(current: usize, added: usize) -> MeshResult<u32> {
    let total = current.saturating_add(added);
    if total > u32::MAX as usize {
        return Err(MeshError::IndexOverflow { vertices: total });
    }
    Ok(current as u32)
}

/// Running concatenation of geometry buffers.
#[derive(Debug, Default)]
pub struct MeshMerger {
    merged: GeometryBuffer,
}

impl MeshMerger {
    /// Creates an empty merger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a merger with room for the given totals.
    #[must_use]
    pub fn with_capacity(vertices: usize, indices: usize) -> Self {
        Self {
            merged: GeometryBuffer::with_capacity(vertices, indices),
        }
    }

    /// Vertex count so far, i.e. the offset the next part's indices get.
    #[inline]
    #[must_use]
    pub fn vertex_offset(&self) -> usize {
        self.merged.vertices.len()
    }

    /// Appends `part` after everything merged so far.
    ///
    /// # Errors
    ///
    /// Returns `IndexOverflow` if the merged mesh would outgrow `u32`
    /// indices. The merger is left unchanged in that case.
    pub fn append(&mut self, part: &GeometryBuffer) -> MeshResult<()> {
        let offset = checked_offset(self.vertex_offset(), part.vertex_count())?;

        self.merged.vertices.extend_from_slice(&part.vertices);
        self.merged.colors.extend_from_slice(&part.colors);
        self.merged.indices.extend(part.indices.iter().map(|&i| i + offset));
        Ok(())
    }

    /// Finishes merging.
    #[must_use]
    pub fn finish(self) -> MergedMesh {
        MergedMesh::new(self.merged)
    }
}

/// Merges `parts` in order into one mesh.
///
/// # Errors
///
/// Returns `IndexOverflow` if the result cannot be addressed by `u32`
/// indices.
pub fn merge<'a>(parts: impl IntoIterator<Item = &'a GeometryBuffer>) -> MeshResult<MergedMesh> {
    let mut merger = MeshMerger::new();
    for part in parts {
        merger.append(part)?;
    }
    Ok(merger.finish())
}

/// The whole shape as one buffer, ready for a single draw call.
#[derive(Clone, Debug, PartialEq)]
pub struct MergedMesh {
    buffer: GeometryBuffer,
    /// Render with per-vertex colours instead of one uniform colour.
    pub use_per_vertex_color: bool,
}

impl Default for MergedMesh {
    fn default() -> Self {
        Self::new(GeometryBuffer::new())
    }
}

impl MergedMesh {
    /// Wraps a merged buffer, flagged for per-vertex colouring.
    #[must_use]
    pub const fn new(buffer: GeometryBuffer) -> Self {
        Self {
            buffer,
            use_per_vertex_color: true,
        }
    }

    /// Vertex positions.
    #[inline]
    #[must_use]
    pub fn vertices(&self) -> &[[f32; 3]] {
        &self.buffer.vertices
    }

    /// Per-vertex colours.
    #[inline]
    #[must_use]
    pub fn colors(&self) -> &[[f32; 3]] {
        &self.buffer.colors
    }

    /// Triangle indices.
    #[inline]
    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.buffer.indices
    }

    /// The underlying buffer.
    #[inline]
    #[must_use]
    pub const fn buffer(&self) -> &GeometryBuffer {
        &self.buffer
    }

    /// Takes the underlying buffer.
    #[must_use]
    pub fn into_buffer(self) -> GeometryBuffer {
        self.buffer
    }

    /// Number of vertices.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.buffer.vertex_count()
    }

    /// Number of triangles.
    #[inline]
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.buffer.triangle_count()
    }

    /// True if nothing would be drawn.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Axis-aligned bounds `(min, max)` of all vertices.
    #[must_use]
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        let (first, rest) = self.buffer.vertices.split_first()?;
        let mut min = *first;
        let mut max = *first;
        for v in rest {
            for ((lo, hi), &c) in min.iter_mut().zip(max.iter_mut()).zip(v) {
                *lo = lo.min(c);
                *hi = hi.max(c);
            }
        }
        Some((min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn quad(offset: f32, color: [f32; 3]) -> GeometryBuffer {
        GeometryBuffer {
            vertices: vec![
                [offset, 0.0, 0.0],
                [offset + 1.0, 0.0, 0.0],
                [offset + 1.0, 1.0, 0.0],
                [offset, 1.0, 0.0],
            ],
            colors: vec![color; 4],
            indices: vec![0, 1, 2, 2, 3, 0],
        }
    }

    fn random_buffer(rng: &mut ChaCha8Rng) -> GeometryBuffer {
        let vertex_count = rng.gen_range(0..12usize);
        let mut buffer = GeometryBuffer::new();
        for _ in 0..vertex_count {
            buffer.vertices.push([rng.gen(), rng.gen(), rng.gen()]);
            buffer.colors.push([rng.gen(), rng.gen(), rng.gen()]);
        }
        if vertex_count > 0 {
            for _ in 0..rng.gen_range(0..6) * 3 {
                buffer.indices.push(rng.gen_range(0..vertex_count as u32));
            }
        }
        buffer
    }

    #[test]
    fn test_merge_offsets_indices() {
        let a = quad(0.0, [1.0, 0.0, 0.0]);
        let b = quad(2.0, [0.0, 1.0, 0.0]);
        let mesh = merge([&a, &b]).unwrap();

        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.indices(), &[0, 1, 2, 2, 3, 0, 4, 5, 6, 6, 7, 4]);
        assert_eq!(mesh.colors()[4], [0.0, 1.0, 0.0]);
        assert_eq!(mesh.vertices()[4], [2.0, 0.0, 0.0]);
        assert!(mesh.use_per_vertex_color);
        assert!(mesh.buffer().is_well_formed());
    }

    #[test]
    fn test_empty_parts_do_not_shift_offsets() {
        let a = quad(0.0, [1.0; 3]);
        let b = quad(5.0, [0.5; 3]);
        let empty = GeometryBuffer::new();

        let without = merge([&a, &b]).unwrap();
        let with = merge([&empty, &a, &empty, &empty, &b, &empty]).unwrap();
        assert_eq!(without, with);
    }

    #[test]
    fn test_merge_nothing() {
        let mesh = merge(std::iter::empty::<&GeometryBuffer>()).unwrap();
        assert!(mesh.is_empty());
        assert_eq!(mesh.triangle_count(), 0);
        assert_eq!(mesh.bounds(), None);
    }

    #[test]
    fn test_random_merges_match_running_offset() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..50 {
            let parts: Vec<_> = (0..rng.gen_range(0..10)).map(|_| random_buffer(&mut rng)).collect();
            let mesh = merge(&parts).unwrap();
            assert!(mesh.buffer().is_well_formed());

            let mut offset = 0u32;
            let mut expected = Vec::new();
            for part in &parts {
                expected.extend(part.indices.iter().map(|i| i + offset));
                offset += part.vertex_count() as u32;
            }
            assert_eq!(mesh.indices(), expected.as_slice());
            assert_eq!(mesh.vertex_count(), offset as usize);

            // Inserting empties anywhere changes nothing
            let mut padded = parts.clone();
            let at = rng.gen_range(0..=padded.len());
            padded.insert(at, GeometryBuffer::new());
            assert_eq!(merge(&padded).unwrap(), mesh);
        }
    }

    #[test]
    fn test_merge_is_associative() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let parts: Vec<_> = (0..9).map(|_| random_buffer(&mut rng)).collect();

        let whole = merge(&parts).unwrap();
        let left = merge(&parts[..4]).unwrap().into_buffer();
        let right = merge(&parts[4..]).unwrap().into_buffer();
        assert_eq!(merge([&left, &right]).unwrap(), whole);
    }

    #[test]
    fn test_well_formed_detects_violations() {
        let mut buffer = quad(0.0, [0.0; 3]);
        assert!(buffer.is_well_formed());

        buffer.indices.push(1);
        assert!(!buffer.is_well_formed());
        buffer.indices.truncate(6);

        buffer.indices[0] = 4;
        assert!(!buffer.is_well_formed());
        buffer.indices[0] = 0;

        buffer.colors.pop();
        assert!(!buffer.is_well_formed());
    }

    #[test]
    fn test_flat_views() {
        let buffer = quad(3.0, [0.25, 0.5, 0.75]);
        assert_eq!(buffer.flat_vertices().len(), 12);
        assert_eq!(&buffer.flat_vertices()[..3], &[3.0, 0.0, 0.0]);
        assert_eq!(&buffer.flat_colors()[..3], &[0.25, 0.5, 0.75]);
        assert_eq!(buffer.vertex_bytes().len(), 48);
        assert_eq!(buffer.index_bytes().len(), 24);
    }

    #[test]
    fn test_checked_offset() {
        assert_eq!(checked_offset(10, 4).unwrap(), 10);
        assert!(checked_offset(u32::MAX as usize, 0).is_ok());
        assert!(matches!(
            checked_offset(u32::MAX as usize, 1),
            Err(MeshError::IndexOverflow { .. })
        ));
    }

    #[test]
    fn test_bounds() {
        let mesh = merge([&quad(-1.0, [0.0; 3]), &quad(2.0, [0.0; 3])]).unwrap();
        assert_eq!(mesh.bounds(), Some(([-1.0, 0.0, 0.0], [3.0, 1.0, 0.0])));
    }
}
