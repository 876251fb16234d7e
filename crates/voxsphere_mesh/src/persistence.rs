//! # Mesh Files
//!
//! Merged meshes can be written to disk and read back, so a large sphere is
//! only generated once.
//!
//! ## Format
//!
//! The payload is LZ4-compressed with its size prepended. Uncompressed, all
//! fields are little-endian:
//!
//! | Field          | Size              |
//! |----------------|-------------------|
//! | magic `VXSM`   | 4                 |
//! | version        | 2                 |
//! | flags          | 2                 |
//! | vertex count   | 4                 |
//! | index count    | 4                 |
//! | vertices       | 12 per vertex     |
//! | colors         | 12 per vertex     |
//! | indices        | 4 per index       |
//!
//! Flag bit 0 is the per-vertex colour flag. Loading checks the header,
//! the exact payload length and the buffer invariants.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use lz4_flex::{compress_prepend_size, decompress_size_prepended};

use crate::buffer::{GeometryBuffer, MergedMesh};
use crate::error::{MeshError, MeshResult};

/// File magic.
pub const MESH_MAGIC: [u8; 4] = *b"VXSM";

/// Current format version.
pub const MESH_FORMAT_VERSION: u16 = 1;

/// Header size in bytes.
pub const HEADER_SIZE: usize = 16;

const FLAG_PER_VERTEX_COLOR: u16 = 1 << 0;

fn corrupt(reason: impl Into<String>) -> MeshError {
    MeshError::CorruptMeshFile(reason.into())
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

fn read_f32(chunk: &[u8]) -> f32 {
    f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]])
}

fn read_triples(bytes: &[u8]) -> Vec<[f32; 3]> {
    bytes
        .chunks_exact(12)
        .map(|c| [read_f32(&c[0..4]), read_f32(&c[4..8]), read_f32(&c[8..12])])
        .collect()
}

impl MergedMesh {
    /// Serializes the mesh, uncompressed.
    ///
    /// # Errors
    ///
    /// Returns `IndexOverflow` if a count does not fit the `u32` header
    /// fields.
    pub fn to_bytes(&self) -> MeshResult<Vec<u8>> {
        let vertex_count = u32::try_from(self.vertex_count())
            .map_err(|_| MeshError::IndexOverflow { vertices: self.vertex_count() })?;
        let index_count = u32::try_from(self.indices().len())
            .map_err(|_| MeshError::IndexOverflow { vertices: self.vertex_count() })?;

        let flags = if self.use_per_vertex_color { FLAG_PER_VERTEX_COLOR } else { 0 };
        let mut buf = Vec::with_capacity(HEADER_SIZE + self.vertex_count() * 24 + self.indices().len() * 4);

        buf.extend_from_slice(&MESH_MAGIC);
        buf.extend_from_slice(&MESH_FORMAT_VERSION.to_le_bytes());
        buf.extend_from_slice(&flags.to_le_bytes());
        buf.extend_from_slice(&vertex_count.to_le_bytes());
        buf.extend_from_slice(&index_count.to_le_bytes());

        for value in self.buffer().flat_vertices() {
            buf.extend_from_slice(&value.to_le_bytes());
        }
        for value in self.buffer().flat_colors() {
            buf.extend_from_slice(&value.to_le_bytes());
        }
        for index in self.indices() {
            buf.extend_from_slice(&index.to_le_bytes());
        }
        Ok(buf)
    }

    /// Parses a mesh written by [`MergedMesh::to_bytes`].
    ///
    /// # Errors
    ///
    /// Returns `CorruptMeshFile` if the header or payload length is wrong, or
    /// if the decoded buffers break the mesh invariants.
    pub fn from_bytes(bytes: &[u8]) -> MeshResult<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(corrupt(format!("{} bytes is shorter than the header", bytes.len())));
        }
        if bytes[0..4] != MESH_MAGIC {
            return Err(corrupt("bad magic"));
        }
        let version = read_u16(bytes, 4);
        if version != MESH_FORMAT_VERSION {
            return Err(corrupt(format!("unsupported version {version}")));
        }
        let flags = read_u16(bytes, 6);
        let vertex_count = read_u32(bytes, 8) as usize;
        let index_count = read_u32(bytes, 12) as usize;

        let vertex_bytes = vertex_count * 12;
        let expected = HEADER_SIZE + 2 * vertex_bytes + index_count * 4;
        if bytes.len() != expected {
            return Err(corrupt(format!("expected {expected} bytes, found {}", bytes.len())));
        }

        let body = &bytes[HEADER_SIZE..];
        let (vertices, rest) = body.split_at(vertex_bytes);
        let (colors, indices) = rest.split_at(vertex_bytes);

        let buffer = GeometryBuffer {
            vertices: read_triples(vertices),
            colors: read_triples(colors),
            indices: indices.chunks_exact(4).map(|c| read_u32(c, 0)).collect(),
        };
        if !buffer.is_well_formed() {
            return Err(corrupt("index out of range or partial triangle"));
        }

        let mut mesh = Self::new(buffer);
        mesh.use_per_vertex_color = flags & FLAG_PER_VERTEX_COLOR != 0;
        Ok(mesh)
    }

    /// Saves the mesh to an LZ4-compressed file.
    ///
    /// # Errors
    ///
    /// Returns `Io` if writing fails, or `IndexOverflow` from serialization.
    pub fn save_compressed(&self, path: &Path) -> MeshResult<usize> {
        let compressed = compress_prepend_size(&self.to_bytes()?);

        let mut file = File::create(path)?;
        file.write_all(&compressed)?;

        tracing::debug!(
            "saved mesh to {}: {} vertices, {} bytes compressed",
            path.display(),
            self.vertex_count(),
            compressed.len()
        );
        Ok(compressed.len())
    }

    /// Loads a mesh saved with [`MergedMesh::save_compressed`].
    ///
    /// # Errors
    ///
    /// Returns `Io` if reading fails, or `CorruptMeshFile` if the data does
    /// not decompress or validate.
    pub fn load_compressed(path: &Path) -> MeshResult<Self> {
        let mut file = File::open(path)?;
        let mut compressed = Vec::new();
        file.read_to_end(&mut compressed)?;

        let bytes = decompress_size_prepended(&compressed).map_err(|e| corrupt(format!("lz4: {e}")))?;
        let mesh = Self::from_bytes(&bytes)?;

        tracing::debug!("loaded mesh from {}: {} vertices", path.display(), mesh.vertex_count());
        Ok(mesh)
    }
}
