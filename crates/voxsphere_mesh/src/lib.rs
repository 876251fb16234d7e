//! # VOXSPHERE Mesh Generation
//!
//! Builds a sphere out of axis-aligned cubes and hands it back as a single
//! indexed, per-vertex coloured triangle mesh.
//!
//! ## Design Principles
//!
//! 1. **Shell only**: Interior voxels are never emitted
//! 2. **Culled**: Faces hidden by a neighbouring voxel are dropped
//! 3. **Deterministic**: Same config, same bytes, in sequential or parallel mode
//! 4. **One draw call**: Everything ends up in one merged buffer
//!
//! ## Core Components
//!
//! - `LatticeAxis`: The coordinate sequence swept on every axis
//! - `OccupancyGrid`: Memoized shell classification per lattice cell
//! - `resolve_faces`: Per-voxel face visibility
//! - `emit_voxel`: Quads for the visible faces
//! - `CheckerboardColorer`: Two-colour parity shading
//! - `MeshMerger`: Index-offsetting concatenation of geometry buffers
//! - `SphereMeshGenerator`: The full pipeline
//!
//! ## Example
//!
//! ```rust,ignore
//! use voxsphere_mesh::{SphereConfig, SphereMeshGenerator};
//!
//! let generator = SphereMeshGenerator::new(SphereConfig::new(6.0, 0.1))?;
//! let mesh = generator.generate()?;
//!
//! upload(mesh.buffer().vertex_bytes(), mesh.buffer().index_bytes());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod buffer;
pub mod cancel;
pub mod colorer;
pub mod config;
pub mod emitter;
pub mod error;
pub mod generator;
pub mod lattice;
pub mod occupancy;
pub mod persistence;
pub mod visibility;

pub use buffer::{merge, GeometryBuffer, MergedMesh, MeshMerger};
pub use cancel::CancelToken;
pub use colorer::{CheckerboardColorer, ParityRule};
pub use config::{ExecutionMode, SphereConfig};
pub use emitter::emit_voxel;
pub use error::{MeshError, MeshResult};
pub use generator::{generate_sphere, GenerationStats, SphereMeshGenerator};
pub use lattice::{LatticeAnchor, LatticeAxis, LatticeCell};
pub use occupancy::{is_shell_voxel, is_surface_voxel, OccupancyGrid, SurfaceProbe};
pub use persistence::{MESH_FORMAT_VERSION, MESH_MAGIC};
pub use visibility::{resolve_faces, Face, FaceMask};
