//! # Sphere Mesh Generator
//!
//! Drives the whole pipeline for one sphere:
//!
//! 1. Build the lattice axis
//! 2. Classify every cell into an [`OccupancyGrid`]
//! 3. For each occupied voxel, resolve its visible faces against the grid,
//!    emit them into a scratch buffer and append that to the merger
//!
//! The sweep is split into x-slabs. In parallel mode every slab is meshed
//! into its own buffer on the rayon pool and the slabs are merged in x order,
//! which gives the same bytes as the sequential sweep because merging is
//! associative.

use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::buffer::{merge, GeometryBuffer, MergedMesh, MeshMerger};
use crate::cancel::CancelToken;
use crate::colorer::CheckerboardColorer;
use crate::config::{ExecutionMode, SphereConfig};
use crate::emitter::{emit_voxel, INDICES_PER_FACE, VERTICES_PER_FACE};
use crate::error::{MeshError, MeshResult};
use crate::lattice::{LatticeAxis, LatticeCell};
use crate::occupancy::{is_shell_voxel, sample_occupied, OccupancyGrid};
use crate::visibility::{reference_neighbor_is_shell, resolve_faces, Face};

// =============================================================================
// STATS
// =============================================================================

/// Counters from one generation run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GenerationStats {
    /// Candidate points visited by the sweep.
    pub lattice_points: u64,
    /// Points classified as shell voxels.
    pub occupied_voxels: usize,
    /// Faces written to the mesh.
    pub emitted_faces: usize,
    /// Faces of occupied voxels that were culled.
    pub culled_faces: usize,
    /// Vertices in the merged mesh.
    pub vertex_count: usize,
    /// Triangles in the merged mesh.
    pub triangle_count: usize,
    /// Wall time of the run.
    pub elapsed: Duration,
}

impl GenerationStats {
    fn from_mesh(lattice_points: u64, occupied_voxels: usize, mesh: &MergedMesh, elapsed: Duration) -> Self {
        let emitted_faces = mesh.vertex_count() / VERTICES_PER_FACE;
        Self {
            lattice_points,
            occupied_voxels,
            emitted_faces,
            culled_faces: (occupied_voxels * Face::ALL.len()).saturating_sub(emitted_faces),
            vertex_count: mesh.vertex_count(),
            triangle_count: mesh.triangle_count(),
            elapsed,
        }
    }

    /// Fraction of occupied-voxel faces that were culled.
    #[must_use]
    pub fn cull_ratio(&self) -> f64 {
        let total = self.emitted_faces + self.culled_faces;
        if total == 0 {
            0.0
        } else {
            self.culled_faces as f64 / total as f64
        }
    }
}

// =============================================================================
// GENERATOR
// =============================================================================

/// Builds voxelized sphere meshes from a validated [`SphereConfig`].
#[derive(Clone, Debug)]
pub struct SphereMeshGenerator {
    config: SphereConfig,
    colorer: CheckerboardColorer,
}

impl SphereMeshGenerator {
    /// Creates a generator.
    ///
    /// # Errors
    ///
    /// Returns the validation error if `config` is rejected. Nothing is
    /// sampled before validation passes.
    pub fn new(config: SphereConfig) -> MeshResult<Self> {
        config.validate()?;
        let colorer = CheckerboardColorer::new(config.even_color, config.odd_color, config.parity);
        Ok(Self { config, colorer })
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &SphereConfig {
        &self.config
    }

    /// Generates the sphere mesh.
    ///
    /// # Errors
    ///
    /// Returns `IndexOverflow` if the mesh outgrows `u32` indices.
    pub fn generate(&self) -> MeshResult<MergedMesh> {
        self.generate_cancellable(&CancelToken::new())
    }

    /// Generates the sphere mesh, giving up once `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the token fires mid-run, or `IndexOverflow`.
    pub fn generate_cancellable(&self, cancel: &CancelToken) -> MeshResult<MergedMesh> {
        self.generate_with_stats(cancel).map(|(mesh, _)| mesh)
    }

    /// Generates the sphere mesh and reports what the run did.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the token fires mid-run, or `IndexOverflow`.
    pub fn generate_with_stats(&self, cancel: &CancelToken) -> MeshResult<(MergedMesh, GenerationStats)> {
        let start = Instant::now();
        let config = &self.config;

        if config.exceeds_diameter() {
            tracing::warn!(
                "detail {} exceeds sphere diameter {}, expect an empty mesh",
                config.detail,
                2.0 * config.radius
            );
        }

        let axis = LatticeAxis::new(config.radius, config.detail, config.anchor);
        let grid = OccupancyGrid::build(&axis, config.probe_delta(), config.execution, cancel)?;

        let mesh = match config.execution {
            ExecutionMode::Sequential => self.mesh_sequential(&axis, &grid, cancel)?,
            ExecutionMode::Parallel => self.mesh_parallel(&axis, &grid, cancel)?,
        };

        let stats = GenerationStats::from_mesh(axis.point_count(), grid.occupied_count(), &mesh, start.elapsed());
        tracing::info!(
            "generated sphere r={} d={}: {} voxels, {} vertices, {} triangles in {:.2?}",
            config.radius,
            config.detail,
            stats.occupied_voxels,
            stats.vertex_count,
            stats.triangle_count,
            stats.elapsed
        );
        Ok((mesh, stats))
    }

    fn mesh_sequential(
        &self,
        axis: &LatticeAxis,
        grid: &OccupancyGrid,
        cancel: &CancelToken,
    ) -> MeshResult<MergedMesh> {
        // Shell voxels rarely show more than two faces
        let faces_hint = grid.occupied_count() * 2;
        let mut merger = MeshMerger::with_capacity(faces_hint * VERTICES_PER_FACE, faces_hint * INDICES_PER_FACE);
        let mut scratch = GeometryBuffer::with_capacity(6 * VERTICES_PER_FACE, 6 * INDICES_PER_FACE);

        for x in 0..grid.side() as u32 {
            if cancel.is_cancelled() {
                return Err(MeshError::Cancelled);
            }
            self.mesh_slab(axis, grid, x, &mut scratch, &mut merger)?;
        }
        Ok(merger.finish())
    }

    fn mesh_parallel(
        &self,
        axis: &LatticeAxis,
        grid: &OccupancyGrid,
        cancel: &CancelToken,
    ) -> MeshResult<MergedMesh> {
        let slabs = (0..grid.side() as u32)
            .into_par_iter()
            .map(|x| {
                if cancel.is_cancelled() {
                    return Err(MeshError::Cancelled);
                }
                let mut merger = MeshMerger::new();
                let mut scratch = GeometryBuffer::with_capacity(6 * VERTICES_PER_FACE, 6 * INDICES_PER_FACE);
                self.mesh_slab(axis, grid, x, &mut scratch, &mut merger)?;
                Ok(merger.finish().into_buffer())
            })
            .collect::<MeshResult<Vec<_>>>()?;

        merge(&slabs)
    }

    /// Meshes every occupied voxel of slab `x` into `merger`.
    fn mesh_slab(
        &self,
        axis: &LatticeAxis,
        grid: &OccupancyGrid,
        x: u32,
        scratch: &mut GeometryBuffer,
        merger: &mut MeshMerger,
    ) -> MeshResult<()> {
        let radius = axis.radius();
        let detail = axis.detail();
        let delta = self.config.probe_delta();

        for cell in grid.occupied_in_slab(x) {
            let position = axis.position(cell);
            let mask = resolve_faces(position, detail, radius, |face| {
                neighbor_is_shell(axis, grid, cell, position, face, delta)
            });
            if mask.is_empty() {
                continue;
            }

            scratch.clear();
            emit_voxel(position, detail, mask, self.colorer.color_at(position, cell), scratch);
            merger.append(scratch)?;
        }
        Ok(())
    }

    /// Generates the mesh without the occupancy grid, classifying every
    /// neighbour by stepping its coordinate.
    ///
    /// Much slower. Produces the same mesh as [`generate`](Self::generate).
    ///
    /// # Errors
    ///
    /// Returns `IndexOverflow` if the mesh outgrows `u32` indices.
    pub fn generate_reference(&self) -> MeshResult<MergedMesh> {
        let config = &self.config;
        let axis = LatticeAxis::new(config.radius, config.detail, config.anchor);
        let delta = config.probe_delta();
        let mut merger = MeshMerger::new();
        let mut voxel = GeometryBuffer::new();

        for (cell, position) in sample_occupied(&axis, delta) {
            let mask = resolve_faces(position, config.detail, config.radius, |face| {
                reference_neighbor_is_shell(position, face, config.detail, config.radius, delta)
            });

            voxel.clear();
            emit_voxel(position, config.detail, mask, self.colorer.color_at(position, cell), &mut voxel);
            merger.append(&voxel)?;
        }
        Ok(merger.finish())
    }

}

/// Whether the point one `detail` step across `face` from `position` is a
/// shell voxel.
///
/// The grid answers only when the neighbouring lattice value equals the
/// stepped coordinate bit for bit. Otherwise `(k ± 1) * detail` and
/// `k * detail ± detail` differ in the last bits and the stepped point is
/// classified directly.
fn neighbor_is_shell(
    axis: &LatticeAxis,
    grid: &OccupancyGrid,
    cell: LatticeCell,
    position: [f64; 3],
    face: Face,
    delta: f64,
) -> bool {
    let stepped = face.step(position, axis.detail());
    let along = face.axis();

    match cell.offset(face.direction()) {
        Some(n) if axis.contains(n) && axis.position(n)[along].to_bits() == stepped[along].to_bits() => {
            grid.is_occupied(n)
        }
        _ => is_shell_voxel(stepped, axis.radius(), delta),
    }
}

/// Generates a sphere with the reference settings for `radius` and `detail`.
///
/// # Errors
///
/// Returns a validation error for bad scalars, or `IndexOverflow`.
pub fn generate_sphere(radius: f64, detail: f64) -> MeshResult<MergedMesh> {
    SphereMeshGenerator::new(SphereConfig::new(radius, detail))?.generate()
}
