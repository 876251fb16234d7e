//! # VOXSPHERE
//!
//! Headless front end for [`voxsphere_mesh`]: resolves the configuration
//! from a file and command line flags, generates the sphere, optionally
//! caches it to disk and spins it on a turntable to time a frame.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod cli;
pub mod turntable;

use thiserror::Error;

use voxsphere_mesh::{CancelToken, GenerationStats, MergedMesh, MeshError, SphereConfig, SphereMeshGenerator};

pub use voxsphere_mesh as mesh;

use cli::Args;
use turntable::{run_preview, FrameStats};

/// Errors surfaced by the application.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration, generation or mesh file failure.
    #[error(transparent)]
    Mesh(#[from] MeshError),

    /// `--log-level` was not a valid filter directive.
    #[error("invalid log level '{0}'")]
    InvalidLogLevel(String),
}

/// Result type for the application.
pub type AppResult<T> = Result<T, AppError>;

/// What one invocation produced.
#[derive(Debug)]
pub struct RunReport {
    /// The generated mesh.
    pub mesh: MergedMesh,
    /// Generation counters.
    pub stats: GenerationStats,
    /// Compressed size of the written mesh file, if one was written.
    pub written_bytes: Option<usize>,
    /// Preview timing, if frames were requested.
    pub preview: Option<FrameStats>,
}

/// Resolves the configuration: the file if given, else defaults, then the
/// command line overrides.
///
/// # Errors
///
/// Returns the load error for a bad file. Validation happens when the
/// generator is built.
pub fn resolve_config(args: &Args) -> AppResult<SphereConfig> {
    let base = match &args.config {
        Some(path) => {
            tracing::info!("Using config file: {}", path.display());
            SphereConfig::load(path)?
        }
        None => SphereConfig::default(),
    };
    Ok(args.apply(base))
}

/// Runs one invocation.
///
/// # Errors
///
/// Returns any configuration, generation or file error.
pub fn run(args: &Args) -> AppResult<RunReport> {
    let config = resolve_config(args)?;
    tracing::info!(
        "Sphere r={} d={} ({:?}, {} lattice points)",
        config.radius,
        config.detail,
        config.execution,
        config.lattice_points()
    );

    let generator = SphereMeshGenerator::new(config)?;
    let (mesh, stats) = generator.generate_with_stats(&CancelToken::new())?;
    tracing::info!(
        "Culled {} of {} faces ({:.1}%)",
        stats.culled_faces,
        stats.culled_faces + stats.emitted_faces,
        stats.cull_ratio() * 100.0
    );

    let written_bytes = match &args.output {
        Some(path) => {
            let bytes = mesh.save_compressed(path)?;
            tracing::info!("Wrote {} ({} bytes)", path.display(), bytes);
            Some(bytes)
        }
        None => None,
    };

    let preview = (args.frames > 0).then(|| {
        let (frame_stats, _) = run_preview(&mesh, args.frames);
        tracing::info!(
            "Preview: {} frames, {:.2} ms/frame ({:.0} FPS), {} triangles",
            frame_stats.frames,
            frame_stats.average_frame_ms(),
            frame_stats.fps(),
            frame_stats.triangles
        );
        if !frame_stats.meets_target() {
            tracing::warn!("Preview below {} FPS target", turntable::TARGET_FPS);
        }
        frame_stats
    });

    Ok(RunReport {
        mesh,
        stats,
        written_bytes,
        preview,
    })
}
