//! # Mesh Error Types
//!
//! All errors that can occur while configuring, generating or storing a
//! sphere mesh.

use thiserror::Error;

/// Errors that can occur in the mesh generator.
#[derive(Error, Debug)]
pub enum MeshError {
    /// Sphere radius is zero, negative or not finite.
    #[error("invalid configuration: radius must be a positive finite number, got {0}")]
    InvalidRadius(f64),

    /// Lattice step is zero, negative or not finite.
    #[error("invalid configuration: detail must be a positive finite number, got {0}")]
    InvalidDetail(f64),

    /// Fixed surface probe offset is zero, negative or not finite.
    #[error("invalid configuration: probe delta must be a positive finite number, got {0}")]
    InvalidProbe(f64),

    /// The lattice would exceed the configured point budget.
    #[error("invalid configuration: lattice of {points} points exceeds limit of {limit}")]
    LatticeTooLarge {
        /// Candidate points the sweep would visit.
        points: u64,
        /// Configured maximum.
        limit: u64,
    },

    /// Merged vertex count no longer fits a `u32` index.
    #[error("merged mesh has {vertices} vertices, more than a u32 index can address")]
    IndexOverflow {
        /// Vertex count that overflowed.
        vertices: usize,
    },

    /// Generation was abandoned through a cancel token.
    #[error("mesh generation cancelled")]
    Cancelled,

    /// Config file could not be parsed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Mesh file failed validation.
    #[error("corrupt mesh file: {0}")]
    CorruptMeshFile(String),

    /// Filesystem error while reading or writing.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl MeshError {
    /// Returns true for errors caused by the caller's configuration.
    #[must_use]
    pub const fn is_invalid_config(&self) -> bool {
        matches!(
            self,
            Self::InvalidRadius(_)
                | Self::InvalidDetail(_)
                | Self::InvalidProbe(_)
                | Self::LatticeTooLarge { .. }
                | Self::InvalidConfig(_)
        )
    }
}

/// Result type for mesh operations.
pub type MeshResult<T> = Result<T, MeshError>;
