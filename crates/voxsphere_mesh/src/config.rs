//! # Sphere Configuration
//!
//! The generator takes two scalars, `radius` and `detail`, plus a handful of
//! knobs that pick between the classic shell test and colouring and their
//! stricter variants. Configs are usually loaded once at startup from TOML:
//!
//! ```toml
//! radius = 6.0
//! detail = 0.1
//! probe = "reference"          # or "match-detail", or { fixed = 0.05 }
//! parity = "coordinate-sum"    # or "lattice-index"
//! anchor = "origin"            # or "negative-radius"
//! even_color = [0.0, 1.0, 0.0]
//! odd_color = [0.0, 0.5, 0.0]
//! execution = "sequential"     # or "parallel"
//! max_lattice_points = 50000000
//! ```
//!
//! Validation runs before any sampling. A `detail` larger than the sphere's
//! diameter is *not* rejected. The lattice collapses to a single point per
//! axis and the mesh is usually empty.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::colorer::ParityRule;
use crate::error::{MeshError, MeshResult};
use crate::lattice::{self, LatticeAnchor};
use crate::occupancy::SurfaceProbe;

/// Radius of the reference demo sphere.
pub const DEFAULT_RADIUS: f64 = 6.0;

/// Lattice step of the reference demo sphere.
pub const DEFAULT_DETAIL: f64 = 0.1;

/// Upper bound on candidate lattice points before generation is refused.
///
/// The reference sphere visits 121^3 (about 1.8 million) points.
pub const DEFAULT_MAX_LATTICE_POINTS: u64 = 50_000_000;

/// Even checkerboard colour (reference `0x00ff00`).
pub const DEFAULT_EVEN_COLOR: [f32; 3] = [0.0, 1.0, 0.0];

/// Odd checkerboard colour.
pub const DEFAULT_ODD_COLOR: [f32; 3] = [0.0, 0.5, 0.0];

/// How the lattice sweep is scheduled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionMode {
    /// One thread, one reusable scratch buffer.
    #[default]
    Sequential,
    /// Independent x-slabs on the rayon pool, merged in slab order.
    Parallel,
}

/// Complete generator configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SphereConfig {
    /// Sphere radius in world units.
    pub radius: f64,
    /// Voxel edge length and lattice step.
    pub detail: f64,
    /// Neighbour offset used by the surface probe.
    pub probe: SurfaceProbe,
    /// Checkerboard parity rule.
    pub parity: ParityRule,
    /// Where the lattice is pinned.
    pub anchor: LatticeAnchor,
    /// Colour for even-parity voxels.
    pub even_color: [f32; 3],
    /// Colour for odd-parity voxels.
    pub odd_color: [f32; 3],
    /// Sequential or parallel sweep.
    pub execution: ExecutionMode,
    /// Refuse lattices with more candidate points than this.
    pub max_lattice_points: u64,
}

impl Default for SphereConfig {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            detail: DEFAULT_DETAIL,
            probe: SurfaceProbe::default(),
            parity: ParityRule::default(),
            anchor: LatticeAnchor::default(),
            even_color: DEFAULT_EVEN_COLOR,
            odd_color: DEFAULT_ODD_COLOR,
            execution: ExecutionMode::default(),
            max_lattice_points: DEFAULT_MAX_LATTICE_POINTS,
        }
    }
}

impl SphereConfig {
    /// Creates a reference configuration for the given sphere.
    #[must_use]
    pub fn new(radius: f64, detail: f64) -> Self {
        Self {
            radius,
            detail,
            ..Self::default()
        }
    }

    /// Sets the execution mode.
    #[must_use]
    pub fn with_execution(mut self, execution: ExecutionMode) -> Self {
        self.execution = execution;
        self
    }

    /// Sets the surface probe.
    #[must_use]
    pub fn with_probe(mut self, probe: SurfaceProbe) -> Self {
        self.probe = probe;
        self
    }

    /// Sets the parity rule.
    #[must_use]
    pub fn with_parity(mut self, parity: ParityRule) -> Self {
        self.parity = parity;
        self
    }

    /// Sets the lattice anchor.
    #[must_use]
    pub fn with_anchor(mut self, anchor: LatticeAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    /// Parses a config from TOML text. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for malformed TOML or unknown keys. The parsed
    /// values are not validated here; see [`SphereConfig::validate`].
    pub fn from_toml_str(text: &str) -> MeshResult<Self> {
        toml::from_str(text).map_err(|e| MeshError::InvalidConfig(format!("failed to parse TOML: {e}")))
    }

    /// Loads and validates a config file.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read, `InvalidConfig` if it cannot
    /// be parsed, or any validation error.
    pub fn load(path: &Path) -> MeshResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        config.validate()?;
        tracing::debug!("loaded sphere config from {}", path.display());
        Ok(config)
    }

    /// Serializes the config to TOML.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if serialization fails (non-finite floats).
    pub fn to_toml_string(&self) -> MeshResult<String> {
        toml::to_string(self).map_err(|e| MeshError::InvalidConfig(format!("failed to write TOML: {e}")))
    }

    /// Checks the configuration before any sampling happens.
    ///
    /// # Errors
    ///
    /// - `InvalidRadius` if `radius <= 0` or not finite
    /// - `InvalidDetail` if `detail <= 0` or not finite
    /// - `InvalidProbe` if a fixed probe offset is `<= 0` or not finite
    /// - `LatticeTooLarge` if the sweep would exceed `max_lattice_points`
    pub fn validate(&self) -> MeshResult<()> {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(MeshError::InvalidRadius(self.radius));
        }
        if !self.detail.is_finite() || self.detail <= 0.0 {
            return Err(MeshError::InvalidDetail(self.detail));
        }
        if let SurfaceProbe::Fixed(delta) = self.probe {
            if !delta.is_finite() || delta <= 0.0 {
                return Err(MeshError::InvalidProbe(delta));
            }
        }

        let points = self.lattice_points();
        if points > self.max_lattice_points {
            return Err(MeshError::LatticeTooLarge {
                points,
                limit: self.max_lattice_points,
            });
        }
        Ok(())
    }

    /// Upper estimate of candidate points in the triple sweep.
    #[must_use]
    pub fn lattice_points(&self) -> u64 {
        let per_axis = lattice::estimated_axis_len(self.radius, self.detail);
        per_axis.saturating_mul(per_axis).saturating_mul(per_axis)
    }

    /// True when one voxel is wider than the whole sphere.
    ///
    /// The sweep then visits a single value per axis. Anchored at
    /// `-radius` that point is `radius * sqrt(3)` from the origin and never
    /// occupied; anchored at the origin it is occupied only if the probe
    /// reaches past the radius.
    #[must_use]
    pub fn exceeds_diameter(&self) -> bool {
        self.detail > 2.0 * self.radius
    }

    /// Neighbour offset the surface probe uses for this config.
    #[must_use]
    pub fn probe_delta(&self) -> f64 {
        self.probe.delta(self.detail)
    }
}
