//! Command line arguments.

use std::path::PathBuf;

use clap::Parser;

use voxsphere_mesh::{ExecutionMode, SphereConfig};

/// VOXSPHERE - generates a voxelized sphere mesh.
#[derive(Parser, Debug, Default)]
#[command(name = "voxsphere", version, about)]
pub struct Args {
    /// Config file path. Defaults apply when omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Sphere radius override.
    #[arg(short = 'r', long)]
    pub radius: Option<f64>,

    /// Voxel size override.
    #[arg(short = 'd', long)]
    pub detail: Option<f64>,

    /// Generate x-slabs in parallel.
    #[arg(long)]
    pub parallel: bool,

    /// Write the compressed mesh here.
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Run a headless turntable preview for this many frames.
    #[arg(long, default_value_t = 0)]
    pub frames: u32,

    /// Log level override (debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Args {
    /// Applies the command line overrides on top of `config`.
    #[must_use]
    pub fn apply(&self, mut config: SphereConfig) -> SphereConfig {
        if let Some(radius) = self.radius {
            config.radius = radius;
        }
        if let Some(detail) = self.detail {
            config.detail = detail;
        }
        if self.parallel {
            config.execution = ExecutionMode::Parallel;
        }
        config
    }
}

/// Parses the process arguments.
#[must_use]
pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from([
            "voxsphere",
            "--radius",
            "2.5",
            "-d",
            "0.25",
            "--parallel",
            "--frames",
            "30",
            "-o",
            "sphere.vxsm",
        ])
        .unwrap();

        assert_eq!(args.radius, Some(2.5));
        assert_eq!(args.detail, Some(0.25));
        assert!(args.parallel);
        assert_eq!(args.frames, 30);
        assert_eq!(args.output, Some(PathBuf::from("sphere.vxsm")));
    }

    #[test]
    fn test_overrides_apply_on_top_of_file() {
        let file = SphereConfig::new(6.0, 0.1);
        let args = Args {
            detail: Some(0.5),
            parallel: true,
            ..Args::default()
        };
        let config = args.apply(file);
        assert_eq!(config.radius, 6.0);
        assert_eq!(config.detail, 0.5);
        assert_eq!(config.execution, ExecutionMode::Parallel);
    }

    #[test]
    fn test_no_flags_keeps_config() {
        let args = Args::try_parse_from(["voxsphere"]).unwrap();
        assert_eq!(args.apply(SphereConfig::default()), SphereConfig::default());
        assert_eq!(args.frames, 0);
    }
}
