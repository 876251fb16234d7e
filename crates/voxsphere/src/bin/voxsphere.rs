//! VOXSPHERE command line entry point.

use std::process::ExitCode;

use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

use voxsphere::{cli, run, AppError, AppResult};

/// Used when neither `--log-level` nor `RUST_LOG` is set.
const DEFAULT_LOG_DIRECTIVES: &str = "voxsphere=info,voxsphere_mesh=info";

fn log_filter(level: Option<&str>) -> AppResult<EnvFilter> {
    match level {
        Some(level) => {
            let directive = level
                .parse::<Directive>()
                .map_err(|_| AppError::InvalidLogLevel(level.to_string()))?;
            Ok(EnvFilter::from_default_env().add_directive(directive))
        }
        None => Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVES))),
    }
}

fn init_logging(level: Option<&str>) -> AppResult<()> {
    tracing_subscriber::fmt().with_env_filter(log_filter(level)?).init();
    Ok(())
}

fn main() -> ExitCode {
    let args = cli::parse();

    if let Err(e) = init_logging(args.log_level.as_deref()) {
        eprintln!("voxsphere: {e}");
        return ExitCode::FAILURE;
    }

    tracing::info!("VOXSPHERE v{} starting...", env!("CARGO_PKG_VERSION"));

    match run(&args) {
        Ok(report) => {
            tracing::info!(
                "Done: {} vertices, {} triangles",
                report.mesh.vertex_count(),
                report.mesh.triangle_count()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("voxsphere: {e}");
            ExitCode::FAILURE
        }
    }
}
