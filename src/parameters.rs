pub use super::F;
use clap::Parser;
use log::LevelFilter;

use super::error::PipelineError;

/// Feature angle matching a dihedral cosine of 0.707.
pub fn default_feature_angle() -> F {
    (0.707 as F).acos().to_degrees()
}

/// Triangle mesh simplification and isotropic remeshing.
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct Args {
    /// Input mesh file.
    #[arg(long, required = true)]
    pub input: String,

    /// Output file of the remeshing stage.
    #[arg(long, required = true)]
    pub outputremesh: String,

    /// Output file of the simplification stage.
    #[arg(long, required = true)]
    pub outputsimp: String,

    /// Target edge length, relative to the longest side of the bounding box.
    #[arg(long, default_value_t = 1. / 50.)]
    pub size: F,

    /// Dihedral angle in degrees above which an edge is kept as a feature.
    #[arg(long, default_value_t = default_feature_angle())]
    pub feat: F,

    /// Number of remeshing iterations.
    #[arg(long, default_value_t = 10)]
    pub iters: u32,

    /// Run the remeshing stage.
    #[arg(long)]
    pub remesh: bool,

    /// Run the simplification stage.
    #[arg(long)]
    pub simplify: bool,

    /// Approximate ratio of output/input tris.
    #[arg(long, default_value_t = 0.5, allow_negative_numbers = true)]
    pub ratio: F,

    /// Aggressiveness of the decimation, higher is faster but coarser.
    #[arg(long, default_value_t = 7.)]
    pub agsv: F,

    /// Log verbosity, overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::Info)]
    pub log_level: LevelFilter,
}

const LONG_FLAGS: [&str; 11] = [
    "input",
    "outputremesh",
    "outputsimp",
    "size",
    "feat",
    "iters",
    "remesh",
    "simplify",
    "ratio",
    "agsv",
    "log-level",
];

/// Rewrites single dash long flags (`-input a.obj`) to `--input a.obj`.
/// Anything else, including negative numbers, is passed through unchanged.
pub fn normalize_legacy_flags<I, S>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    args.into_iter()
        .map(Into::into)
        .map(|arg| match arg.strip_prefix('-') {
            Some(name) if LONG_FLAGS.contains(&name.split('=').next().unwrap_or(name)) => {
                format!("-{arg}")
            }
            _ => arg,
        })
        .collect()
}

impl Args {
    /// Checks values clap cannot, before any file is touched.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.simplify && !(self.ratio > 0.) {
            return Err(PipelineError::InvalidRatio(self.ratio));
        }
        Ok(())
    }
}
