//! Error types for OBJ I/O, remeshing and the pipeline.

use std::path::PathBuf;

use thiserror::Error;

use super::F;

/// Errors reading or writing OBJ files.
#[derive(Debug, Error)]
pub enum ObjError {
    #[error("failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A face record without exactly three corners.
    #[error("{}:{line}: input not a triangle mesh (face with {corners} corners)", .path.display())]
    NotTriangulated {
        path: PathBuf,
        line: usize,
        corners: usize,
    },

    #[error("{}:{line}: malformed vertex record", .path.display())]
    MalformedVertex { path: PathBuf, line: usize },

    #[error("{}:{line}: malformed face index `{token}`", .path.display())]
    MalformedIndex {
        path: PathBuf,
        line: usize,
        token: String,
    },

    #[error("{}: face index {index} out of range for {vertices} vertices", .path.display())]
    IndexOutOfRange {
        path: PathBuf,
        index: i64,
        vertices: usize,
    },

    #[error("{}: face {face} repeats a vertex", .path.display())]
    DegenerateFace { path: PathBuf, face: usize },

    #[error("failed to create {}: {source}", .path.display())]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Errors raised by the remeshing engine.
#[derive(Debug, Error)]
pub enum RemeshError {
    #[error("mesh has no vertices")]
    EmptyMesh,

    #[error("mesh has no faces")]
    NoFaces,

    #[error("face index {0} out of range")]
    IndexOutOfRange(usize),

    #[error("invalid target edge length: {0} (must be > 0)")]
    InvalidEdgeLength(F),

    #[error("invalid edge length bounds: min {min} must not exceed max {max}")]
    InvalidEdgeBounds { min: F, max: F },

    #[error("invalid iteration count: {0} (must be >= 1)")]
    InvalidIterations(u32),

    #[error("relative edge error {0} is not supported, use absolute edge lengths (-1)")]
    UnsupportedRelativeError(F),

    #[error("unknown remesher option `{0}`")]
    UnknownOption(String),

    #[error("invalid value `{value}` for remesher option `{key}`")]
    InvalidOption { key: String, value: String },
}

/// Result type for remeshing operations.
pub type RemeshResult<T> = std::result::Result<T, RemeshError>;

/// Terminal failures of a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("ratio must be between 0 and 1 (got {0})")]
    InvalidRatio(F),

    #[error("failed to load mesh: {0}")]
    Load(#[source] ObjError),

    #[error("input mesh is degenerate: {0}")]
    DegenerateMesh(String),

    #[error("unable to reduce mesh ({triangles} triangles)")]
    NoReduction { triangles: usize },

    #[error("remeshing failed: {0}")]
    Remesh(#[from] RemeshError),

    #[error("failed to save mesh: {0}")]
    Write(#[source] ObjError),
}

impl PipelineError {
    /// Process exit status for this failure, distinct per failure class.
    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineError::InvalidRatio(_) => 2,
            PipelineError::Load(_) => 3,
            PipelineError::DegenerateMesh(_) => 4,
            PipelineError::NoReduction { .. } => 5,
            PipelineError::Remesh(_) => 6,
            PipelineError::Write(_) => 7,
        }
    }
}
