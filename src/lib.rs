pub type F = f64;

pub mod quadric;
pub mod sym;

mod vec;
use vec::*;

mod manifold;

pub mod error;
pub use error::{ObjError, PipelineError, RemeshError, RemeshResult};

mod mesh;
pub use mesh::{MeshBuffers, MeshContext};

mod obj;
pub use obj::{load_obj, save_obj};

mod scale;
pub use scale::{BoundingBox, absolute_edge_length};

pub mod options;
pub use options::{RemeshConfig, RemesherOptions};

mod qem;
pub use qem::{SimplifyStats, simplify_mesh};

mod remesh;
pub use remesh::{RemeshStats, mean_edge_length, remesh, remesh_with_stats};

mod parameters;
pub use parameters::{Args, default_feature_angle, normalize_legacy_flags};

pub mod pipeline;
pub use pipeline::run;
