//! Runs the simplification and remeshing stages over an input file.

use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};

use log::{debug, info};

use super::error::{PipelineError, RemeshResult};
use super::mesh::{MeshBuffers, MeshContext};
use super::obj::{load_obj, save_obj};
use super::options::{RemeshConfig, RemesherOptions};
use super::parameters::Args;
use super::scale::BoundingBox;
use super::{F, remesh, simplify_mesh};

/// Decimates a mesh context in place towards a triangle count.
pub trait Decimate {
    fn decimate(&self, ctx: &mut MeshContext, target_count: usize, aggressiveness: F, verbose: bool);
}

/// Produces a new mesh from an option set and input buffers.
pub trait Remesh {
    fn remesh(&self, opts: &RemesherOptions, input: &MeshBuffers) -> RemeshResult<MeshBuffers>;
}

/// Quadric error edge collapse decimation.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuadricDecimator;

impl Decimate for QuadricDecimator {
    fn decimate(&self, ctx: &mut MeshContext, target_count: usize, aggressiveness: F, verbose: bool) {
        simplify_mesh(ctx, target_count, aggressiveness, verbose);
    }
}

/// Feature preserving isotropic remeshing.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsotropicRemesher;

impl Remesh for IsotropicRemesher {
    fn remesh(&self, opts: &RemesherOptions, input: &MeshBuffers) -> RemeshResult<MeshBuffers> {
        remesh(opts, input)
    }
}

/// User facing settings of the remeshing stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemeshSettings {
    /// Target edge length relative to the longest bounding box side.
    pub relative_size: F,
    pub feature_angle_deg: F,
    pub iterations: u32,
}

impl From<&Args> for RemeshSettings {
    fn from(args: &Args) -> Self {
        Self {
            relative_size: args.size,
            feature_angle_deg: args.feat,
            iterations: args.iters,
        }
    }
}

/// Target triangle count for a reduction ratio, clamping ratios above 1.
pub fn resolve_target_count(triangles: usize, ratio: F) -> Result<usize, PipelineError> {
    if !(ratio > 0.) {
        return Err(PipelineError::InvalidRatio(ratio));
    }
    Ok((triangles as F * ratio.min(1.)).round() as usize)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimplifyReport {
    pub input_vertices: usize,
    pub input_triangles: usize,
    pub output_vertices: usize,
    pub output_triangles: usize,
    pub elapsed: Duration,
}

impl SimplifyReport {
    /// Fraction of triangles removed.
    pub fn reduction(&self) -> F {
        1. - self.output_triangles as F / self.input_triangles.max(1) as F
    }
}

impl fmt::Display for SimplifyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Input: {} vertices, {} triangles",
            self.input_vertices, self.input_triangles
        )?;
        write!(
            f,
            "Output: {} vertices, {} triangles ({:.2}% reduction; {:.4} sec)",
            self.output_vertices,
            self.output_triangles,
            100. * self.reduction(),
            self.elapsed.as_secs_f64()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemeshReport {
    pub input_vertices: usize,
    pub input_triangles: usize,
    pub output_vertices: usize,
    pub output_triangles: usize,
    /// Absolute target edge length handed to the engine.
    pub edge_length: F,
    pub elapsed: Duration,
}

impl fmt::Display for RemeshReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Input: {} vertices, {} triangles",
            self.input_vertices, self.input_triangles
        )?;
        write!(
            f,
            "Remeshed: {} vertices, {} triangles (edge length {:.6}; {:.4} sec)",
            self.output_vertices,
            self.output_triangles,
            self.edge_length,
            self.elapsed.as_secs_f64()
        )
    }
}

/// Loads `input`, decimates it to `ratio` of its triangles and writes `output`.
pub fn simplify_stage(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    ratio: F,
    aggressiveness: F,
    engine: &impl Decimate,
) -> Result<SimplifyReport, PipelineError> {
    let mut ctx = MeshContext::load_obj(input).map_err(PipelineError::Load)?;
    let (input_vertices, input_triangles) = (ctx.num_vertices(), ctx.num_triangles());
    if input_vertices < 3 || input_triangles < 3 {
        return Err(PipelineError::DegenerateMesh(format!(
            "{input_vertices} vertices and {input_triangles} triangles"
        )));
    }

    let target = resolve_target_count(input_triangles, ratio)?;
    debug!("Simplifying {input_triangles} triangles towards {target}");
    let start = Instant::now();
    engine.decimate(&mut ctx, target, aggressiveness, true);
    let elapsed = start.elapsed();
    if ctx.num_triangles() >= input_triangles {
        return Err(PipelineError::NoReduction {
            triangles: input_triangles,
        });
    }

    save_obj(output, &ctx.to_buffers()).map_err(PipelineError::Write)?;
    Ok(SimplifyReport {
        input_vertices,
        input_triangles,
        output_vertices: ctx.num_vertices(),
        output_triangles: ctx.num_triangles(),
        elapsed,
    })
}

/// Loads `input`, remeshes it to an edge length relative to its size and writes `output`.
pub fn remesh_stage(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    settings: &RemeshSettings,
    engine: &impl Remesh,
) -> Result<RemeshReport, PipelineError> {
    let mesh = load_obj(input).map_err(PipelineError::Load)?;
    if mesh.num_vertices() < 3 || mesh.tris.len() < 3 {
        return Err(PipelineError::DegenerateMesh(format!(
            "{} vertices and {} indices",
            mesh.num_vertices(),
            mesh.tris.len()
        )));
    }

    let extent = BoundingBox::from_coords(&mesh.coords)
        .map(|bb| bb.longest_extent())
        .unwrap_or(0.);
    if !(extent > 0.) {
        return Err(PipelineError::DegenerateMesh(
            "all vertices coincide".to_string(),
        ));
    }

    let cfg = RemeshConfig::assemble(
        extent,
        settings.relative_size,
        settings.feature_angle_deg,
        settings.iterations,
    );
    debug!("Remesher options: {:?}", cfg);
    let start = Instant::now();
    let out = engine.remesh(&cfg.to_options(), &mesh)?;
    let elapsed = start.elapsed();

    save_obj(output, &out).map_err(PipelineError::Write)?;
    Ok(RemeshReport {
        input_vertices: mesh.num_vertices(),
        input_triangles: mesh.num_triangles(),
        output_vertices: out.num_vertices(),
        output_triangles: out.num_triangles(),
        edge_length: cfg.target_edge_length,
        elapsed,
    })
}

/// Runs the enabled stages in order, stopping at the first failure.
pub fn run(args: &Args) -> Result<(), PipelineError> {
    run_with(args, &QuadricDecimator, &IsotropicRemesher)
}

pub fn run_with(
    args: &Args,
    decimator: &impl Decimate,
    remesher: &impl Remesh,
) -> Result<(), PipelineError> {
    args.validate()?;
    if !args.simplify && !args.remesh {
        info!("Neither --simplify nor --remesh given, nothing to do");
    }

    if args.simplify {
        info!("Simplifying {}", args.input);
        let report = simplify_stage(&args.input, &args.outputsimp, args.ratio, args.agsv, decimator)?;
        println!("{report}");
        info!("Wrote {}", args.outputsimp);
    }

    if args.remesh {
        info!("Remeshing {}", args.input);
        let report = remesh_stage(
            &args.input,
            &args.outputremesh,
            &RemeshSettings::from(args),
            remesher,
        )?;
        println!("{report}");
        info!("Wrote {}", args.outputremesh);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemeshError;
    use std::cell::Cell;

    #[derive(Default)]
    struct NoOp {
        calls: Cell<usize>,
        target: Cell<usize>,
    }

    impl Decimate for NoOp {
        fn decimate(&self, _: &mut MeshContext, target_count: usize, _: F, _: bool) {
            self.calls.set(self.calls.get() + 1);
            self.target.set(target_count);
        }
    }

    /// Drops the last triangle.
    struct DropOne;

    impl Decimate for DropOne {
        fn decimate(&self, ctx: &mut MeshContext, _: usize, _: F, verbose: bool) {
            assert!(verbose);
            ctx.f.pop();
        }
    }

    #[derive(Default)]
    struct Recording {
        calls: Cell<usize>,
        edge_length: Cell<F>,
    }

    impl Remesh for Recording {
        fn remesh(&self, opts: &RemesherOptions, input: &MeshBuffers) -> RemeshResult<MeshBuffers> {
            self.calls.set(self.calls.get() + 1);
            self.edge_length
                .set(RemeshConfig::from_options(opts)?.target_edge_length);
            Ok(input.clone())
        }
    }

    /// Drops the last triangle after a fixed delay.
    struct SlowDropOne(Duration);

    impl Decimate for SlowDropOne {
        fn decimate(&self, ctx: &mut MeshContext, _: usize, _: F, _: bool) {
            std::thread::sleep(self.0);
            ctx.f.pop();
        }
    }

    struct Failing;

    impl Remesh for Failing {
        fn remesh(&self, _: &RemesherOptions, _: &MeshBuffers) -> RemeshResult<MeshBuffers> {
            Err(RemeshError::NoFaces)
        }
    }

    fn write_cube(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("cube.obj");
        save_obj(&path, &crate::qem::tests::cube().to_buffers()).unwrap();
        path
    }

    #[test]
    fn test_target_count() {
        assert_eq!(resolve_target_count(12, 0.5).unwrap(), 6);
        assert_eq!(resolve_target_count(12, 2.).unwrap(), 12);
        assert_eq!(resolve_target_count(3, 0.5).unwrap(), 2);
        assert!(matches!(
            resolve_target_count(12, 0.),
            Err(PipelineError::InvalidRatio(_))
        ));
        assert!(resolve_target_count(12, -0.5).is_err());
        assert!(resolve_target_count(12, F::NAN).is_err());
    }

    #[test]
    fn test_no_reduction() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_cube(dir.path());
        let out = dir.path().join("out.obj");
        let engine = NoOp::default();
        let err = simplify_stage(&input, &out, 0.5, 7., &engine).unwrap_err();
        assert!(matches!(err, PipelineError::NoReduction { triangles: 12 }));
        assert_eq!(err.exit_code(), 5);
        assert_eq!(engine.calls.get(), 1);
        assert_eq!(engine.target.get(), 6);
        assert!(!out.exists());
    }

    #[test]
    fn test_bad_ratio_skips_engine() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_cube(dir.path());
        let out = dir.path().join("out.obj");
        for ratio in [0., -1.] {
            let engine = NoOp::default();
            let err = simplify_stage(&input, &out, ratio, 7., &engine).unwrap_err();
            assert!(matches!(err, PipelineError::InvalidRatio(_)));
            assert_eq!(engine.calls.get(), 0);
        }
    }

    #[test]
    fn test_ratio_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_cube(dir.path());
        let engine = NoOp::default();
        let _ = simplify_stage(&input, dir.path().join("out.obj"), 3., 7., &engine);
        assert_eq!(engine.target.get(), 12);
    }

    #[test]
    fn test_simplify_report() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_cube(dir.path());
        let out = dir.path().join("out.obj");
        let report = simplify_stage(&input, &out, 0.5, 7., &DropOne).unwrap();
        assert_eq!(report.input_triangles, 12);
        assert_eq!(report.output_triangles, 11);
        assert!(out.exists());
        let text = report.to_string();
        assert!(text.starts_with("Input: 8 vertices, 12 triangles"));
        assert!(text.contains("8.33% reduction"));
    }

    #[test]
    fn test_simplify_times_engine() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_cube(dir.path());
        let delay = Duration::from_millis(20);
        let report =
            simplify_stage(&input, dir.path().join("out.obj"), 0.5, 7., &SlowDropOne(delay)).unwrap();
        assert!(report.elapsed >= delay);
        assert!(report.elapsed < delay + Duration::from_secs(5));
    }

    #[test]
    fn test_degenerate_input_skips_engines() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("segment.obj");
        std::fs::write(&input, "v 0 0 0\nv 1 0 0\n").unwrap();
        let out = dir.path().join("out.obj");

        let decimator = NoOp::default();
        let err = simplify_stage(&input, &out, 0.5, 7., &decimator).unwrap_err();
        assert!(matches!(err, PipelineError::DegenerateMesh(_)));
        assert_eq!(decimator.calls.get(), 0);

        let remesher = Recording::default();
        let settings = RemeshSettings {
            relative_size: 0.1,
            feature_angle_deg: 45.,
            iterations: 2,
        };
        let err = remesh_stage(&input, &out, &settings, &remesher).unwrap_err();
        assert_eq!(err.exit_code(), 4);
        assert_eq!(remesher.calls.get(), 0);
        assert!(!out.exists());
    }

    #[test]
    fn test_remesh_stage_scales_length() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_cube(dir.path());
        let out = dir.path().join("out.obj");
        let settings = RemeshSettings {
            relative_size: 0.1,
            feature_angle_deg: 45.,
            iterations: 2,
        };
        let engine = Recording::default();
        let report = remesh_stage(&input, &out, &settings, &engine).unwrap();
        assert_eq!(engine.calls.get(), 1);
        assert!((engine.edge_length.get() - 0.1).abs() < 1e-12);
        assert_eq!(report.output_triangles, 12);
        assert_eq!(load_obj(&out).unwrap().num_triangles(), 12);
    }

    #[test]
    fn test_remesh_failure() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_cube(dir.path());
        let out = dir.path().join("out.obj");
        let settings = RemeshSettings {
            relative_size: 0.1,
            feature_angle_deg: 45.,
            iterations: 2,
        };
        let err = remesh_stage(&input, &out, &settings, &Failing).unwrap_err();
        assert_eq!(err.exit_code(), 6);
        assert_eq!(err.to_string(), "remeshing failed: mesh has no faces");
        assert!(!out.exists());
    }

    #[test]
    fn test_coincident_vertices() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("point.obj");
        std::fs::write(&input, "v 1 1 1\nv 1 1 1\nv 1 1 1\nf 1 2 3\n").unwrap();
        let engine = Recording::default();
        let settings = RemeshSettings {
            relative_size: 0.1,
            feature_angle_deg: 45.,
            iterations: 2,
        };
        let err = remesh_stage(&input, dir.path().join("out.obj"), &settings, &engine).unwrap_err();
        assert!(matches!(err, PipelineError::DegenerateMesh(_)));
        assert_eq!(engine.calls.get(), 0);
    }
}
