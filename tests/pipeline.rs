use std::path::{Path, PathBuf};

use clap::Parser;
use simplify_remesh::{Args, PipelineError, load_obj, normalize_legacy_flags, run, save_obj};

const CUBE: &str = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
v 0 0 1
v 1 0 1
v 1 1 1
v 0 1 1
f 1 3 2
f 1 4 3
f 5 6 7
f 5 7 8
f 1 2 6
f 1 6 5
f 2 3 7
f 2 7 6
f 3 4 8
f 3 8 7
f 4 1 5
f 4 5 8
";

struct Files {
    _dir: tempfile::TempDir,
    input: PathBuf,
    simp: PathBuf,
    remesh: PathBuf,
}

fn files(contents: &str) -> Files {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.obj");
    std::fs::write(&input, contents).unwrap();
    Files {
        simp: dir.path().join("simp.obj"),
        remesh: dir.path().join("remesh.obj"),
        input,
        _dir: dir,
    }
}

fn args(f: &Files, extra: &[&str]) -> Args {
    let p = |p: &Path| p.to_str().unwrap().to_string();
    let mut argv = vec![
        "simplify_remesh".to_string(),
        "-input".into(),
        p(&f.input),
        "-outputremesh".into(),
        p(&f.remesh),
        "-outputsimp".into(),
        p(&f.simp),
    ];
    argv.extend(extra.iter().map(|s| s.to_string()));
    Args::try_parse_from(normalize_legacy_flags(argv)).unwrap()
}

#[test]
fn simplify_cube() {
    let f = files(CUBE);
    run(&args(&f, &["-simplify", "-ratio", "0.5"])).unwrap();

    let out = load_obj(&f.simp).unwrap();
    assert!(out.num_triangles() < 12);
    assert!(out.num_triangles() > 0);
    assert!(out.num_vertices() <= 8);
    assert!(!f.remesh.exists());
}

#[test]
fn degenerate_mesh_is_rejected() {
    let f = files("v 0 0 0\nv 1 0 0\n");
    for flag in ["-simplify", "-remesh"] {
        let err = run(&args(&f, &[flag])).unwrap_err();
        assert!(matches!(err, PipelineError::DegenerateMesh(_)));
        assert_eq!(err.exit_code(), 4);
    }
    assert!(!f.simp.exists());
    assert!(!f.remesh.exists());
}

#[test]
fn quad_fails_to_load() {
    let f = files("v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n");
    let err = run(&args(&f, &["-simplify", "-remesh"])).unwrap_err();
    assert!(matches!(err, PipelineError::Load(_)));
    assert_eq!(err.exit_code(), 3);
    assert!(!f.simp.exists());
}

#[test]
fn invalid_ratio_before_io() {
    let f = files(CUBE);
    std::fs::remove_file(&f.input).unwrap();
    let err = run(&args(&f, &["-simplify", "-ratio", "0"])).unwrap_err();
    assert!(matches!(err, PipelineError::InvalidRatio(_)));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn remesh_cube() {
    let f = files(CUBE);
    run(&args(&f, &["-remesh", "-size", "0.25", "-iters", "3"])).unwrap();

    let out = load_obj(&f.remesh).unwrap();
    assert!(out.num_triangles() > 12);
    assert!(out.tris.iter().all(|&i| i < out.num_vertices()));
    for p in out.vertices() {
        assert!(p.iter().all(|c| (-1e-9..=1. + 1e-9).contains(c)));
    }
    assert!(!f.simp.exists());
}

#[test]
fn both_stages() {
    let f = files(CUBE);
    run(&args(&f, &["-simplify", "-remesh", "-size", "0.5"])).unwrap();
    assert!(load_obj(&f.simp).unwrap().num_triangles() < 12);
    assert!(load_obj(&f.remesh).unwrap().num_triangles() >= 12);
}

#[test]
fn read_write_round_trip() {
    let f = files(CUBE);
    let mesh = load_obj(&f.input).unwrap();
    save_obj(&f.simp, &mesh).unwrap();
    assert_eq!(std::fs::read_to_string(&f.simp).unwrap(), CUBE);
    assert_eq!(load_obj(&f.simp).unwrap(), mesh);
}
