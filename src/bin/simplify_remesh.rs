use std::process::ExitCode;

use clap::Parser;
use simplify_remesh::{Args, normalize_legacy_flags, run};

fn init_logger(level: log::LevelFilter) {
    let mut builder = env_logger::Builder::new();
    builder.target(env_logger::Target::Stderr);
    builder.filter_level(level);
    builder.parse_default_env();
    if let Err(err) = builder.try_init() {
        eprintln!("Failed to initialize logger: {err}");
    }
}

pub fn main() -> ExitCode {
    let args = Args::parse_from(normalize_legacy_flags(std::env::args()));
    init_logger(args.log_level);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}
