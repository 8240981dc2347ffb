use clap::Parser;
use rulebench::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
