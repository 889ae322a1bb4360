use clap::Parser;
use factor_attrib::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
