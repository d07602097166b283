use std::process::ExitCode;

use clap::Parser;
use dsu::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    dsu::main_with(&cli.global, cli.command)
}
