use std::process::ExitCode;

use clap::Parser;
use dsu::cli::{Command, XtractCli};

fn main() -> ExitCode {
    let cli = XtractCli::parse();
    dsu::main_with(&cli.global, Command::Xtract(cli.args))
}
