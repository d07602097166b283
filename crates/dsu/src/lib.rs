//! The `dsu` toolbox: backup, restore, cln, hog, copy, paste and xtract

pub mod cli;
pub mod commands;
pub mod config;
pub mod interrupt;
pub mod logging;
pub mod prompt;

use std::process::ExitCode;

use dsu_xtract::CleanupRegistry;

use crate::{
    cli::{Command, GlobalArgs},
    commands::Context,
    config::Config,
};

/// Set up logging and run `command`, turning the outcome into an exit code
pub fn main_with(global: &GlobalArgs, command: Command) -> ExitCode {
    let config = Config::from_args(global);
    logging::init(&config);

    let cleanup = CleanupRegistry::new();
    let registry = cleanup.clone();
    interrupt::run_interruptible(cleanup, move || {
        let ctx = Context::new(config, registry);
        commands::execute(command, &ctx)
    })
}
