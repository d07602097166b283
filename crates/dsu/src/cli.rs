//! Command line definitions for `dsu` and the standalone `xtract` binary

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use dsu_xtract::ForcePolicy;

use crate::commands::{backup, cln, hog, restore};

/// Options accepted by every command, before or after the subcommand name
#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// Print what would be done without doing it
    #[arg(
        short = 'n',
        long,
        global = true,
        env = "DSU_DRY_RUN",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub dry_run: bool,

    /// Whether to overwrite files and create directories: y, n or ask
    #[arg(
        short,
        long,
        global = true,
        value_name = "POLICY",
        env = "DSU_FORCE",
        default_value_t = ForcePolicy::Ask
    )]
    pub force: ForcePolicy,

    /// Answer yes to every question (same as --force y)
    #[arg(short, long, global = true, conflicts_with = "no")]
    pub yes: bool,

    /// Answer no to every question (same as --force n)
    #[arg(long, global = true)]
    pub no: bool,

    /// 0 silent, 1 errors, 2 warnings, 3 info, 4 verbose, 5 trace
    #[arg(
        long,
        global = true,
        value_name = "N",
        env = "DSU_LOG_LEVEL",
        default_value_t = 3,
        value_parser = clap::value_parser!(u8).range(0..=5)
    )]
    pub log_level: u8,

    /// Only report errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// When to color the output
    #[arg(long, global = true, value_enum, env = "DSU_COLOR", default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    Auto,
    Always,
    Never,
}

/// Shell utilities for everyday file maintenance
#[derive(Debug, Parser)]
#[command(name = "dsu", version, about, propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a timestamped backup of a file or directory
    Backup(backup::Args),

    /// Restore a file or directory from a timestamped backup
    Restore(restore::Args),

    /// Replace unusual characters in file names
    Cln(cln::Args),

    /// Show which entries of a directory take the most space
    Hog(hog::Args),

    /// Copy standard input to the clipboard
    Copy,

    /// Write the clipboard contents to standard output
    Paste,

    /// Extract or list an archive with the matching system tool
    Xtract(XtractArgs),
}

#[derive(Debug, Clone, Args)]
pub struct XtractArgs {
    /// List the archive's contents instead of extracting it
    #[arg(short, long)]
    pub list: bool,

    /// The archive to extract
    pub archive: PathBuf,

    /// Where to extract to, the current directory by default
    pub destination: Option<PathBuf>,
}

/// Extract or list an archive with the matching system tool
#[derive(Debug, Parser)]
#[command(name = "xtract", version, about)]
pub struct XtractCli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(flatten)]
    pub args: XtractArgs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definitions_are_consistent() {
        Cli::command().debug_assert();
        XtractCli::command().debug_assert();
    }

    #[test]
    fn test_global_args_after_subcommand() {
        let cli = Cli::try_parse_from(["dsu", "xtract", "a.tar.gz", "out", "-n", "--force", "n"])
            .unwrap();
        assert!(cli.global.dry_run);
        assert_eq!(cli.global.force, ForcePolicy::No);
        match cli.command {
            Command::Xtract(args) => {
                assert_eq!(args.archive, PathBuf::from("a.tar.gz"));
                assert_eq!(args.destination, Some(PathBuf::from("out")));
                assert!(!args.list);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_yes_and_no_conflict() {
        assert!(Cli::try_parse_from(["dsu", "-y", "--no", "copy"]).is_err());
    }

    #[test]
    fn test_log_level_is_bounded() {
        assert!(XtractCli::try_parse_from(["xtract", "--log-level", "6", "a.zip"]).is_err());
        let cli = XtractCli::try_parse_from(["xtract", "--log-level", "5", "-l", "a.zip"]).unwrap();
        assert_eq!(cli.global.log_level, 5);
        assert!(cli.args.list);
    }

    #[test]
    fn test_invalid_force_policy() {
        assert!(XtractCli::try_parse_from(["xtract", "--force", "maybe", "a.zip"]).is_err());
    }
}
