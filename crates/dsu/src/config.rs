//! Resolved settings shared by every command

use console::Term;
use dsu_xtract::ForcePolicy;
use tracing::level_filters::LevelFilter;

use crate::cli::{ColorChoice, GlobalArgs};

/// How much gets logged, from nothing to everything
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Verbose,
    Trace,
}

impl LogLevel {
    pub fn from_number(level: u8) -> Self {
        match level {
            0 => Self::Off,
            1 => Self::Error,
            2 => Self::Warn,
            3 => Self::Info,
            4 => Self::Verbose,
            _ => Self::Trace,
        }
    }

    pub fn filter(self) -> LevelFilter {
        match self {
            Self::Off => LevelFilter::OFF,
            Self::Error => LevelFilter::ERROR,
            Self::Warn => LevelFilter::WARN,
            Self::Info => LevelFilter::INFO,
            Self::Verbose => LevelFilter::DEBUG,
            Self::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub log_level: LogLevel,
    pub color: bool,
    pub force: ForcePolicy,
    pub dry_run: bool,
}

impl Config {
    pub fn from_args(args: &GlobalArgs) -> Self {
        let force = if args.yes {
            ForcePolicy::Yes
        } else if args.no {
            ForcePolicy::No
        } else {
            args.force
        };

        let log_level = if args.quiet {
            LogLevel::Error
        } else {
            LogLevel::from_number(args.log_level)
        };

        let color = match args.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => {
                std::env::var_os("NO_COLOR").is_none()
                    && Term::stderr().features().colors_supported()
            }
        };

        Self {
            log_level,
            color,
            force,
            dry_run: args.dry_run,
        }
    }

    /// Spinners only make sense on an interactive stderr with info output enabled
    pub fn show_progress(&self) -> bool {
        !self.dry_run && self.log_level >= LogLevel::Info && Term::stderr().is_term()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::XtractCli;
    use clap::Parser;

    fn config(args: &[&str]) -> Config {
        let mut argv = vec!["xtract"];
        argv.extend_from_slice(args);
        argv.push("a.tar");
        Config::from_args(&XtractCli::try_parse_from(argv).unwrap().global)
    }

    #[test]
    fn test_yes_and_no_override_force() {
        assert_eq!(config(&["--force", "n", "-y"]).force, ForcePolicy::Yes);
        assert_eq!(config(&["--force", "y", "--no"]).force, ForcePolicy::No);
        assert_eq!(config(&["--force", "y"]).force, ForcePolicy::Yes);
    }

    #[test]
    fn test_quiet_keeps_errors() {
        assert_eq!(config(&["-q", "--log-level", "5"]).log_level, LogLevel::Error);
        assert_eq!(config(&["--log-level", "0"]).log_level, LogLevel::Off);
        assert_eq!(config(&["--log-level", "4"]).log_level.filter(), LevelFilter::DEBUG);
    }

    #[test]
    fn test_explicit_color_choice() {
        assert!(config(&["--color", "always"]).color);
        assert!(!config(&["--color", "never"]).color);
    }
}
