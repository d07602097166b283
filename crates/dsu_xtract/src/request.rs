//! The request handed to the validator, and the policies that travel with it

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// How destructive or directory-creating actions are confirmed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ForcePolicy {
    /// Proceed without asking
    Yes,
    /// Refuse without asking
    No,
    /// Ask once on the terminal, defaulting to no
    #[default]
    Ask,
}

impl ForcePolicy {
    /// Resolve the policy for one question, consulting `confirm` only for [`ForcePolicy::Ask`]
    pub fn allows(&self, confirm: &dyn Confirm, question: &str) -> bool {
        match self {
            Self::Yes => true,
            Self::No => false,
            Self::Ask => confirm.confirm(question),
        }
    }
}

impl FromStr for ForcePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "y" | "yes" => Ok(Self::Yes),
            "n" | "no" => Ok(Self::No),
            "ask" | "auto" => Ok(Self::Ask),
            other => Err(format!("invalid force policy `{other}` (expected y, n or ask)")),
        }
    }
}

impl fmt::Display for ForcePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Yes => "yes",
            Self::No => "no",
            Self::Ask => "ask",
        })
    }
}

/// A yes/no question put to the user. Implementations must answer `false` when in doubt.
pub trait Confirm {
    fn confirm(&self, question: &str) -> bool;
}

/// Answers every question the same way, for non-interactive callers and tests
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl Confirm for FixedAnswer {
    fn confirm(&self, _question: &str) -> bool {
        self.0
    }
}

/// What the caller wants done with the archive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    List,
    #[default]
    Extract,
}

/// A single `xtract` invocation, as parsed from the command line
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub mode: Mode,
    pub force: ForcePolicy,
    pub dry_run: bool,
}

impl ExtractionRequest {
    /// An extraction of `source` into `destination` with the default (ask) policy
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            mode: Mode::Extract,
            force: ForcePolicy::Ask,
            dry_run: false,
        }
    }

    /// A listing of `source`; the destination is never consulted
    pub fn list(source: impl Into<PathBuf>) -> Self {
        Self {
            mode: Mode::List,
            ..Self::new(source, ".")
        }
    }

    pub fn with_force(mut self, force: ForcePolicy) -> Self {
        self.force = force;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("y", ForcePolicy::Yes)]
    #[case("YES", ForcePolicy::Yes)]
    #[case("n", ForcePolicy::No)]
    #[case("no", ForcePolicy::No)]
    #[case("ask", ForcePolicy::Ask)]
    #[case("auto", ForcePolicy::Ask)]
    fn test_parse_force_policy(#[case] input: &str, #[case] expected: ForcePolicy) {
        assert_eq!(input.parse::<ForcePolicy>(), Ok(expected));
    }

    #[test]
    fn test_parse_force_policy_rejects_garbage() {
        assert!("maybe".parse::<ForcePolicy>().is_err());
    }

    #[test]
    fn test_allows_only_asks_when_policy_is_ask() {
        struct Panics;
        impl Confirm for Panics {
            fn confirm(&self, _question: &str) -> bool {
                panic!("should not be asked")
            }
        }

        assert!(ForcePolicy::Yes.allows(&Panics, "?"));
        assert!(!ForcePolicy::No.allows(&Panics, "?"));
        assert!(ForcePolicy::Ask.allows(&FixedAnswer(true), "?"));
        assert!(!ForcePolicy::Ask.allows(&FixedAnswer(false), "?"));
    }

    #[test]
    fn test_list_request() {
        let request = ExtractionRequest::list("a.zip").with_dry_run(true);
        assert_eq!(request.mode, Mode::List);
        assert!(request.dry_run);
        assert_eq!(request.force, ForcePolicy::Ask);
    }
}
