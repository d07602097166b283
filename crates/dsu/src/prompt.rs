//! Terminal confirmation prompts

use console::Term;
use dialoguer::Confirm as Question;
use dsu_xtract::Confirm;

/// Asks on stderr with a default of no. Without a terminal every question is
/// answered with no.
#[derive(Debug, Clone)]
pub struct TermConfirm {
    term: Term,
}

impl TermConfirm {
    pub fn new() -> Self {
        Self::with_term(Term::stderr())
    }

    pub fn with_term(term: Term) -> Self {
        Self { term }
    }
}

impl Default for TermConfirm {
    fn default() -> Self {
        Self::new()
    }
}

impl Confirm for TermConfirm {
    fn confirm(&self, question: &str) -> bool {
        if !self.term.is_term() {
            tracing::warn!("{question} (no terminal to ask, assuming no)");
            return false;
        }

        match Question::new()
            .with_prompt(question)
            .default(false)
            .interact_on_opt(&self.term)
        {
            Ok(answer) => answer.unwrap_or(false),
            Err(err) => {
                tracing::debug!("failed to read an answer: {err}");
                false
            }
        }
    }
}
