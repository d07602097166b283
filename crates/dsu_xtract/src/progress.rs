//! Progress reporting while a delegate runs

#[cfg(feature = "progress")]
use indicatif::{ProgressBar, ProgressStyle};
#[cfg(feature = "progress")]
use std::time::Duration;

/// A trait for reporting progress during extraction
pub trait ProgressReporter {
    /// Called right before the delegate is started
    fn on_start(&self, message: &str);

    /// Called once the delegate has finished, successfully or not
    fn on_finish(&self, message: &str);
}

/// A no-op progress reporter
#[derive(Default)]
pub struct NoProgressReporter;

impl ProgressReporter for NoProgressReporter {
    fn on_start(&self, _message: &str) {}
    fn on_finish(&self, _message: &str) {}
}

/// Spinner on stderr; the delegates give no byte counts to drive a bar with
#[cfg(feature = "progress")]
pub struct IndicatifProgressReporter {
    progress_bar: ProgressBar,
}

#[cfg(feature = "progress")]
impl IndicatifProgressReporter {
    /// Create a new indicatif progress reporter
    pub fn new(progress_bar: ProgressBar) -> Self {
        Self { progress_bar }
    }

    /// Create a spinner with the default styling
    pub fn with_default_style() -> Self {
        let progress_bar = ProgressBar::new_spinner();
        progress_bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        Self { progress_bar }
    }
}

#[cfg(feature = "progress")]
impl ProgressReporter for IndicatifProgressReporter {
    fn on_start(&self, message: &str) {
        self.progress_bar.set_message(message.to_string());
        self.progress_bar.enable_steady_tick(Duration::from_millis(100));
    }

    fn on_finish(&self, message: &str) {
        self.progress_bar.finish_with_message(message.to_string());
    }
}
