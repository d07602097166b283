//! Severity-tagged log lines. Errors and warnings go to stderr, everything else
//! to stdout.

use std::fmt;

use console::Style;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    fmt::{format::Writer, writer::MakeWriterExt, FmtContext, FormatEvent, FormatFields},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::Config;

/// Formats each event as `<tag>: <message>`
#[derive(Debug, Clone, Copy)]
pub struct TaggedFormat {
    color: bool,
}

impl TaggedFormat {
    pub fn new(color: bool) -> Self {
        Self { color }
    }
}

/// The tag printed in front of an event, and how it is colored
pub fn tag(target: &str, level: Level) -> (&'static str, Style) {
    if target == "dry" {
        return ("dry", Style::new().cyan().bold());
    }
    match level {
        Level::ERROR => ("error", Style::new().red().bold()),
        Level::WARN => ("warning", Style::new().yellow().bold()),
        Level::INFO => ("info", Style::new().green()),
        Level::DEBUG => ("verbose", Style::new().blue()),
        _ => ("trace", Style::new().dim()),
    }
}

impl<S, N> FormatEvent<S, N> for TaggedFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        let (label, style) = tag(metadata.target(), *metadata.level());
        write!(
            writer,
            "{}: ",
            style.apply_to(label).force_styling(self.color)
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Install the global subscriber. `RUST_LOG` takes precedence over the configured level.
pub fn init(config: &Config) {
    let filter = EnvFilter::builder()
        .with_default_directive(config.log_level.filter().into())
        .from_env_lossy();

    let writer = std::io::stderr
        .with_max_level(Level::WARN)
        .or_else(std::io::stdout);

    let layer = tracing_subscriber::fmt::layer()
        .event_format(TaggedFormat::new(config.color))
        .with_writer(writer);

    // A subscriber may already be installed when running under a test harness.
    let _ = tracing_subscriber::registry().with(filter).with(layer).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;

    #[test]
    fn test_tags() {
        assert_eq!(tag("dsu", Level::ERROR).0, "error");
        assert_eq!(tag("dsu", Level::WARN).0, "warning");
        assert_eq!(tag("dsu", Level::INFO).0, "info");
        assert_eq!(tag("dsu_xtract::extractor", Level::DEBUG).0, "verbose");
        assert_eq!(tag("dry", Level::INFO).0, "dry");
    }

    #[test]
    fn test_init_twice_keeps_first_subscriber() {
        let config = Config {
            log_level: LogLevel::Warn,
            color: false,
            force: dsu_xtract::ForcePolicy::No,
            dry_run: false,
        };
        init(&config);
        init(&config);
        tracing::warn!("routed to stderr");
    }

    #[test]
    fn test_tags_are_plain_without_color() {
        let (label, style) = tag("dsu", Level::ERROR);
        assert_eq!(style.apply_to(label).force_styling(false).to_string(), "error");
    }
}
