//! `dsu xtract`, also installed as the standalone `xtract` binary

use anyhow::Context as _;
use dsu_xtract::{
    ExtractionRequest, Extractor, ExtractorBuilder, Layout, Mode, ProgressReporter,
};

use super::Context;
use crate::cli::XtractArgs;

pub fn execute(args: &XtractArgs, ctx: &Context) -> anyhow::Result<()> {
    let destination = match &args.destination {
        Some(destination) => destination.clone(),
        None => std::env::current_dir().context("cannot determine the current directory")?,
    };

    let request = ExtractionRequest {
        source: args.archive.clone(),
        destination,
        mode: if args.list { Mode::List } else { Mode::Extract },
        force: ctx.config.force,
        dry_run: ctx.config.dry_run,
    };

    let builder = ExtractorBuilder::new().with_cleanup_registry(ctx.cleanup.clone());
    if ctx.config.show_progress() {
        run(request, &builder.with_spinner().build(), ctx)
    } else {
        run(request, &builder.build(), ctx)
    }
}

fn run<P: ProgressReporter>(
    request: ExtractionRequest,
    extractor: &Extractor<P>,
    ctx: &Context,
) -> anyhow::Result<()> {
    let archive = request.source.clone();
    let mut stdout = std::io::stdout().lock();

    let result = dsu_xtract::run(request, extractor, ctx.confirm.as_ref(), &mut stdout)
        .with_context(|| format!("failed to process {}", archive.display()))?;

    if let Some(result) = result {
        match result.layout {
            Some(Layout::Wrapped) => tracing::debug!(
                "{} has several top-level directories, wrapped in {}",
                archive.display(),
                result.destination.display()
            ),
            Some(Layout::Direct) => {
                tracing::debug!("{} entries moved into place", result.entries)
            }
            None => {}
        }
    }
    Ok(())
}
