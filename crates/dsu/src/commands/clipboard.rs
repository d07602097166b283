//! `dsu copy` and `dsu paste` on the system clipboard

use std::io::{Read, Write};

use anyhow::{anyhow, Context as _};
use copypasta::{ClipboardContext, ClipboardProvider};
use dsu_xtract::dry;

use super::Context;

fn open() -> anyhow::Result<ClipboardContext> {
    ClipboardContext::new().map_err(|err| anyhow!("failed to open the clipboard: {err}"))
}

pub fn copy(ctx: &Context) -> anyhow::Result<()> {
    copy_from(&mut std::io::stdin().lock(), ctx, open)
}

/// Put everything read from `input` on the clipboard returned by `open`.
///
/// The clipboard is not opened at all in a dry run.
pub fn copy_from<C, F>(input: &mut dyn Read, ctx: &Context, open: F) -> anyhow::Result<()>
where
    C: ClipboardProvider,
    F: FnOnce() -> anyhow::Result<C>,
{
    let mut contents = String::new();
    input
        .read_to_string(&mut contents)
        .context("failed to read standard input")?;
    let len = contents.len();

    if ctx.config.dry_run {
        dry!("would copy {len} bytes to the clipboard");
        return Ok(());
    }

    let mut clipboard = open()?;
    clipboard
        .set_contents(contents)
        .map_err(|err| anyhow!("failed to set the clipboard contents: {err}"))?;
    tracing::debug!("copied {len} bytes");
    Ok(())
}

pub fn paste() -> anyhow::Result<()> {
    let mut clipboard = open()?;
    paste_into(&mut std::io::stdout().lock(), &mut clipboard)
}

/// Write the clipboard contents to `out`, followed by a newline
pub fn paste_into(
    out: &mut dyn Write,
    clipboard: &mut dyn ClipboardProvider,
) -> anyhow::Result<()> {
    let contents = clipboard
        .get_contents()
        .map_err(|err| anyhow!("failed to read the clipboard: {err}"))?;
    writeln!(out, "{contents}")?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::context;
    use dsu_xtract::ForcePolicy;
    use std::sync::{Arc, Mutex};

    type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

    #[derive(Clone, Default)]
    struct MemoryClipboard {
        contents: Arc<Mutex<Option<String>>>,
    }

    impl MemoryClipboard {
        fn holding(contents: &str) -> Self {
            Self {
                contents: Arc::new(Mutex::new(Some(contents.to_string()))),
            }
        }

        fn contents(&self) -> Option<String> {
            self.contents.lock().unwrap().clone()
        }
    }

    impl ClipboardProvider for MemoryClipboard {
        fn get_contents(&mut self) -> Result<String, BoxError> {
            self.contents().ok_or_else(|| "clipboard is empty".into())
        }

        fn set_contents(&mut self, contents: String) -> Result<(), BoxError> {
            *self.contents.lock().unwrap() = Some(contents);
            Ok(())
        }
    }

    #[test]
    fn test_copy_reads_all_input() {
        let clipboard = MemoryClipboard::default();
        copy_from(
            &mut "line one\nline two".as_bytes(),
            &context(ForcePolicy::Ask, false),
            || Ok(clipboard.clone()),
        )
        .unwrap();
        assert_eq!(clipboard.contents().as_deref(), Some("line one\nline two"));
    }

    #[test]
    fn test_dry_run_never_opens_the_clipboard() {
        copy_from(
            &mut "text".as_bytes(),
            &context(ForcePolicy::Ask, true),
            || -> anyhow::Result<MemoryClipboard> {
                panic!("clipboard opened during a dry run")
            },
        )
        .unwrap();
    }

    #[test]
    fn test_paste_writes_contents() {
        let mut clipboard = MemoryClipboard::holding("hello");
        let mut out = Vec::new();
        paste_into(&mut out, &mut clipboard).unwrap();
        assert_eq!(out, b"hello\n");
    }

    #[test]
    fn test_paste_from_empty_clipboard_fails() {
        let mut out = Vec::new();
        assert!(paste_into(&mut out, &mut MemoryClipboard::default()).is_err());
        assert!(out.is_empty());
    }
}
