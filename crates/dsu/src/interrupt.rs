//! Running a command so that Ctrl-C, SIGTERM and SIGHUP stop its tools and remove
//! its staging directories before exiting

use std::process::ExitCode;

use dsu_xtract::CleanupRegistry;

/// Exit status after SIGINT, as shells report it
pub const INTERRUPTED: u8 = 130;
/// Exit status after SIGHUP
pub const HUNG_UP: u8 = 129;
/// Exit status after SIGTERM
pub const TERMINATED: u8 = 143;

/// Run `work` on a blocking thread while listening for termination signals.
///
/// When a signal arrives every tool and directory in `cleanup` is removed and the
/// returned code is `128 + signal`; the work thread is abandoned.
pub fn run_interruptible<F>(cleanup: CleanupRegistry, work: F) -> ExitCode
where
    F: FnOnce() -> anyhow::Result<()> + Send + 'static,
{
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            tracing::debug!("running without signal handling: {err}");
            return report(work());
        }
    };

    let code = runtime.block_on(async move {
        let mut task = tokio::task::spawn_blocking(work);
        tokio::select! {
            joined = &mut task => finish(joined),
            signal = termination() => match signal {
                Ok((name, code)) => {
                    let removed = cleanup.purge();
                    tracing::warn!("{name}, removed {removed} staging directories");
                    ExitCode::from(code)
                }
                Err(err) => {
                    tracing::debug!("cannot listen for signals: {err}");
                    finish(task.await)
                }
            },
        }
    });

    // Do not wait for a blocking thread that may still be inside a tool or a prompt.
    runtime.shutdown_background();
    code
}

/// Resolves with a description and exit code once the process is asked to stop
#[cfg(unix)]
async fn termination() -> std::io::Result<(&'static str, u8)> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    let mut hangup = signal(SignalKind::hangup())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result.map(|()| ("interrupted", INTERRUPTED)),
        _ = terminate.recv() => Ok(("terminated", TERMINATED)),
        _ = hangup.recv() => Ok(("hung up", HUNG_UP)),
    }
}

#[cfg(not(unix))]
async fn termination() -> std::io::Result<(&'static str, u8)> {
    tokio::signal::ctrl_c()
        .await
        .map(|()| ("interrupted", INTERRUPTED))
}

fn finish(joined: Result<anyhow::Result<()>, tokio::task::JoinError>) -> ExitCode {
    match joined {
        Ok(result) => report(result),
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

/// Log a failure and turn it into the process exit code
pub fn report(result: anyhow::Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
