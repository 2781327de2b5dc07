use crate::config::LoggingSettings;
use crate::error::{IngestError, Result};
use std::fs;
use tracing::Dispatch;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Builds the console + JSON file subscriber without installing it.
///
/// Pipeline components take the returned [`Dispatch`] and log under it, so a test can hand
/// them `Dispatch::none()` instead. The guard must outlive the run or buffered file lines are
/// lost on exit.
pub fn build_dispatch(settings: &LoggingSettings) -> Result<(Dispatch, WorkerGuard)> {
    fs::create_dir_all(&settings.dir)?;

    // Daily rolling file, written off the main thread
    let file_appender = tracing_appender::rolling::daily(&settings.dir, &settings.file_prefix);
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer().json().with_writer(non_blocking_writer);
    let console_layer = fmt::layer().with_writer(std::io::stdout);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.filter))
        .map_err(|e| {
            IngestError::Config(format!("Invalid log filter '{}': {}", settings.filter, e))
        })?;

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer);

    Ok((Dispatch::new(subscriber), guard))
}

/// Builds the dispatch and also installs it as the process default, for the binaries.
pub fn init_logging(settings: &LoggingSettings) -> Result<(Dispatch, WorkerGuard)> {
    let (dispatch, guard) = build_dispatch(settings)?;
    tracing::dispatcher::set_global_default(dispatch.clone())
        .map_err(|e| IngestError::Config(format!("Logging already initialised: {e}")))?;
    Ok((dispatch, guard))
}
