use std::path::Path;

use miette::{Context, IntoDiagnostic, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};


/// Initializes console (stderr) and file logging.
///
/// The log file is not rotated. The returned guard flushes the file
/// writer when dropped, so it must be kept alive until the program exits.
pub fn initialize_tracing<P>(
    console_level_filter: EnvFilter,
    log_file_level_filter: EnvFilter,
    log_file_output_directory: P,
    log_file_name: &str,
) -> Result<WorkerGuard>
where
    P: AsRef<Path>,
{
    let file_appender =
        tracing_appender::rolling::never(log_file_output_directory.as_ref(), log_file_name);
    let (non_blocking_file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(console_level_filter);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file_writer)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_filter(log_file_level_filter);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .into_diagnostic()
        .wrap_err("Failed to initialize global tracing subscriber.")?;

    Ok(guard)
}
