use std::path::Path;

use miette::{miette, Context, IntoDiagnostic, Result};
use tracing_appender::{non_blocking::WorkerGuard, rolling::Rotation};
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
    Layer,
};


/// Parses an [`EnvFilter`] directive string (e.g. `info,modmail_config=debug`).
pub fn parse_level_filter(filter: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(filter)
        .into_diagnostic()
        .wrap_err_with(|| miette!("Invalid log level filter: {filter}"))
}


/// Installs the global tracing subscriber: a console layer on stderr and
/// a daily-rotated file layer inside `log_file_directory`.
///
/// The returned guard flushes the file writer when dropped, keep it alive until exit.
pub fn initialize_tracing(
    console_level_filter: EnvFilter,
    log_file_level_filter: EnvFilter,
    log_file_directory: &Path,
    log_file_name_prefix: &str,
) -> Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::Builder::new()
        .rotation(Rotation::DAILY)
        .filename_prefix(log_file_name_prefix)
        .filename_suffix("log")
        .build(log_file_directory)
        .into_diagnostic()
        .wrap_err_with(|| {
            miette!(
                "Failed to open log file in {}.",
                log_file_directory.display()
            )
        })?;

    let (non_blocking_file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(console_level_filter);

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_writer(non_blocking_file_writer)
        .with_filter(log_file_level_filter);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .into_diagnostic()
        .wrap_err("Failed to install global tracing subscriber.")?;

    Ok(guard)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_filters_parse() {
        assert!(parse_level_filter("info").is_ok());
        assert!(parse_level_filter("warn,modmail_config=trace").is_ok());
    }

    #[test]
    fn invalid_filters_are_rejected() {
        assert!(parse_level_filter("info,modmail_config=loud").is_err());
    }
}
