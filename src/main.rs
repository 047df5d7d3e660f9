use clap::Parser;
use miette::{Context, IntoDiagnostic, Result};
use modmail_config::{
    configuration::{
        get_default_installation_root,
        ConfigurationError,
        ConfigurationLoader,
        ConfigurationOrigin,
    },
    logging::{initialize_tracing, parse_level_filter},
};
use tracing::{info, warn};

use crate::cli::CLIArgs;

mod cli;


/// Missing required options and an incomplete storage setup are reported as a single
/// plain line followed by exit status 1. Everything else becomes a full error report.
fn abort_on_terminating_error(error: ConfigurationError) -> miette::Report {
    if error.terminates_process() {
        eprintln!("{error}");
        std::process::exit(1);
    }

    miette::Report::new(error)
}


fn main() -> Result<()> {
    let cli_args = CLIArgs::parse();

    // Validate the filters before doing anything else.
    let console_level_filter = parse_level_filter(&cli_args.console_log_filter)
        .wrap_err("Failed to parse --console-log-filter.")?;
    let log_file_level_filter = parse_level_filter(&cli_args.file_log_filter)
        .wrap_err("Failed to parse --file-log-filter.")?;

    let installation_root = match cli_args.installation_root {
        Some(path) => path,
        None => get_default_installation_root()
            .wrap_err("Could not determine the installation root.")?,
    };

    println!(
        "Loading configuration from: {}",
        installation_root.display()
    );

    // Resolved exactly once, then only ever shared read-only.
    let configuration = ConfigurationLoader::new(installation_root)
        .load()
        .map_err(abort_on_terminating_error)
        .wrap_err("Failed to load configuration.")?
        .into_shared();

    match &configuration.origin {
        ConfigurationOrigin::File(path) | ConfigurationOrigin::Module(path) => {
            println!("Configuration loaded: {}.", path.display());
        }
        ConfigurationOrigin::Provided => println!("Configuration loaded."),
    }


    configuration.create_log_directory_if_not_exists()?;

    let logging_raii_guard = initialize_tracing(
        console_level_filter,
        log_file_level_filter,
        &configuration.log_dir,
        "modmail",
    )
    .wrap_err("Failed to initialize tracing.")?;

    info!("Tracing initialized.");

    for warning in &configuration.warnings {
        warn!("{warning}");
    }

    info!(
        main_guilds = configuration.main_guild_id.len(),
        port = configuration.port,
        attachment_storage = ?configuration.attachment_storage,
        database_client = configuration.knex.client.as_deref().unwrap_or("<unset>"),
        "Configuration is valid."
    );


    if cli_args.print {
        let printable = serde_json::to_string_pretty(&configuration.redacted())
            .into_diagnostic()
            .wrap_err("Failed to serialize the resolved configuration.")?;

        println!("{printable}");
    }


    drop(logging_raii_guard);
    Ok(())
}
