//! Command-line interface definitions for the configuration check binary.

use std::path::PathBuf;

use clap::Parser;


/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "modmail-config",
    author,
    about = "Resolves and validates the modmail bot configuration.",
    version
)]
pub struct CLIArgs {
    /// This is the directory the configuration file is looked up in.
    /// If unspecified, this defaults to the current directory.
    #[arg(
        short = 'r',
        long = "installation-root",
        help = "Directory containing config.json (or one of its variants). \
                Defaults to the current directory."
    )]
    pub installation_root: Option<PathBuf>,

    #[arg(
        long = "console-log-filter",
        default_value = "info",
        help = "Level filter for console output, in tracing EnvFilter syntax."
    )]
    pub console_log_filter: String,

    #[arg(
        long = "file-log-filter",
        default_value = "debug",
        help = "Level filter for the log file inside logDir, in tracing EnvFilter syntax."
    )]
    pub file_log_filter: String,

    #[arg(
        long = "print",
        help = "If this flag is present, the resolved configuration is printed \
                as JSON (with the token redacted)."
    )]
    pub print: bool,
}


#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_definition_is_valid() {
        CLIArgs::command().debug_assert();
    }

    #[test]
    fn defaults_apply() {
        let arguments = CLIArgs::parse_from(["modmail-config"]);

        assert_eq!(arguments.installation_root, None);
        assert_eq!(arguments.console_log_filter, "info");
        assert_eq!(arguments.file_log_filter, "debug");
        assert!(!arguments.print);
    }

    #[test]
    fn installation_root_and_print() {
        let arguments = CLIArgs::parse_from(["modmail-config", "-r", "/srv/modmail", "--print"]);

        assert_eq!(arguments.installation_root, Some(PathBuf::from("/srv/modmail")));
        assert!(arguments.print);
    }
}
