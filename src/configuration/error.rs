use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;


/// Everything that can go wrong while locating, parsing and resolving the configuration.
///
/// None of these are transient: the caller is expected to abort startup.
#[derive(Error, Diagnostic, Debug)]
pub enum ConfigurationError {
    #[error("Could not find config.json!")]
    #[diagnostic(
        code(modmail::config::not_found),
        help("Create a config.json (or config.json5) file in the installation root.")
    )]
    ConfigNotFound {
        installation_root: PathBuf,
        candidates: Vec<&'static str>,
    },

    #[error("Error reading config file {}!", .path.display())]
    #[diagnostic(code(modmail::config::read))]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error reading config file {}! The error given was: {message}", .path.display())]
    #[diagnostic(code(modmail::config::parse))]
    ConfigParse { path: PathBuf, message: String },

    #[error("Found module configuration {}, but no module provider is registered.", .path.display())]
    #[diagnostic(
        code(modmail::config::module_provider_missing),
        help("Module configuration files are trusted code and must be evaluated by the host.")
    )]
    ModuleProviderMissing { path: PathBuf },

    #[error("Invalid option: {option}")]
    #[diagnostic(code(modmail::config::unknown_option))]
    UnknownConfigOption { option: String },

    #[error("Invalid value for config option '{option}': expected {expected}, found {found}")]
    #[diagnostic(code(modmail::config::invalid_type))]
    InvalidOptionType {
        option: String,
        expected: String,
        found: String,
    },

    #[error("Configuration does not have the expected structure: {message}")]
    #[diagnostic(code(modmail::config::invalid_structure))]
    InvalidStructure { message: String },

    #[error("Missing required config.json value: {option}")]
    #[diagnostic(code(modmail::config::missing_required))]
    MissingRequiredOption { option: &'static str },

    #[error("Config option 'attachmentStorageChannelId' is required with attachment storage 'discord'")]
    #[diagnostic(code(modmail::config::invalid_storage))]
    InvalidStorageConfiguration,
}

impl ConfigurationError {
    /// Whether the operator should be shown a plain diagnostic followed by
    /// an immediate exit, instead of a full error report.
    pub fn terminates_process(&self) -> bool {
        matches!(
            self,
            Self::MissingRequiredOption { .. } | Self::InvalidStorageConfiguration
        )
    }

    pub(crate) fn invalid_type<O, E>(option: O, expected: E, found: &serde_json::Value) -> Self
    where
        O: Into<String>,
        E: Into<String>,
    {
        Self::InvalidOptionType {
            option: option.into(),
            expected: expected.into(),
            found: describe_value(found).to_string(),
        }
    }
}


/// Short human-readable name of a JSON value's type.
pub(crate) fn describe_value(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;

    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_required_and_storage_errors_terminate() {
        assert!(ConfigurationError::MissingRequiredOption { option: "token" }.terminates_process());
        assert!(ConfigurationError::InvalidStorageConfiguration.terminates_process());

        assert!(!ConfigurationError::UnknownConfigOption {
            option: "foo".to_string()
        }
        .terminates_process());
        assert!(!ConfigurationError::ConfigParse {
            path: PathBuf::from("config.json"),
            message: "oops".to_string()
        }
        .terminates_process());
    }

    #[test]
    fn messages_name_the_offending_option() {
        let error = ConfigurationError::UnknownConfigOption {
            option: "prefx".to_string(),
        };
        assert_eq!(error.to_string(), "Invalid option: prefx");

        let error = ConfigurationError::MissingRequiredOption {
            option: "logChannelId",
        };
        assert_eq!(
            error.to_string(),
            "Missing required config.json value: logChannelId"
        );
    }
}
