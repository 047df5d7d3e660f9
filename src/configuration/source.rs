//! Turning a located configuration file into a raw, unvalidated key/value mapping.
//!
//! There are two kinds of sources:
//! - plain data (`config.json`, `config.json5`, ...), parsed as JSON5,
//! - a module (`config.js`), which is *trusted code*. We never evaluate it ourselves;
//!   whoever embeds this crate registers a [`ModuleProvider`] that does.

use std::{fs, path::Path};

use serde_json::{Map, Value};
use tracing::debug;

use super::error::{describe_value, ConfigurationError};


/// Untyped key/value pairs exactly as the user wrote them, in file order.
pub type RawUserMapping = Map<String, Value>;


/// Evaluates a module configuration source and returns its exported mapping.
///
/// Implementations run code supplied by the operator. That is a trust boundary:
/// the module has the same privileges as the bot itself.
pub trait ModuleProvider {
    fn provide(&self, module_path: &Path) -> Result<RawUserMapping, ConfigurationError>;
}

impl<F> ModuleProvider for F
where
    F: Fn(&Path) -> Result<RawUserMapping, ConfigurationError>,
{
    fn provide(&self, module_path: &Path) -> Result<RawUserMapping, ConfigurationError> {
        self(module_path)
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Relaxed JSON (comments, trailing commas, unquoted keys, ...).
    Data,
    /// Executable module, handled by a [`ModuleProvider`].
    Module,
}

impl SourceKind {
    pub fn from_file_name(file_name: &str) -> Self {
        if file_name.ends_with(".js") {
            Self::Module
        } else {
            Self::Data
        }
    }
}


/// Reads and parses the configuration file `file_name` inside `installation_root`.
pub fn parse_configuration_source(
    installation_root: &Path,
    file_name: &str,
    module_provider: Option<&dyn ModuleProvider>,
) -> Result<RawUserMapping, ConfigurationError> {
    let file_path = installation_root.join(file_name);

    match SourceKind::from_file_name(file_name) {
        SourceKind::Module => {
            let provider =
                module_provider.ok_or_else(|| ConfigurationError::ModuleProviderMissing {
                    path: file_path.clone(),
                })?;

            debug!(path = %file_path.display(), "evaluating module configuration");
            provider.provide(&file_path)
        }
        SourceKind::Data => {
            let contents = fs::read(&file_path).map_err(|error| ConfigurationError::ConfigRead {
                path: file_path.clone(),
                source: error,
            })?;

            let contents = String::from_utf8(contents).map_err(|error| {
                ConfigurationError::ConfigParse {
                    path: file_path.clone(),
                    message: error.to_string(),
                }
            })?;

            debug!(path = %file_path.display(), "parsing configuration file");
            parse_relaxed_json(&contents, &file_path)
        }
    }
}


/// Parses JSON5 text into a mapping. The top level must be an object.
pub fn parse_relaxed_json(
    contents: &str,
    file_path: &Path,
) -> Result<RawUserMapping, ConfigurationError> {
    // Notepad on Windows likes to prepend a byte order mark.
    let contents = contents.strip_prefix('\u{feff}').unwrap_or(contents);

    let value = json5::from_str::<Value>(contents).map_err(|error| {
        ConfigurationError::ConfigParse {
            path: file_path.to_path_buf(),
            message: error.to_string(),
        }
    })?;

    match value {
        Value::Object(mapping) => Ok(mapping),
        other => Err(ConfigurationError::ConfigParse {
            path: file_path.to_path_buf(),
            message: format!(
                "expected the configuration to be an object, found {}",
                describe_value(&other)
            ),
        }),
    }
}


#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn relaxed_syntax_is_accepted() {
        let contents = r#"
            // The bot token lives in the environment.
            {
                mailGuildId: "1234",
                "prefix": '?',
                /* trailing comma below */
                smallAttachmentLimit: 1048576,
            }
        "#;

        let mapping = parse_relaxed_json(contents, Path::new("config.json5")).unwrap();

        assert_eq!(mapping.get("mailGuildId"), Some(&json!("1234")));
        assert_eq!(mapping.get("prefix"), Some(&json!("?")));
        assert_eq!(
            mapping.get("smallAttachmentLimit").and_then(Value::as_u64),
            Some(1048576)
        );
    }

    #[test]
    fn file_order_is_preserved() {
        let mapping =
            parse_relaxed_json("{ zeta: 1, alpha: 2, mid: 3 }", Path::new("config.json")).unwrap();

        let keys = mapping.keys().map(String::as_str).collect::<Vec<_>>();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn byte_order_mark_is_ignored() {
        let mapping =
            parse_relaxed_json("\u{feff}{ \"prefix\": \"!\" }", Path::new("config.json")).unwrap();
        assert_eq!(mapping.len(), 1);
    }

    #[test]
    fn malformed_syntax_reports_parser_message() {
        let error = parse_relaxed_json("{ prefix: ", Path::new("config.json")).unwrap_err();

        match error {
            ConfigurationError::ConfigParse { path, message } => {
                assert_eq!(path, PathBuf::from("config.json"));
                assert!(!message.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_object_top_level_is_rejected() {
        let error = parse_relaxed_json("[1, 2, 3]", Path::new("config.json")).unwrap_err();

        assert!(matches!(
            error,
            ConfigurationError::ConfigParse { ref message, .. } if message.contains("an array")
        ));
    }

    #[test]
    fn data_source_is_read_from_installation_root() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("config.json.txt"),
            "{ logChannelId: '42' }",
        )
        .unwrap();

        let mapping = parse_configuration_source(temp.path(), "config.json.txt", None).unwrap();
        assert_eq!(mapping.get("logChannelId"), Some(&json!("42")));
    }

    #[test]
    fn unreadable_data_source_reports_read_error() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("config.json5")).unwrap();

        let error = parse_configuration_source(temp.path(), "config.json5", None).unwrap_err();
        assert!(!error.terminates_process());
        assert!(matches!(
            error,
            ConfigurationError::ConfigRead { ref path, .. } if path.ends_with("config.json5")
        ));
    }

    #[test]
    fn invalid_utf8_is_a_parse_error() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("config.json"), [b'{', 0xff, 0xfe, b'}']).unwrap();

        let error = parse_configuration_source(temp.path(), "config.json", None).unwrap_err();
        assert!(matches!(
            error,
            ConfigurationError::ConfigParse { ref path, ref message }
                if path.ends_with("config.json") && message.contains("utf-8")
        ));
    }

    #[test]
    fn module_source_without_provider_fails() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("config.js"), "module.exports = {};").unwrap();

        let error = parse_configuration_source(temp.path(), "config.js", None).unwrap_err();
        assert!(matches!(
            error,
            ConfigurationError::ModuleProviderMissing { ref path } if path.ends_with("config.js")
        ));
    }

    #[test]
    fn module_source_is_handed_to_provider() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("config.js"), "module.exports = {};").unwrap();

        let provider = |module_path: &Path| -> Result<RawUserMapping, ConfigurationError> {
            assert!(module_path.ends_with("config.js"));

            let mut mapping = RawUserMapping::new();
            mapping.insert("prefix".to_string(), json!("$"));
            Ok(mapping)
        };

        let mapping =
            parse_configuration_source(temp.path(), "config.js", Some(&provider)).unwrap();
        assert_eq!(mapping.get("prefix"), Some(&json!("$")));
    }

    #[test]
    fn source_kind_follows_extension() {
        assert_eq!(SourceKind::from_file_name("config.js"), SourceKind::Module);
        assert_eq!(SourceKind::from_file_name("config.json"), SourceKind::Data);
        assert_eq!(SourceKind::from_file_name("config.json.txt"), SourceKind::Data);
    }
}
