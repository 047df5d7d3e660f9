use std::path::{Path, PathBuf};

use tracing::debug;

use super::{
    error::ConfigurationError,
    merge::merge_with_defaults,
    schema::{SchemaContext, SchemaDefaults},
    source::{parse_configuration_source, ModuleProvider, RawUserMapping, SourceKind},
    structure::{Configuration, ConfigurationOrigin, UnresolvedConfiguration},
    traits::ResolvableConfigurationWithContext,
    utilities::locate_configuration_file,
};


/// Runs the whole configuration pipeline: locate, parse, merge, derive.
///
/// ```no_run
/// use modmail_config::configuration::ConfigurationLoader;
///
/// let configuration = ConfigurationLoader::new("/srv/modmail").load()?.into_shared();
/// # Ok::<(), modmail_config::configuration::ConfigurationError>(())
/// ```
pub struct ConfigurationLoader {
    context: SchemaContext,
    module_provider: Option<Box<dyn ModuleProvider>>,
}

impl ConfigurationLoader {
    /// A loader for `installation_root`, with the token default taken from the
    /// process environment.
    pub fn new<P: Into<PathBuf>>(installation_root: P) -> Self {
        Self::from_context(SchemaContext::from_process_environment(installation_root))
    }

    pub fn from_context(context: SchemaContext) -> Self {
        Self {
            context,
            module_provider: None,
        }
    }

    /// Overrides the token default that would otherwise come from the environment.
    pub fn with_environment_token(mut self, environment_token: Option<String>) -> Self {
        self.context.environment_token = environment_token;
        self
    }

    /// Registers the evaluator for `config.js`. Without one, finding that file is an error.
    pub fn with_module_provider<P>(mut self, module_provider: P) -> Self
    where
        P: ModuleProvider + 'static,
    {
        self.module_provider = Some(Box::new(module_provider));
        self
    }

    pub fn installation_root(&self) -> &Path {
        &self.context.installation_root
    }

    /// Locates and parses the configuration file in the installation root, then resolves it.
    pub fn load(&self) -> Result<Configuration, ConfigurationError> {
        let installation_root = self.installation_root();

        let file_name = locate_configuration_file(installation_root)?;
        let user_mapping = parse_configuration_source(
            installation_root,
            file_name,
            self.module_provider.as_deref(),
        )?;

        let file_path = installation_root.join(file_name);
        let origin = match SourceKind::from_file_name(file_name) {
            SourceKind::Data => ConfigurationOrigin::File(file_path),
            SourceKind::Module => ConfigurationOrigin::Module(file_path),
        };

        self.resolve(user_mapping, origin)
    }

    /// Resolves an already-constructed mapping, skipping the file system entirely.
    ///
    /// The mapping is trusted the same way a module source is.
    pub fn load_from_mapping(
        &self,
        user_mapping: RawUserMapping,
    ) -> Result<Configuration, ConfigurationError> {
        self.resolve(user_mapping, ConfigurationOrigin::Provided)
    }

    fn resolve(
        &self,
        user_mapping: RawUserMapping,
        origin: ConfigurationOrigin,
    ) -> Result<Configuration, ConfigurationError> {
        debug!(options = user_mapping.len(), ?origin, "resolving configuration");

        let defaults = SchemaDefaults::new(&self.context);
        let merged = merge_with_defaults(user_mapping, defaults)?;

        UnresolvedConfiguration::from_merged(merged)?.resolve(origin)
    }
}


impl Configuration {
    /// Loads the configuration from `installation_root`, taking the token default
    /// from the process environment.
    pub fn load_from_installation_root<P: Into<PathBuf>>(
        installation_root: P,
    ) -> Result<Self, ConfigurationError> {
        ConfigurationLoader::new(installation_root).load()
    }
}


#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::{json, Value};
    use tempfile::TempDir;

    use super::*;
    use crate::configuration::structure::Snowflake;

    const VALID_CONFIGURATION: &str = r#"
        {
            // Comments and trailing commas are fine.
            "mailGuildId": "100",
            "mainGuildId": "200",
            "logChannelId": "300",
            "smallAttachmentLimit": 10485760,
        }
    "#;

    fn loader(temp: &TempDir) -> ConfigurationLoader {
        ConfigurationLoader::new(temp.path()).with_environment_token(Some("env-token".to_string()))
    }

    fn as_mapping(value: Value) -> RawUserMapping {
        match value {
            Value::Object(mapping) => mapping,
            _ => unreachable!("test mappings are objects"),
        }
    }

    #[test]
    fn loads_relaxed_json_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("config.json5"), VALID_CONFIGURATION).unwrap();

        let configuration = loader(&temp).load().unwrap();

        assert_eq!(
            configuration.origin,
            ConfigurationOrigin::File(temp.path().join("config.json5"))
        );
        assert_eq!(configuration.token, "env-token");
        assert_eq!(configuration.main_guild_id, vec![Snowflake::new("200")]);
        assert_eq!(configuration.small_attachment_limit, 8 * 1024 * 1024);
        assert_eq!(configuration.warnings.len(), 1);
        assert_eq!(configuration.db_dir, temp.path().join("db"));
        assert_eq!(configuration.log_dir, temp.path().join("logs"));
    }

    #[test]
    fn file_token_overrides_environment() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("config.json"),
            r#"{ "token": "file-token", "mailGuildId": "1", "mainGuildId": "2", "logChannelId": "3" }"#,
        )
        .unwrap();

        let configuration = loader(&temp).load().unwrap();
        assert_eq!(configuration.token, "file-token");
    }

    #[test]
    fn missing_token_everywhere_is_fatal() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("config.json"), VALID_CONFIGURATION).unwrap();

        let error = loader(&temp)
            .with_environment_token(None)
            .load()
            .unwrap_err();

        assert!(matches!(
            error,
            ConfigurationError::MissingRequiredOption { option: "token" }
        ));
    }

    #[test]
    fn missing_file_is_not_found() {
        let temp = TempDir::new().unwrap();

        let error = loader(&temp).load().unwrap_err();
        assert!(matches!(error, ConfigurationError::ConfigNotFound { .. }));
        assert!(!error.terminates_process());
    }

    #[test]
    fn malformed_file_is_a_parse_error_not_a_missing_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("config.json"), "{ mailGuildId: ").unwrap();
        fs::write(temp.path().join("config.json5"), VALID_CONFIGURATION).unwrap();

        let error = loader(&temp).load().unwrap_err();
        assert!(matches!(error, ConfigurationError::ConfigParse { .. }));
    }

    #[test]
    fn unknown_option_in_file_is_rejected() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("config.json"),
            r#"{ "mailGuildId": "1", "mainGuildId": "2", "logChannelId": "3", "colour": "red" }"#,
        )
        .unwrap();

        let error = loader(&temp).load().unwrap_err();
        assert!(matches!(
            error,
            ConfigurationError::UnknownConfigOption { ref option } if option == "colour"
        ));
    }

    #[test]
    fn module_file_uses_registered_provider() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("config.js"), "module.exports = {};").unwrap();

        let configuration = loader(&temp)
            .with_module_provider(|_: &Path| -> Result<RawUserMapping, ConfigurationError> {
                Ok(as_mapping(json!({
                    "mailGuildId": "1",
                    "mainGuildId": ["2", "3"],
                    "logChannelId": "4",
                })))
            })
            .load()
            .unwrap();

        assert_eq!(
            configuration.origin,
            ConfigurationOrigin::Module(temp.path().join("config.js"))
        );
        assert_eq!(configuration.main_guild_id.len(), 2);
    }

    #[test]
    fn provided_mapping_goes_through_the_same_rules() {
        let temp = TempDir::new().unwrap();

        let error = loader(&temp)
            .load_from_mapping(as_mapping(json!({ "typo": true })))
            .unwrap_err();
        assert!(matches!(error, ConfigurationError::UnknownConfigOption { .. }));

        let configuration = loader(&temp)
            .load_from_mapping(as_mapping(json!({
                "mailGuildId": "1",
                "mainGuildId": "2",
                "logChannelId": "3",
            })))
            .unwrap();
        assert_eq!(configuration.origin, ConfigurationOrigin::Provided);
    }

    #[test]
    fn loading_twice_gives_identical_configurations() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("config.json"), VALID_CONFIGURATION).unwrap();

        let loader = loader(&temp);
        assert_eq!(loader.load().unwrap(), loader.load().unwrap());
    }
}
