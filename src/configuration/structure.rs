use std::path::PathBuf;
use std::sync::Arc;

use miette::{miette, Context, IntoDiagnostic};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

pub use self::attachments::{AttachmentStorage, ConfigurationWarning};
use self::attachments::{cap_small_attachment_limit, check_attachment_storage};
pub use self::database::{DatabaseConfiguration, MigrationsConfiguration};
use self::database::{derive_database_option, UnresolvedDatabaseConfiguration};
pub use self::values::Snowflake;
use self::values::OneOrMany;
use super::error::ConfigurationError;
use super::schema::{is_truthy, REQUIRED_OPTIONS};
use super::traits::{ResolvableConfiguration, ResolvableConfigurationWithContext};

mod attachments;
mod database;
mod values;


/// Where the user-supplied values came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationOrigin {
    /// A relaxed-JSON data file.
    File(PathBuf),
    /// A module file, evaluated by the registered module provider.
    Module(PathBuf),
    /// A mapping handed directly to the loader.
    Provided,
}


/// Defaults merged with user values, after the database table has been derived and
/// the required options and storage mode have been checked, but before the remaining rules run.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UnresolvedConfiguration {
    token: String,
    mail_guild_id: Snowflake,
    main_guild_id: OneOrMany<Snowflake>,
    log_channel_id: Snowflake,

    prefix: String,
    snippet_prefix: String,
    snippet_prefix_anon: String,

    status: String,
    response_message: String,
    close_message: String,
    allow_user_close: bool,

    new_thread_category_id: Option<Snowflake>,
    mention_role: Option<Snowflake>,
    ping_on_bot_mention: bool,
    bot_mention_response: Option<String>,

    inbox_server_permission: Option<OneOrMany<Snowflake>>,
    always_reply: bool,
    always_reply_anon: bool,
    use_nicknames: bool,
    ignore_accidental_threads: bool,
    thread_timestamps: bool,
    allow_move: bool,
    sync_permissions_on_move: bool,
    typing_proxy: bool,
    typing_proxy_reverse: bool,
    mention_user_in_thread_header: bool,

    enable_greeting: bool,
    greeting_message: Option<String>,
    greeting_attachment: Option<PathBuf>,

    required_account_age: Option<f64>,
    account_age_denied_message: String,

    relay_small_attachments_as_attachments: bool,
    small_attachment_limit: u64,
    attachment_storage: AttachmentStorage,
    attachment_storage_channel_id: Option<Snowflake>,

    port: u16,
    url: Option<String>,

    db_dir: PathBuf,
    knex: UnresolvedDatabaseConfiguration,

    log_dir: PathBuf,
}


/// The entire, resolved configuration.
///
/// Built once at startup and never mutated afterwards; share it with
/// [`Configuration::into_shared`] instead of cloning it around.
/// Serializes back to the same camelCase keys the configuration file uses.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    /// Where the user values were loaded from.
    #[serde(skip)]
    pub origin: ConfigurationOrigin,

    /// Problems that were corrected automatically during resolution.
    #[serde(skip)]
    pub warnings: Vec<ConfigurationWarning>,

    pub token: String,
    pub mail_guild_id: Snowflake,
    /// Never empty.
    pub main_guild_id: Vec<Snowflake>,
    pub log_channel_id: Snowflake,

    pub prefix: String,
    pub snippet_prefix: String,
    pub snippet_prefix_anon: String,

    pub status: String,
    pub response_message: String,
    pub close_message: String,
    pub allow_user_close: bool,

    pub new_thread_category_id: Option<Snowflake>,
    pub mention_role: Option<String>,
    pub ping_on_bot_mention: bool,
    pub bot_mention_response: Option<String>,

    /// Possibly empty.
    pub inbox_server_permission: Vec<String>,
    pub always_reply: bool,
    pub always_reply_anon: bool,
    pub use_nicknames: bool,
    pub ignore_accidental_threads: bool,
    pub thread_timestamps: bool,
    pub allow_move: bool,
    pub sync_permissions_on_move: bool,
    pub typing_proxy: bool,
    pub typing_proxy_reverse: bool,
    pub mention_user_in_thread_header: bool,

    pub enable_greeting: bool,
    pub greeting_message: Option<String>,
    pub greeting_attachment: Option<PathBuf>,

    /// In hours.
    pub required_account_age: Option<f64>,
    pub account_age_denied_message: String,

    pub relay_small_attachments_as_attachments: bool,
    /// In bytes, at most [`SMALL_ATTACHMENT_LIMIT_CAP`][super::schema::SMALL_ATTACHMENT_LIMIT_CAP].
    pub small_attachment_limit: u64,
    pub attachment_storage: AttachmentStorage,
    pub attachment_storage_channel_id: Option<Snowflake>,

    pub port: u16,
    pub url: Option<String>,

    pub db_dir: PathBuf,
    pub knex: DatabaseConfiguration,

    pub log_dir: PathBuf,
}


impl UnresolvedConfiguration {
    /// Derives the database table, enforces required options and the storage mode,
    /// then types the merged mapping.
    pub(crate) fn from_merged(mut merged: Map<String, Value>) -> Result<Self, ConfigurationError> {
        let db_directory = merged
            .get("dbDir")
            .and_then(Value::as_str)
            .map(PathBuf::from)
            .ok_or_else(|| ConfigurationError::InvalidStructure {
                message: "dbDir must be a path".to_string(),
            })?;

        derive_database_option(&mut merged, &db_directory);
        check_required_options(&merged)?;
        check_attachment_storage(&merged)?;

        serde_json::from_value(Value::Object(merged)).map_err(|error| {
            ConfigurationError::InvalidStructure {
                message: error.to_string(),
            }
        })
    }
}

/// Fails on the first required option (in [`REQUIRED_OPTIONS`] order) that is falsy.
/// An empty array does not count as present.
fn check_required_options(merged: &Map<String, Value>) -> Result<(), ConfigurationError> {
    for option in REQUIRED_OPTIONS {
        let is_present = match merged.get(option) {
            Some(Value::Array(values)) => !values.is_empty(),
            Some(value) => is_truthy(value),
            None => false,
        };

        if !is_present {
            return Err(ConfigurationError::MissingRequiredOption { option });
        }
    }

    Ok(())
}


impl ResolvableConfigurationWithContext for UnresolvedConfiguration {
    type Resolved = Configuration;
    type Context = ConfigurationOrigin;

    fn resolve(self, context: Self::Context) -> Result<Self::Resolved, ConfigurationError> {
        let mut warnings = Vec::new();

        let (small_attachment_limit, limit_warning) =
            cap_small_attachment_limit(self.small_attachment_limit);
        warnings.extend(limit_warning);

        let main_guild_id = self.main_guild_id.into_vec();
        let inbox_server_permission = self
            .inbox_server_permission
            .map(OneOrMany::into_vec)
            .unwrap_or_default()
            .into_iter()
            .map(Snowflake::into_string)
            .collect();

        let knex = self.knex.resolve()?;

        debug!(
            main_guilds = main_guild_id.len(),
            warnings = warnings.len(),
            "configuration resolved"
        );

        Ok(Configuration {
            origin: context,
            warnings,
            token: self.token,
            mail_guild_id: self.mail_guild_id,
            main_guild_id,
            log_channel_id: self.log_channel_id,
            prefix: self.prefix,
            snippet_prefix: self.snippet_prefix,
            snippet_prefix_anon: self.snippet_prefix_anon,
            status: self.status,
            response_message: self.response_message,
            close_message: self.close_message,
            allow_user_close: self.allow_user_close,
            new_thread_category_id: self.new_thread_category_id,
            mention_role: self.mention_role.map(Snowflake::into_string),
            ping_on_bot_mention: self.ping_on_bot_mention,
            bot_mention_response: self.bot_mention_response,
            inbox_server_permission,
            always_reply: self.always_reply,
            always_reply_anon: self.always_reply_anon,
            use_nicknames: self.use_nicknames,
            ignore_accidental_threads: self.ignore_accidental_threads,
            thread_timestamps: self.thread_timestamps,
            allow_move: self.allow_move,
            sync_permissions_on_move: self.sync_permissions_on_move,
            typing_proxy: self.typing_proxy,
            typing_proxy_reverse: self.typing_proxy_reverse,
            mention_user_in_thread_header: self.mention_user_in_thread_header,
            enable_greeting: self.enable_greeting,
            greeting_message: self.greeting_message,
            greeting_attachment: self.greeting_attachment,
            required_account_age: self.required_account_age,
            account_age_denied_message: self.account_age_denied_message,
            relay_small_attachments_as_attachments: self.relay_small_attachments_as_attachments,
            small_attachment_limit,
            attachment_storage: self.attachment_storage,
            attachment_storage_channel_id: self.attachment_storage_channel_id,
            port: self.port,
            url: self.url,
            db_dir: self.db_dir,
            knex,
            log_dir: self.log_dir,
        })
    }
}


impl Configuration {
    /// Wraps the configuration for read-only sharing across the application.
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// A copy that is safe to print: the token is replaced.
    pub fn redacted(&self) -> Self {
        Self {
            token: "<redacted>".to_string(),
            ..self.clone()
        }
    }

    /// Creates the log directory if it does not already exist.
    pub fn create_log_directory_if_not_exists(&self) -> miette::Result<()> {
        std::fs::create_dir_all(&self.log_dir)
            .into_diagnostic()
            .wrap_err_with(|| {
                miette!(
                    "Failed to create missing log directory at {}.",
                    self.log_dir.display()
                )
            })
    }
}
