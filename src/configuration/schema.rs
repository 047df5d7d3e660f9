//! Every recognized option, its default value and the type a user value must have.
//!
//! The option table doubles as the allow-list: a key that is not in [`OPTIONS`]
//! is not a valid configuration option.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use self::{DefaultValue as D, OptionKind as K};


/// Environment variable supplying the default bot token.
pub const TOKEN_ENVIRONMENT_VARIABLE: &str = "token";

pub const DEFAULT_SMALL_ATTACHMENT_LIMIT: u64 = 1024 * 1024 * 2;

/// `smallAttachmentLimit` is clamped to this many bytes.
pub const SMALL_ATTACHMENT_LIMIT_CAP: u64 = 1024 * 1024 * 8;

/// Options that must hold a truthy value after merging, checked in this order.
pub const REQUIRED_OPTIONS: [&str; 4] = ["token", "mailGuildId", "mainGuildId", "logChannelId"];

pub const DEFAULT_RESPONSE_MESSAGE: &str = "**Thread Created**

Your message has been sent to the support team of Dynasty. \
The support team will get back to you as soon as possible!";

pub const DEFAULT_CLOSE_MESSAGE: &str = "**Thread Closed**

Your thread has been closed by the support team. \
If you have another question, don't hesitate to create another thread.";


/// The shape a user-supplied value must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Text,
    Boolean,
    /// A Discord snowflake or name, written either as a string or as an integer.
    Identifier,
    /// One identifier or an array of them.
    IdentifierList,
    UnsignedInteger,
    Number,
    Port,
    Path,
    /// `"local"` or `"discord"`.
    AttachmentStorage,
    /// The nested database (knex) table.
    Database,
}

impl OptionKind {
    /// Human-readable description used in type errors.
    pub fn expected(&self) -> &'static str {
        match self {
            Self::Text => "a string",
            Self::Boolean => "a boolean",
            Self::Identifier => "an identifier (string or integer)",
            Self::IdentifierList => "an identifier or an array of identifiers",
            Self::UnsignedInteger => "a non-negative integer",
            Self::Number => "a number",
            Self::Port => "a port number (0-65535)",
            Self::Path => "a path string",
            Self::AttachmentStorage => "\"local\" or \"discord\"",
            Self::Database => "an object",
        }
    }

    /// Whether a non-null `value` has this shape.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::Text | Self::Path => value.is_string(),
            Self::Boolean => value.is_boolean(),
            Self::Identifier => is_identifier(value),
            Self::IdentifierList => match value {
                Value::Array(items) => items.iter().all(is_identifier),
                other => is_identifier(other),
            },
            Self::UnsignedInteger => value.is_u64(),
            Self::Number => value.is_number(),
            Self::Port => value.as_u64().is_some_and(|port| port <= u64::from(u16::MAX)),
            Self::AttachmentStorage => {
                matches!(value.as_str(), Some("local") | Some("discord"))
            }
            Self::Database => value.is_object(),
        }
    }
}

fn is_identifier(value: &Value) -> bool {
    value.is_string() || value.is_u64()
}


#[derive(Debug, Clone, Copy)]
enum DefaultValue {
    Null,
    Boolean(bool),
    Text(&'static str),
    UnsignedInteger(u64),
    /// Read from [`TOKEN_ENVIRONMENT_VARIABLE`].
    EnvironmentToken,
    /// A directory with this name inside the installation root.
    InstallationPath(&'static str),
}


/// A single recognized configuration option.
#[derive(Debug, Clone, Copy)]
pub struct ConfigurationOption {
    pub name: &'static str,
    pub kind: OptionKind,
    /// Whether the user may explicitly set this option to `null`.
    pub nullable: bool,
    default: DefaultValue,
}

const fn option(
    name: &'static str,
    kind: OptionKind,
    nullable: bool,
    default: DefaultValue,
) -> ConfigurationOption {
    ConfigurationOption {
        name,
        kind,
        nullable,
        default,
    }
}

/// All recognized options, in the order they are documented.
pub const OPTIONS: &[ConfigurationOption] = &[
    option("token", K::Text, true, D::EnvironmentToken),
    option("mailGuildId", K::Identifier, true, D::Null),
    option("mainGuildId", K::IdentifierList, true, D::Null),
    option("logChannelId", K::Identifier, true, D::Null),
    option("prefix", K::Text, false, D::Text("!")),
    option("snippetPrefix", K::Text, false, D::Text("!!")),
    option("snippetPrefixAnon", K::Text, false, D::Text("!!!")),
    option("status", K::Text, false, D::Text("Message me for help!")),
    option("responseMessage", K::Text, false, D::Text(DEFAULT_RESPONSE_MESSAGE)),
    option("closeMessage", K::Text, false, D::Text(DEFAULT_CLOSE_MESSAGE)),
    option("allowUserClose", K::Boolean, false, D::Boolean(false)),
    option("newThreadCategoryId", K::Identifier, true, D::Null),
    option("mentionRole", K::Identifier, true, D::Text("everyone")),
    option("pingOnBotMention", K::Boolean, false, D::Boolean(true)),
    option("botMentionResponse", K::Text, true, D::Null),
    option("inboxServerPermission", K::IdentifierList, true, D::Null),
    option("alwaysReply", K::Boolean, false, D::Boolean(false)),
    option("alwaysReplyAnon", K::Boolean, false, D::Boolean(false)),
    option("useNicknames", K::Boolean, false, D::Boolean(true)),
    option("ignoreAccidentalThreads", K::Boolean, false, D::Boolean(false)),
    option("threadTimestamps", K::Boolean, false, D::Boolean(false)),
    option("allowMove", K::Boolean, false, D::Boolean(false)),
    option("syncPermissionsOnMove", K::Boolean, false, D::Boolean(false)),
    option("typingProxy", K::Boolean, false, D::Boolean(false)),
    option("typingProxyReverse", K::Boolean, false, D::Boolean(false)),
    option("mentionUserInThreadHeader", K::Boolean, false, D::Boolean(false)),
    option("enableGreeting", K::Boolean, false, D::Boolean(false)),
    option("greetingMessage", K::Text, true, D::Null),
    option("greetingAttachment", K::Path, true, D::Null),
    // In hours.
    option("requiredAccountAge", K::Number, true, D::Null),
    option(
        "accountAgeDeniedMessage",
        K::Text,
        false,
        D::Text("Your Discord account is not old enough to contact modmail."),
    ),
    option("relaySmallAttachmentsAsAttachments", K::Boolean, false, D::Boolean(false)),
    option(
        "smallAttachmentLimit",
        K::UnsignedInteger,
        false,
        D::UnsignedInteger(DEFAULT_SMALL_ATTACHMENT_LIMIT),
    ),
    option("attachmentStorage", K::AttachmentStorage, false, D::Text("local")),
    option("attachmentStorageChannelId", K::Identifier, true, D::Null),
    option("port", K::Port, false, D::UnsignedInteger(8890)),
    option("url", K::Text, true, D::Null),
    option("dbDir", K::Path, false, D::InstallationPath("db")),
    option("knex", K::Database, true, D::Null),
    option("logDir", K::Path, false, D::InstallationPath("logs")),
];


/// Looks up a recognized option by its exact (case-sensitive) name.
pub fn find_option(name: &str) -> Option<&'static ConfigurationOption> {
    OPTIONS.iter().find(|option| option.name == name)
}


/// The process-level inputs that defaults depend on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaContext {
    pub installation_root: PathBuf,
    pub environment_token: Option<String>,
}

impl SchemaContext {
    pub fn new<P: Into<PathBuf>>(installation_root: P, environment_token: Option<String>) -> Self {
        Self {
            installation_root: installation_root.into(),
            environment_token,
        }
    }

    /// Reads the token from the process environment.
    pub fn from_process_environment<P: Into<PathBuf>>(installation_root: P) -> Self {
        Self::new(
            installation_root,
            std::env::var(TOKEN_ENVIRONMENT_VARIABLE).ok(),
        )
    }

    fn installation_path(&self, directory_name: &str) -> Value {
        path_to_value(&self.installation_root.join(directory_name))
    }
}


/// The fully-populated default mapping, one entry per option in [`OPTIONS`].
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDefaults {
    values: Map<String, Value>,
}

impl SchemaDefaults {
    pub fn new(context: &SchemaContext) -> Self {
        let values = OPTIONS
            .iter()
            .map(|option| {
                let value = match option.default {
                    DefaultValue::Null => Value::Null,
                    DefaultValue::Boolean(value) => Value::Bool(value),
                    DefaultValue::Text(value) => Value::String(value.to_string()),
                    DefaultValue::UnsignedInteger(value) => Value::from(value),
                    DefaultValue::EnvironmentToken => context
                        .environment_token
                        .clone()
                        .map_or(Value::Null, Value::String),
                    DefaultValue::InstallationPath(name) => context.installation_path(name),
                };

                (option.name.to_string(), value)
            })
            .collect();

        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub(crate) fn into_values(self) -> Map<String, Value> {
        self.values
    }
}


/// Truthiness as operators expect it from the JSON they wrote:
/// `null`, `false`, `0` and `""` are falsy, everything else (including `[]` and `{}`) is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(value) => *value,
        Value::Number(number) => number.as_f64().is_some_and(|number| number != 0.0),
        Value::String(value) => !value.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}


pub(crate) fn path_to_value(path: &Path) -> Value {
    Value::String(path.to_string_lossy().into_owned())
}
