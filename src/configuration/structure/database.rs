use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::configuration::{
    error::ConfigurationError,
    schema::path_to_value,
    traits::ResolvableConfiguration,
};


pub const DEFAULT_DATABASE_CLIENT: &str = "sqlite";
pub const DATABASE_FILE_NAME: &str = "data.sqlite";
pub const MIGRATIONS_DIRECTORY_NAME: &str = "migrations";

const DATABASE_OPTION: &str = "knex";
const MIGRATIONS_FIELD: &str = "migrations";
const MIGRATIONS_DIRECTORY_FIELD: &str = "directory";


/// Fills in the `knex` option of a merged mapping.
///
/// An unset `knex` becomes a local SQLite database inside `db_directory`.
/// Whatever the user supplied, `knex.migrations.directory` is always forced to
/// `{db_directory}/migrations`; every other field the user set is kept.
pub(crate) fn derive_database_option(merged: &mut Map<String, Value>, db_directory: &Path) {
    let mut database = match merged.remove(DATABASE_OPTION) {
        Some(Value::Object(database)) => database,
        _ => default_database_mapping(db_directory),
    };

    let mut migrations = match database.remove(MIGRATIONS_FIELD) {
        Some(Value::Object(migrations)) => migrations,
        _ => Map::new(),
    };
    migrations.insert(
        MIGRATIONS_DIRECTORY_FIELD.to_string(),
        path_to_value(&db_directory.join(MIGRATIONS_DIRECTORY_NAME)),
    );
    database.insert(MIGRATIONS_FIELD.to_string(), Value::Object(migrations));

    merged.insert(DATABASE_OPTION.to_string(), Value::Object(database));
}

fn default_database_mapping(db_directory: &Path) -> Map<String, Value> {
    let mut database = Map::new();
    database.insert("client".to_string(), json!(DEFAULT_DATABASE_CLIENT));
    database.insert(
        "connection".to_string(),
        json!({ "filename": path_to_value(&db_directory.join(DATABASE_FILE_NAME)) }),
    );
    database.insert("useNullAsDefault".to_string(), json!(true));

    database
}


#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(transparent)]
pub(crate) struct UnresolvedDatabaseConfiguration(Map<String, Value>);


/// Database connection settings, handed as-is to the query builder / migration runner.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,

    /// Either a connection string or a driver-specific object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_null_as_default: Option<bool>,

    pub migrations: MigrationsConfiguration,

    /// Any other driver options the user supplied.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MigrationsConfiguration {
    pub directory: PathBuf,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}


impl ResolvableConfiguration for UnresolvedDatabaseConfiguration {
    type Resolved = DatabaseConfiguration;

    fn resolve(self) -> Result<Self::Resolved, ConfigurationError> {
        serde_json::from_value(Value::Object(self.0)).map_err(|error| {
            ConfigurationError::InvalidStructure {
                message: format!("{DATABASE_OPTION}: {error}"),
            }
        })
    }
}


impl DatabaseConfiguration {
    /// Path of the database file, if this is an SQLite configuration
    /// with an object-style connection.
    pub fn sqlite_filename(&self) -> Option<PathBuf> {
        let client = self.client.as_deref()?;
        if !client.starts_with("sqlite") && client != "better-sqlite3" {
            return None;
        }

        self.connection
            .as_ref()?
            .get("filename")?
            .as_str()
            .map(PathBuf::from)
    }
}
