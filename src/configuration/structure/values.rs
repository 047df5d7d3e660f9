use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Deserializer, Serialize};


/// A Discord identifier (or an option that may name one, like a role mention).
/// Users write these both as strings and as bare integers, we always keep the decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Snowflake(String);

impl Snowflake {
    pub fn new<S: Into<String>>(value: S) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Display for Snowflake {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Snowflake {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawSnowflake {
            Text(String),
            Integer(u64),
        }

        Ok(match RawSnowflake::deserialize(deserializer)? {
            RawSnowflake::Text(value) => Self(value),
            RawSnowflake::Integer(value) => Self(value.to_string()),
        })
    }
}


/// Options that take either a single value or an array of them.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub(crate) enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            Self::Many(values) => values,
            Self::One(value) => vec![value],
        }
    }
}
