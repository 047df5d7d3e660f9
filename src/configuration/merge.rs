use serde_json::{Map, Value};
use tracing::debug;

use super::{
    error::ConfigurationError,
    schema::{find_option, SchemaDefaults},
    source::RawUserMapping,
};


/// Overlays `user_mapping` onto a copy of `defaults`.
///
/// Keys are processed in the user mapping's own order and the first problem stops
/// the merge: an unknown key fails with [`ConfigurationError::UnknownConfigOption`],
/// a value of the wrong shape with [`ConfigurationError::InvalidOptionType`].
pub fn merge_with_defaults(
    user_mapping: RawUserMapping,
    defaults: SchemaDefaults,
) -> Result<Map<String, Value>, ConfigurationError> {
    let mut merged = defaults.into_values();

    for (key, value) in user_mapping {
        let Some(option) = find_option(&key) else {
            return Err(ConfigurationError::UnknownConfigOption { option: key });
        };

        let is_acceptable = if value.is_null() {
            option.nullable
        } else {
            option.kind.accepts(&value)
        };

        if !is_acceptable {
            return Err(ConfigurationError::invalid_type(
                key,
                option.kind.expected(),
                &value,
            ));
        }

        debug!(option = option.name, "overriding default");
        merged.insert(key, value);
    }

    Ok(merged)
}
