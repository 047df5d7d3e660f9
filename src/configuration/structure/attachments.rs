use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::configuration::{
    error::ConfigurationError,
    schema::{is_truthy, SMALL_ATTACHMENT_LIMIT_CAP},
};


/// Where relayed attachments are kept.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentStorage {
    /// On disk, served by the bot's own web server.
    Local,
    /// Re-uploaded to a dedicated Discord channel (`attachmentStorageChannelId`).
    Discord,
}


/// Something that was wrong with the configuration, but was corrected automatically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationWarning {
    SmallAttachmentLimitCapped { requested: u64, cap: u64 },
}

impl Display for ConfigurationWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::SmallAttachmentLimitCapped { requested, cap } => write!(
                f,
                "smallAttachmentLimit capped at {}MB (requested {requested} bytes, using {cap} bytes)",
                cap / (1024 * 1024)
            ),
        }
    }
}


/// Clamps `smallAttachmentLimit` to [`SMALL_ATTACHMENT_LIMIT_CAP`].
pub(crate) fn cap_small_attachment_limit(requested: u64) -> (u64, Option<ConfigurationWarning>) {
    if requested > SMALL_ATTACHMENT_LIMIT_CAP {
        (
            SMALL_ATTACHMENT_LIMIT_CAP,
            Some(ConfigurationWarning::SmallAttachmentLimitCapped {
                requested,
                cap: SMALL_ATTACHMENT_LIMIT_CAP,
            }),
        )
    } else {
        (requested, None)
    }
}


/// Discord storage needs to know which channel to upload to.
/// Checked on the merged mapping, so "unset" means falsy exactly like required options.
pub(crate) fn check_attachment_storage(
    merged: &Map<String, Value>,
) -> Result<(), ConfigurationError> {
    let uses_discord =
        merged.get("attachmentStorage").and_then(Value::as_str) == Some("discord");
    let has_channel = merged
        .get("attachmentStorageChannelId")
        .is_some_and(is_truthy);

    if uses_discord && !has_channel {
        return Err(ConfigurationError::InvalidStorageConfiguration);
    }

    Ok(())
}
