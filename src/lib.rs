//! Configuration loading for the modmail relay bot.
//!
//! The bot resolves its [`Configuration`][configuration::Configuration] exactly once at
//! startup and then passes it around as a shared, read-only value.

pub mod configuration;
pub mod logging;
