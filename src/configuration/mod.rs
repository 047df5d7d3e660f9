//! This module contains all configuration-relevant code: locating the
//! configuration file, the option schema with its defaults, and the rules
//! that turn user values into the final [`Configuration`].
//!
//! Your starting point should probably be [`ConfigurationLoader`] or
//! [`Configuration::load_from_installation_root`].
//!
//! # Internals
//! Data only flows forward through these stages:
//! 1. [`locate_configuration_file`] picks the first existing of [`CANDIDATE_FILE_NAMES`],
//! 2. [`parse_configuration_source`] turns it into a [`RawUserMapping`],
//! 3. [`merge_with_defaults`] overlays it onto [`SchemaDefaults`], rejecting unknown keys
//!    and values of the wrong shape,
//! 4. the merged mapping is deserialized into the crate-private `UnresolvedConfiguration`
//!    (after the database table is derived and required options are checked),
//! 5. its `resolve` method applies the remaining rules and produces the [`Configuration`].
//!
//! Every failure is a [`ConfigurationError`]. Whether it should end the process with a
//! plain diagnostic or a full report is for the caller to decide, see
//! [`ConfigurationError::terminates_process`].

#![allow(rustdoc::private_intra_doc_links)]

mod error;
mod loader;
mod merge;
mod schema;
mod source;
mod structure;
mod traits;
mod utilities;

pub use error::ConfigurationError;
pub use loader::ConfigurationLoader;
pub use merge::merge_with_defaults;
pub use schema::{
    find_option,
    is_truthy,
    ConfigurationOption,
    OptionKind,
    SchemaContext,
    SchemaDefaults,
    OPTIONS,
    REQUIRED_OPTIONS,
    SMALL_ATTACHMENT_LIMIT_CAP,
    TOKEN_ENVIRONMENT_VARIABLE,
};
pub use source::{parse_configuration_source, ModuleProvider, RawUserMapping, SourceKind};
pub use structure::*;
pub use utilities::{get_default_installation_root, locate_configuration_file, CANDIDATE_FILE_NAMES};
