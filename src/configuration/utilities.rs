use std::{env::current_dir, path::Path, path::PathBuf};

use miette::{miette, Context, IntoDiagnostic, Result};
use tracing::debug;

use super::error::ConfigurationError;


/// Configuration file names we look for in the installation root, in priority order.
///
/// The odd `.json.json` and `.json.txt` variants exist because file managers like to
/// hide (and then append) extensions.
pub const CANDIDATE_FILE_NAMES: [&str; 5] = [
    "config.json",
    "config.json5",
    "config.json.json",
    "config.json.txt",
    "config.js",
];


/// Returns the default installation root, which is the current directory.
pub fn get_default_installation_root() -> Result<PathBuf> {
    let installation_root = current_dir()
        .into_diagnostic()
        .wrap_err_with(|| miette!("Could not get the current directory."))?;

    dunce::canonicalize(&installation_root)
        .into_diagnostic()
        .wrap_err_with(|| {
            miette!(
                "Could not canonicalize installation root {}.",
                installation_root.display()
            )
        })
}


/// Returns the first of [`CANDIDATE_FILE_NAMES`] that exists as a file inside `installation_root`.
///
/// Only existence is checked here; a file that exists but cannot be read or parsed
/// is reported later by the parser.
pub fn locate_configuration_file(
    installation_root: &Path,
) -> Result<&'static str, ConfigurationError> {
    for candidate in CANDIDATE_FILE_NAMES {
        let candidate_path = installation_root.join(candidate);

        if candidate_path.is_file() {
            debug!(path = %candidate_path.display(), "found configuration file");
            return Ok(candidate);
        }

        debug!(path = %candidate_path.display(), "configuration candidate does not exist");
    }

    Err(ConfigurationError::ConfigNotFound {
        installation_root: installation_root.to_path_buf(),
        candidates: CANDIDATE_FILE_NAMES.to_vec(),
    })
}
