//! Host environment utility functions

use std::path::PathBuf;

/// Name of the environment variable pointing at the software root directory.
pub const SW_ROOT_ENV_VAR: &str = "AUTODRIVE_SW_ROOT";

/// Get the software root directory from the environment.
///
/// The `params` and `sessions` directories live under this root.
pub fn get_autodrive_sw_root() -> Result<PathBuf, std::env::VarError> {
    std::env::var(SW_ROOT_ENV_VAR).map(PathBuf::from)
}
