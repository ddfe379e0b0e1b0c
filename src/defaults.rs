//! Default values for course-repos configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::path::{Path, PathBuf};

/// Directory that holds one clone per student unless `--repodir` says otherwise.
pub const DEFAULT_REPO_DIR: &str = "/tmp/repos";

/// Branch checked out before pulling an existing clone.
pub const DEFAULT_BRANCH: &str = "master";

/// Hosting platform used when the configuration does not name one.
pub const DEFAULT_PLATFORM_SERVER: &str = "https://git.ucsc.edu";

/// File name of the course configuration.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Returns the default configuration file path.
///
/// `config.json` in the current directory wins when it exists. Otherwise the
/// platform-appropriate configuration directory is used:
/// - Linux: `~/.config/course-repos/config.json`
/// - macOS: `~/Library/Application Support/course-repos/config.json`
/// - Windows: `{FOLDERID_RoamingAppData}\course-repos\config.json`
///
/// Falls back to `config.json` in the current directory if the platform
/// configuration directory cannot be determined.
///
/// This can be overridden by the `--config` CLI flag or the
/// `COURSE_REPOS_CONFIG` environment variable.
pub fn default_config_path() -> PathBuf {
    let local = Path::new(CONFIG_FILE_NAME);
    if local.exists() {
        return local.to_path_buf();
    }

    dirs::config_dir()
        .map(|dir| dir.join("course-repos").join(CONFIG_FILE_NAME))
        .unwrap_or_else(|| local.to_path_buf())
}
