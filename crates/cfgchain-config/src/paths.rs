use std::path::{Path, PathBuf};

/// XDG app name for user-level files.
pub const APP_NAME: &str = "cfgchain";
/// Project-level directory holding `config.toml` and the default store.
pub const PROJECT_DIR: &str = ".cfgchain";
pub const CONFIG_FILE: &str = "config.toml";
pub const DEFAULT_STORE_FILE: &str = "store.toml";

/// User config directory, e.g. `~/.config/cfgchain`.
///
/// Returns None if the home directory cannot be determined
/// (e.g., no HOME in containers).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

pub fn project_dir(project_root: &Path) -> PathBuf {
    project_root.join(PROJECT_DIR)
}

pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_dir(project_root).join(CONFIG_FILE)
}

pub fn default_store_path(project_root: &Path) -> PathBuf {
    project_dir(project_root).join(DEFAULT_STORE_FILE)
}
