use std::path::PathBuf;

/// `<config_dir>/color-scheme-sync/config.toml`
pub fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("color-scheme-sync").join("config.toml"))
}

/// `<config_dir>/helix/config.toml`
pub fn default_helix_config() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("helix").join("config.toml"))
}
