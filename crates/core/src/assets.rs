use once_cell::sync::Lazy;
use std::path::PathBuf;

/// `base`, or `$HOME/<home_relative>` when the platform has no such directory.
fn app_dir(base: Option<PathBuf>, home_relative: &str) -> PathBuf {
    base.or_else(|| dirs::home_dir().map(|home| home.join(home_relative)))
        .unwrap_or_else(std::env::temp_dir)
        .join("chatwise")
}

static DEFAULT_DATA_DIR: Lazy<PathBuf> =
    Lazy::new(|| app_dir(dirs::data_local_dir(), ".local/share"));

// Used when XDG_CONFIG_HOME is not set
static DEFAULT_CONFIG_DIR: Lazy<PathBuf> = Lazy::new(|| app_dir(dirs::config_dir(), ".config"));

pub fn get_config_dir() -> PathBuf {
    if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg_config_home).join("chatwise")
    } else {
        DEFAULT_CONFIG_DIR.clone()
    }
}

pub fn get_data_dir() -> std::io::Result<PathBuf> {
    let path = if let Ok(xdg_data_home) = std::env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg_data_home).join("chatwise")
    } else {
        DEFAULT_DATA_DIR.clone()
    };
    std::fs::create_dir_all(&path)?;
    Ok(path)
}

pub fn get_default_config() -> String {
    include_str!("../data/config.yml").to_string()
}
