//! Config directory resolution for shoal-plan
//!
//! # Environment Variables
//!
//! - `SHOAL_PLAN_CONFIG_DIR` - Override config directory
//!
//! # Path Resolution Priority
//!
//! For config_dir():
//! 1. `SHOAL_PLAN_CONFIG_DIR` environment variable
//! 2. `XDG_CONFIG_HOME/shoal` (if set)
//! 3. `~/.config/shoal`

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Environment variable for config directory override
pub const ENV_CONFIG_DIR: &str = "SHOAL_PLAN_CONFIG_DIR";

/// Name of the defaults file inside the config directory
pub const CONFIG_FILE: &str = "plan.toml";

/// Get the shoal config directory path
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = expand(&dir);
        log::debug!(
            "Using config dir from {}: {}",
            ENV_CONFIG_DIR,
            path.display()
        );
        return Ok(path);
    }

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg_config.is_empty() {
            let path = PathBuf::from(xdg_config).join("shoal");
            log::debug!("Using XDG_CONFIG_HOME: {}", path.display());
            return Ok(path);
        }
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = home.join(".config").join("shoal");
    log::debug!("Using default config dir: {}", path.display());
    Ok(path)
}

/// Default location of `plan.toml`
pub fn config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE))
}

/// Expand ~ and environment variables in a path string.
pub fn expand(path: &str) -> PathBuf {
    PathBuf::from(expand_str(path))
}

/// Like [`expand`], for paths that end up inside a plan.
pub fn expand_str(path: &str) -> String {
    shellexpand::full(path)
        .unwrap_or(std::borrow::Cow::Borrowed(path))
        .into_owned()
}
