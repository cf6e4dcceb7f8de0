//! `plan.toml`: per-planner defaults that CLI flags override.

use anyhow::{Context, Result};
use maintenance::bootloader::{LinuxBootOptions, WindowsBootOptions};
use maintenance::configdrive::ConfigDriveOptions;
use maintenance::image::{RootfsOptions, WindowsImageOptions};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths;

/// Defaults loaded from `plan.toml`. Every table is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlanConfig {
    pub image: RootfsOptions,
    pub image_windows: WindowsImageOptions,
    pub bootloader: LinuxBootOptions,
    pub bootloader_windows: WindowsBootOptions,
    pub configdrive: ConfigDriveOptions,
}

impl PlanConfig {
    /// Load the defaults file.
    ///
    /// An explicit path must exist. The default `plan.toml` may be absent,
    /// in which case built-in defaults apply.
    pub fn load(explicit: Option<&str>) -> Result<Self> {
        let (path, required) = match explicit {
            Some(path) => (paths::expand(path), true),
            None => (paths::config_file()?, false),
        };
        Self::load_from(&path, required)
    }

    fn load_from(path: &Path, required: bool) -> Result<Self> {
        if !required && !path.exists() {
            log::debug!("No config at {}, using built-in defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid config format in {}", path.display()))?;
        config.expand_paths();
        log::info!("Loaded defaults from {}", path.display());
        Ok(config)
    }

    fn expand_paths(&mut self) {
        for path in [
            &mut self.image.root_path,
            &mut self.image_windows.windows_path,
            &mut self.bootloader.root_path,
            &mut self.bootloader.esp_mount_path,
            &mut self.bootloader_windows.windows_path,
            &mut self.bootloader_windows.esp_mount_path,
            &mut self.configdrive.mount_path,
            &mut self.configdrive.user_data_path,
            &mut self.configdrive.meta_data_path,
        ] {
            *path = paths::expand_str(path);
        }
    }
}

/// Read a file named on the command line, `~` expanded.
pub fn read_input(path: &str) -> Result<Vec<u8>> {
    let path: PathBuf = paths::expand(path);
    fs::read(&path).with_context(|| format!("Could not read {}", path.display()))
}
