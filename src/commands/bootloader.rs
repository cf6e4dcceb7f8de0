use anyhow::{Context as _, Result};
use maintenance::bootloader::{self, LinuxBootOptions, WindowsBootOptions};

use super::{emit, set, set_path};
use crate::Context;
use crate::cli::{BootloaderArgs, BootloaderWindowsArgs};
use crate::config::{self, PlanConfig};

pub fn run(ctx: &Context, args: BootloaderArgs) -> Result<()> {
    let plan = bootloader::plan(&linux_options(&ctx.config, args))?;
    emit(ctx, &plan)
}

pub fn run_windows(ctx: &Context, args: BootloaderWindowsArgs) -> Result<()> {
    let unattend = config::read_input(&args.unattend)?;
    let unattend = String::from_utf8(unattend)
        .with_context(|| format!("{} is not valid UTF-8", args.unattend))?;
    let opts = windows_options(&ctx.config, args, unattend);
    let plan = bootloader::plan_windows(&opts)?;
    emit(ctx, &plan)
}

fn linux_options(config: &PlanConfig, args: BootloaderArgs) -> LinuxBootOptions {
    let mut opts = config.bootloader.clone();
    set(&mut opts.esp_device, args.esp_device);
    set(&mut opts.root_device, args.root_device);
    set_path(&mut opts.root_path, args.root);
    set_path(&mut opts.esp_mount_path, args.esp_mount);
    set(&mut opts.root_fs_type, args.root_fs_type);
    set(&mut opts.bootloader_id, args.bootloader_id);
    set(&mut opts.grub_target, args.grub_target);
    opts
}

fn windows_options(
    config: &PlanConfig,
    args: BootloaderWindowsArgs,
    unattend_xml: String,
) -> WindowsBootOptions {
    let mut opts = config.bootloader_windows.clone();
    set(&mut opts.esp_device, args.esp_device);
    set(&mut opts.windows_device, args.windows_device);
    set_path(&mut opts.windows_path, args.windows_path);
    set_path(&mut opts.esp_mount_path, args.esp_mount);
    set(&mut opts.bootloader_id, args.bootloader_id);
    set(&mut opts.boot_entry_label, args.boot_entry_label);
    opts.unattend_xml = unattend_xml;
    opts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linux_args() -> BootloaderArgs {
        BootloaderArgs {
            esp_device: None,
            root_device: Some("/dev/sda2".to_string()),
            root: None,
            esp_mount: None,
            root_fs_type: None,
            bootloader_id: None,
            grub_target: None,
        }
    }

    #[test]
    fn test_linux_config_supplies_missing_flags() {
        let mut config = PlanConfig::default();
        config.bootloader.esp_device = "/dev/sda1".to_string();
        config.bootloader.root_fs_type = "xfs".to_string();

        let opts = linux_options(&config, linux_args());
        assert_eq!(opts.esp_device, "/dev/sda1");
        assert_eq!(opts.root_device, "/dev/sda2");
        assert_eq!(opts.root_fs_type, "xfs");
        assert!(bootloader::plan(&opts).is_ok());
    }

    #[test]
    fn test_linux_missing_device_fails() {
        let opts = linux_options(&PlanConfig::default(), linux_args());
        assert!(bootloader::plan(&opts).is_err());
    }

    #[test]
    fn test_windows_flags_win() {
        let mut config = PlanConfig::default();
        config.bootloader_windows.boot_entry_label = "Config Label".to_string();

        let opts = windows_options(
            &config,
            BootloaderWindowsArgs {
                esp_device: Some("/dev/sda1".to_string()),
                windows_device: Some("/dev/sda3".to_string()),
                unattend: "unattend.xml".to_string(),
                windows_path: None,
                esp_mount: None,
                bootloader_id: None,
                boot_entry_label: Some("Flag Label".to_string()),
            },
            "<unattend/>".to_string(),
        );
        assert_eq!(opts.boot_entry_label, "Flag Label");
        assert_eq!(opts.unattend_xml, "<unattend/>");
        assert_eq!(bootloader::plan_windows(&opts).unwrap().len(), 12);
    }
}
