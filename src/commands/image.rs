use anyhow::Result;
use maintenance::image::{self, RootfsOptions, WindowsImageOptions};

use super::{emit, set, set_path};
use crate::Context;
use crate::cli::{ImageArgs, ImageWindowsArgs};
use crate::config::PlanConfig;
use crate::ui;

pub fn run(ctx: &Context, args: ImageArgs) -> Result<()> {
    let plan = image::plan(&rootfs_options(&ctx.config, args))?;
    emit(ctx, &plan)
}

pub fn run_windows(ctx: &Context, args: ImageWindowsArgs) -> Result<()> {
    let idempotent = args.idempotent;
    let opts = windows_options(&ctx.config, args);
    if opts.wim_index < 1 {
        ui::warn(&format!("WIM index {} is below 1, using 1", opts.wim_index));
    }
    let plan = if idempotent {
        image::plan_windows_idempotent(&opts)?
    } else {
        image::plan_windows(&opts)?
    };
    emit(ctx, &plan)
}

fn rootfs_options(config: &PlanConfig, args: ImageArgs) -> RootfsOptions {
    let mut opts = config.image.clone();
    set(&mut opts.oci_url, args.oci_url);
    set_path(&mut opts.root_path, args.root);
    opts
}

fn windows_options(config: &PlanConfig, args: ImageWindowsArgs) -> WindowsImageOptions {
    let mut opts = config.image_windows.clone();
    set(&mut opts.oci_url, args.oci_url);
    set(&mut opts.partition_dev, args.partition);
    set_path(&mut opts.windows_path, args.windows_path);
    set(&mut opts.wim_index, args.wim_index);
    opts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let mut config = PlanConfig::default();
        config.image_windows.oci_url = "registry/win:1".to_string();
        config.image_windows.wim_index = 3;

        let opts = windows_options(
            &config,
            ImageWindowsArgs {
                oci_url: None,
                partition: Some("/dev/sda3".to_string()),
                windows_path: None,
                wim_index: Some(2),
                idempotent: false,
            },
        );
        assert_eq!(opts.oci_url, "registry/win:1");
        assert_eq!(opts.partition_dev, "/dev/sda3");
        assert_eq!(opts.windows_path, "/mnt/new-windows");
        assert_eq!(opts.wim_index, 2);
    }

    #[test]
    fn test_rootfs_defaults_without_flags() {
        let opts = rootfs_options(
            &PlanConfig::default(),
            ImageArgs {
                oci_url: Some("registry:8080/img:1".to_string()),
                root: None,
            },
        );
        assert_eq!(opts.root_path, "/mnt/new-root");
        assert_eq!(image::plan(&opts).unwrap().len(), 2);
    }
}
