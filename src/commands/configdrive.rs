use anyhow::Result;
use maintenance::configdrive::{self, ConfigDriveOptions};

use super::{emit, set, set_path};
use crate::Context;
use crate::cli::ConfigDriveArgs;
use crate::config::PlanConfig;

pub fn run(ctx: &Context, args: ConfigDriveArgs) -> Result<()> {
    let plan = configdrive::plan(&options(&ctx.config, args))?;
    emit(ctx, &plan)
}

fn options(config: &PlanConfig, args: ConfigDriveArgs) -> ConfigDriveOptions {
    let mut opts = config.configdrive.clone();
    set(&mut opts.device, args.device);
    set_path(&mut opts.mount_path, args.mount);
    set_path(&mut opts.user_data_path, args.user_data);
    set_path(&mut opts.meta_data_path, args.meta_data);
    set(&mut opts.instance_id, args.instance_id);
    set(&mut opts.hostname, args.hostname);
    opts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_merge() {
        let mut config = PlanConfig::default();
        config.configdrive.device = "/dev/sda4".to_string();
        config.configdrive.hostname = "from-config".to_string();

        let opts = options(
            &config,
            ConfigDriveArgs {
                device: None,
                mount: Some("/mnt/seed".to_string()),
                user_data: None,
                meta_data: None,
                instance_id: Some("node-7".to_string()),
                hostname: None,
            },
        );
        assert_eq!(opts.device, "/dev/sda4");
        assert_eq!(opts.mount_path, "/mnt/seed");
        assert_eq!(opts.instance_id, "node-7");
        assert_eq!(opts.hostname, "from-config");

        let plan = configdrive::plan(&opts).unwrap();
        assert_eq!(plan[1].shell(), "mount /dev/sda4 /mnt/seed");
    }
}
