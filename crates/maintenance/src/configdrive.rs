//! cloud-init NoCloud seed writer.
//!
//! Populates a mounted CIDATA partition with `user-data` and `meta-data`.
//! When no meta-data file is supplied a minimal one is synthesised from the
//! instance id and hostname.

use serde::{Deserialize, Serialize};

use crate::command::{self, Command, Plan, quote};
use crate::defaults;
use crate::error::{Error, Result};
use crate::paths;

const PLANNER: &str = "configdrive";

/// Options for populating a config drive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigDriveOptions {
    /// Mount point for the CIDATA partition
    pub mount_path: String,
    /// CIDATA partition device
    pub device: String,
    /// user-data source on the executing host; a stale copy is removed when empty
    pub user_data_path: String,
    /// meta-data source on the executing host
    pub meta_data_path: String,
    /// `instance-id` of synthesised meta-data
    pub instance_id: String,
    /// `local-hostname` of synthesised meta-data
    pub hostname: String,
}

impl Default for ConfigDriveOptions {
    fn default() -> Self {
        Self {
            mount_path: defaults::CIDATA_MOUNT_PATH.to_string(),
            device: String::new(),
            user_data_path: defaults::USER_DATA_PATH.to_string(),
            meta_data_path: defaults::META_DATA_PATH.to_string(),
            instance_id: defaults::INSTANCE_ID.to_string(),
            hostname: defaults::HOSTNAME.to_string(),
        }
    }
}

/// Plan mounting the config drive, writing the seed files and unmounting.
pub fn plan(opts: &ConfigDriveOptions) -> Result<Plan> {
    if opts.device.is_empty() {
        return Err(Error::missing(PLANNER, "device"));
    }
    let mount = paths::or_default(&opts.mount_path, defaults::CIDATA_MOUNT_PATH);
    let instance_id = trimmed_or(&opts.instance_id, defaults::INSTANCE_ID);
    let hostname = trimmed_or(&opts.hostname, defaults::HOSTNAME);

    let cmds = vec![
        Command::new("mkdir", ["-p", mount.as_str()], "ensure CIDATA mount point exists"),
        Command::new("mount", [opts.device.as_str(), mount.as_str()], "mount CIDATA partition"),
        Command::bash(
            seed_script(
                &mount,
                &opts.user_data_path,
                &opts.meta_data_path,
                instance_id,
                hostname,
            ),
            "populate cloud-init user-data and meta-data",
        ),
        Command::new("umount", [mount.as_str()], "unmount CIDATA partition"),
    ];

    log::debug!(
        "config drive plan for {} ({instance_id}/{hostname}): {} commands",
        opts.device,
        cmds.len()
    );
    command::trace_plan(PLANNER, &cmds);
    Ok(cmds)
}

fn trimmed_or<'a>(value: &'a str, default: &'a str) -> &'a str {
    match value.trim() {
        "" => default,
        trimmed => trimmed,
    }
}

fn seed_script(
    cidata: &str,
    user_src: &str,
    meta_src: &str,
    instance_id: &str,
    hostname: &str,
) -> String {
    format!(
        r#"set -euo pipefail
CIDATA={cidata}
USER_SRC={user_src}
META_SRC={meta_src}
INSTANCE_ID={instance_id}
LOCAL_HOSTNAME={hostname}

if [[ ! -d "$CIDATA" ]]; then
  echo "{PLANNER}: mount path $CIDATA not accessible" >&2
  exit 1
fi

STAGING=$(mktemp -d)
trap 'rm -rf "$STAGING"' EXIT

if [[ -n "$USER_SRC" && -f "$USER_SRC" ]]; then
  install -m 0644 "$USER_SRC" "$STAGING/user-data"
fi
if [[ -n "$META_SRC" && -f "$META_SRC" ]]; then
  install -m 0644 "$META_SRC" "$STAGING/meta-data"
else
  printf 'instance-id: %s\nlocal-hostname: %s\n' "$INSTANCE_ID" "$LOCAL_HOSTNAME" > "$STAGING/meta-data"
fi

if [[ -f "$STAGING/user-data" ]]; then
  install -m 0644 "$STAGING/user-data" "$CIDATA/user-data"
else
  rm -f "$CIDATA/user-data"
fi
install -m 0644 "$STAGING/meta-data" "$CIDATA/meta-data"
sync
"#,
        cidata = quote(cidata),
        user_src = quote(user_src),
        meta_src = quote(meta_src),
        instance_id = quote(instance_id),
        hostname = quote(hostname),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn opts() -> ConfigDriveOptions {
        ConfigDriveOptions {
            device: "/dev/sda4".to_string(),
            ..ConfigDriveOptions::default()
        }
    }

    fn run(script: &str) -> std::process::Output {
        std::process::Command::new("bash")
            .args(["-c", script])
            .output()
            .expect("bash should run")
    }

    #[test]
    fn test_plan_sequence() {
        let cmds = plan(&opts()).unwrap();
        let lines: Vec<String> = cmds.iter().map(Command::shell).collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "mkdir -p /mnt/cidata");
        assert_eq!(lines[1], "mount /dev/sda4 /mnt/cidata");
        assert_eq!(cmds[2].program(), "bash");
        assert_eq!(lines[3], "umount /mnt/cidata");
    }

    #[test]
    fn test_plan_script_values() {
        let cmds = plan(&ConfigDriveOptions {
            user_data_path: "/tmp/user data".to_string(),
            meta_data_path: String::new(),
            instance_id: "  node-7 ".to_string(),
            hostname: String::new(),
            ..opts()
        })
        .unwrap();
        let script = &cmds[2].args()[1];
        assert!(script.contains("CIDATA=/mnt/cidata\n"));
        assert!(script.contains("USER_SRC='/tmp/user data'\n"));
        assert!(script.contains("META_SRC=''\n"));
        assert!(script.contains("INSTANCE_ID=node-7\n"));
        assert!(script.contains("LOCAL_HOSTNAME=shoal-host\n"));
    }

    #[test]
    fn test_default_sources_point_at_provision_dir() {
        let cmds = plan(&opts()).unwrap();
        let script = &cmds[2].args()[1];
        assert!(script.contains("USER_SRC=/run/provision/user-data\n"));
        assert!(script.contains("META_SRC=/run/provision/meta-data\n"));
    }

    #[test]
    fn test_plan_requires_device() {
        let err = plan(&ConfigDriveOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "configdrive: device is required");
    }

    #[test]
    fn test_seed_script_synthesises_meta_data() {
        let cidata = tempfile::tempdir().unwrap();
        let sources = tempfile::tempdir().unwrap();
        let user_data = sources.path().join("user-data");
        fs::write(&user_data, "#cloud-config\n").unwrap();

        let cmds = plan(&ConfigDriveOptions {
            mount_path: cidata.path().to_str().unwrap().to_string(),
            user_data_path: user_data.to_str().unwrap().to_string(),
            meta_data_path: String::new(),
            instance_id: "node-7".to_string(),
            hostname: "rack1-node7".to_string(),
            ..opts()
        })
        .unwrap();
        let output = run(&cmds[2].args()[1]);
        assert!(output.status.success(), "{output:?}");

        assert_eq!(
            fs::read_to_string(cidata.path().join("meta-data")).unwrap(),
            "instance-id: node-7\nlocal-hostname: rack1-node7\n"
        );
        assert_eq!(
            fs::read_to_string(cidata.path().join("user-data")).unwrap(),
            "#cloud-config\n"
        );
    }

    #[test]
    fn test_seed_script_removes_stale_user_data() {
        let cidata = tempfile::tempdir().unwrap();
        fs::write(cidata.path().join("user-data"), "old").unwrap();

        let cmds = plan(&ConfigDriveOptions {
            mount_path: cidata.path().to_str().unwrap().to_string(),
            user_data_path: String::new(),
            meta_data_path: String::new(),
            ..opts()
        })
        .unwrap();
        let output = run(&cmds[2].args()[1]);
        assert!(output.status.success(), "{output:?}");
        assert!(!cidata.path().join("user-data").exists());
        assert!(cidata.path().join("meta-data").exists());
    }

    #[test]
    fn test_seed_script_fails_without_mount() {
        let cmds = plan(&ConfigDriveOptions {
            mount_path: "/nonexistent/cidata".to_string(),
            ..opts()
        })
        .unwrap();
        let output = run(&cmds[2].args()[1]);
        assert!(!output.status.success());
    }
}
