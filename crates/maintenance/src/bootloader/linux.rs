//! GRUB on UEFI for a freshly imaged Linux root.

use serde::{Deserialize, Serialize};

use crate::command::{self, Command, Plan, quote};
use crate::defaults;
use crate::error::{Error, Result};
use crate::paths;

const PLANNER: &str = "bootloader";

/// Options for installing GRUB and writing `/etc/fstab`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinuxBootOptions {
    /// Mount point of the target root filesystem
    pub root_path: String,
    /// Mount point for the EFI system partition
    pub esp_mount_path: String,
    /// EFI system partition device
    pub esp_device: String,
    /// Root filesystem device
    pub root_device: String,
    /// Filesystem type written to the root fstab entry
    pub root_fs_type: String,
    /// `grub-install --bootloader-id`
    pub bootloader_id: String,
    /// `grub-install --target`
    pub grub_target: String,
}

impl Default for LinuxBootOptions {
    fn default() -> Self {
        Self {
            root_path: defaults::ROOT_PATH.to_string(),
            esp_mount_path: defaults::ESP_MOUNT_PATH.to_string(),
            esp_device: String::new(),
            root_device: String::new(),
            root_fs_type: defaults::ROOT_FS_TYPE.to_string(),
            bootloader_id: defaults::GRUB_BOOTLOADER_ID.to_string(),
            grub_target: defaults::GRUB_TARGET.to_string(),
        }
    }
}

/// Where the ESP appears inside the target root.
const ESP_IN_ROOT: &str = "/boot/efi";

/// Pseudo-filesystems bind-mounted into the root for `grub-install`.
const HOST_BINDS: [&str; 2] = ["dev", "sys"];

/// Plan GRUB installation and fstab generation for a Linux root.
///
/// The ESP is mounted first and unmounted last. The root filesystem is
/// mounted only when it is not mounted already, and is left mounted.
pub fn plan(opts: &LinuxBootOptions) -> Result<Plan> {
    if opts.esp_device.is_empty() {
        return Err(Error::missing(PLANNER, "ESP device"));
    }
    if opts.root_device.is_empty() {
        return Err(Error::missing(PLANNER, "root device"));
    }
    let fs_type = non_empty_or(&opts.root_fs_type, defaults::ROOT_FS_TYPE);
    if !is_fs_token(fs_type) {
        return Err(Error::InvalidOption {
            planner: PLANNER,
            field: "root filesystem type",
            value: fs_type.to_string(),
        });
    }

    let root = paths::or_default(&opts.root_path, defaults::ROOT_PATH);
    let esp_mount = paths::or_default(&opts.esp_mount_path, defaults::ESP_MOUNT_PATH);
    let bootloader_id = non_empty_or(&opts.bootloader_id, defaults::GRUB_BOOTLOADER_ID);
    let grub_target = non_empty_or(&opts.grub_target, defaults::GRUB_TARGET);
    let esp_dev = opts.esp_device.as_str();
    let root_dev = opts.root_device.as_str();

    let esp_in_root = paths::join(&root, &[ESP_IN_ROOT]);
    let proc_in_root = paths::join(&root, &["proc"]);
    let bind_targets: Vec<String> = HOST_BINDS
        .iter()
        .map(|dir| paths::join(&root, &[*dir]))
        .collect();

    let mut cmds = vec![
        Command::new("mkdir", ["-p", esp_mount.as_str()], "ensure ESP mount point exists"),
        Command::new("mount", [esp_dev, esp_mount.as_str()], "mount EFI system partition"),
        Command::new("mkdir", ["-p", root.as_str()], "ensure root mount point exists"),
        Command::bash(
            format!(
                "mountpoint -q {root_q} || mount {dev} {root_q}",
                root_q = quote(&root),
                dev = quote(root_dev),
            ),
            "mount root filesystem unless already mounted",
        ),
        Command::new(
            "mkdir",
            ["-p", esp_in_root.as_str(), proc_in_root.as_str()]
                .into_iter()
                .map(String::from)
                .chain(bind_targets.iter().cloned()),
            "ensure mount points exist inside root",
        ),
        Command::new(
            "mount",
            ["--bind", esp_mount.as_str(), esp_in_root.as_str()],
            "bind ESP into root",
        ),
    ];

    for (dir, target) in HOST_BINDS.iter().zip(&bind_targets) {
        cmds.push(Command::new(
            "mount",
            ["--rbind".to_string(), format!("/{dir}"), target.clone()],
            format!("bind /{dir} into root"),
        ));
    }
    cmds.push(Command::new(
        "mount",
        ["-t", "proc", "proc", proc_in_root.as_str()],
        "mount /proc inside root",
    ));

    cmds.push(Command::new(
        "chroot",
        [
            root.clone(),
            "grub-install".to_string(),
            format!("--target={grub_target}"),
            format!("--efi-directory={ESP_IN_ROOT}"),
            format!("--bootloader-id={bootloader_id}"),
        ],
        format!("install GRUB ({grub_target})"),
    ));

    cmds.push(Command::bash(
        fstab_script(&root, root_dev, esp_dev, fs_type),
        "generate /etc/fstab",
    ));

    cmds.push(Command::new("umount", [proc_in_root.as_str()], "unmount /proc inside root"));
    for (dir, target) in HOST_BINDS.iter().zip(&bind_targets).rev() {
        cmds.push(Command::new(
            "umount",
            ["-R".to_string(), target.clone()],
            format!("unbind /{dir} from root"),
        ));
    }
    cmds.push(Command::new("umount", [esp_in_root.as_str()], "unbind ESP from root"));
    cmds.push(Command::new("umount", [esp_mount.as_str()], "unmount ESP"));

    log::debug!(
        "bootloader plan for root {root_dev} / ESP {esp_dev}: {} commands",
        cmds.len()
    );
    command::trace_plan(PLANNER, &cmds);
    Ok(cmds)
}

fn fstab_script(root: &str, root_dev: &str, esp_dev: &str, fs_type: &str) -> String {
    // xfs and btrfs are never checked by fsck at boot
    let pass = u8::from(!matches!(fs_type, "xfs" | "btrfs"));
    format!(
        r#"set -euo pipefail
ROOT_PATH={root}
ROOT_DEV={root_dev}
ESP_DEV={esp_dev}
ROOT_UUID=$(blkid -s PARTUUID -o value "$ROOT_DEV")
ESP_UUID=$(blkid -s PARTUUID -o value "$ESP_DEV")
if [[ -z "$ROOT_UUID" || -z "$ESP_UUID" ]]; then
  echo "bootloader: unable to resolve PARTUUID for $ROOT_DEV or $ESP_DEV" >&2
  exit 1
fi
mkdir -p "$ROOT_PATH/etc"
cat > "$ROOT_PATH/etc/fstab" <<EOF
PARTUUID=$ROOT_UUID / {fs_type} defaults 0 {pass}
PARTUUID=$ESP_UUID {esp_in_root} vfat umask=0077 0 2
EOF
"#,
        root = quote(root),
        root_dev = quote(root_dev),
        esp_dev = quote(esp_dev),
        esp_in_root = ESP_IN_ROOT,
    )
}

fn non_empty_or<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.is_empty() { default } else { value }
}

/// Filesystem types end up verbatim in fstab, so only plain tokens pass.
fn is_fs_token(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}
