//! Windows Boot Manager on UEFI, plus unattend.xml placement.
//!
//! The unattend document routinely carries local-account passwords. Its
//! content only ever travels inside the script argument of one command;
//! descriptions and log lines carry the SHA-256 prefix and byte length.

use std::fmt;

use serde::Deserialize;

use crate::command::{self, Command, Plan, quote};
use crate::defaults;
use crate::error::{Error, Result};
use crate::paths;
use crate::script;

const PLANNER: &str = "bootloader-windows";

/// Base heredoc terminator for the unattend document.
pub const UNATTEND_TERMINATOR: &str = "SHOAL_UNATTEND_EOF";

/// Loader path as the firmware sees it on the ESP.
const FIRMWARE_LOADER: &str = r"\EFI\Microsoft\Boot\bootmgfw.efi";

/// Options for making an applied Windows image bootable.
///
/// `Debug` redacts the unattend content.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowsBootOptions {
    /// Mount point for the Windows partition
    pub windows_path: String,
    /// Mount point for the EFI system partition
    pub esp_mount_path: String,
    /// EFI system partition device
    pub esp_device: String,
    /// NTFS partition holding the applied image
    pub windows_device: String,
    /// Name of the boot manager being installed
    pub bootloader_id: String,
    /// Firmware boot entry label
    pub boot_entry_label: String,
    /// unattend.xml content, written to `Windows/Panther/Unattend.xml`.
    /// Never read from configuration files.
    #[serde(skip)]
    pub unattend_xml: String,
}

impl Default for WindowsBootOptions {
    fn default() -> Self {
        Self {
            windows_path: defaults::WINDOWS_PATH.to_string(),
            esp_mount_path: defaults::ESP_MOUNT_PATH.to_string(),
            esp_device: String::new(),
            windows_device: String::new(),
            bootloader_id: defaults::WINDOWS_BOOTLOADER_ID.to_string(),
            boot_entry_label: defaults::WINDOWS_BOOT_ENTRY_LABEL.to_string(),
            unattend_xml: String::new(),
        }
    }
}

impl fmt::Debug for WindowsBootOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowsBootOptions")
            .field("windows_path", &self.windows_path)
            .field("esp_mount_path", &self.esp_mount_path)
            .field("esp_device", &self.esp_device)
            .field("windows_device", &self.windows_device)
            .field("bootloader_id", &self.bootloader_id)
            .field("boot_entry_label", &self.boot_entry_label)
            .field(
                "unattend_xml",
                &format_args!("<{} bytes>", self.unattend_xml.len()),
            )
            .finish()
    }
}

/// Plan boot file installation, the firmware entry and unattend.xml.
pub fn plan_windows(opts: &WindowsBootOptions) -> Result<Plan> {
    if opts.esp_device.is_empty() {
        return Err(Error::missing(PLANNER, "ESP device"));
    }
    if opts.windows_device.is_empty() {
        return Err(Error::missing(PLANNER, "Windows device"));
    }
    if opts.unattend_xml.is_empty() {
        return Err(Error::missing(PLANNER, "unattend XML"));
    }

    let win = paths::or_default(&opts.windows_path, defaults::WINDOWS_PATH);
    let esp = paths::or_default(&opts.esp_mount_path, defaults::ESP_MOUNT_PATH);
    let bootloader_id = if opts.bootloader_id.is_empty() {
        defaults::WINDOWS_BOOTLOADER_ID
    } else {
        opts.bootloader_id.as_str()
    };
    let label = if opts.boot_entry_label.is_empty() {
        defaults::WINDOWS_BOOT_ENTRY_LABEL
    } else {
        opts.boot_entry_label.as_str()
    };

    let boot_src = paths::join(&win, &["Windows/Boot/EFI"]);
    let ms_boot = paths::join(&esp, &["EFI/Microsoft/Boot"]);
    let fallback_dir = paths::join(&esp, &["EFI/Boot"]);

    let digest = script::sha256_hex(opts.unattend_xml.as_bytes());
    let short = script::digest_prefix(&digest);

    let cmds = vec![
        Command::new("mkdir", ["-p", esp.as_str()], "ensure ESP mount point exists"),
        Command::new("mkdir", ["-p", win.as_str()], "ensure Windows mount point exists"),
        Command::new("mount", [opts.esp_device.as_str(), esp.as_str()], "mount EFI system partition"),
        Command::new(
            "mount",
            ["-t", "ntfs-3g", opts.windows_device.as_str(), win.as_str()],
            "mount Windows partition",
        ),
        Command::new(
            "mkdir",
            ["-p", ms_boot.as_str()],
            "ensure Microsoft boot directory exists on ESP",
        ),
        Command::new(
            "cp",
            ["-a".to_string(), format!("{boot_src}/."), format!("{ms_boot}/")],
            format!("copy {bootloader_id} files to ESP"),
        ),
        Command::new(
            "mkdir",
            ["-p", fallback_dir.as_str()],
            "ensure fallback boot directory exists on ESP",
        ),
        Command::new(
            "cp",
            [
                paths::join(&ms_boot, &["bootmgfw.efi"]),
                paths::join(&fallback_dir, &["bootx64.efi"]),
            ],
            "install fallback UEFI loader",
        ),
        Command::bash(
            boot_entry_script(&opts.esp_device, label),
            format!("ensure firmware boot entry {label:?} for {bootloader_id}"),
        ),
        Command::bash(
            unattend_script(&win, &opts.unattend_xml, &digest),
            format!("ensure unattend.xml present (sha256: {short})"),
        ),
        Command::new("umount", [win.as_str()], "unmount Windows partition"),
        Command::new("umount", [esp.as_str()], "unmount ESP"),
    ];

    log::debug!(
        "windows boot plan for {}: unattend.xml sha256 {short}, {} bytes, {} commands",
        opts.windows_device,
        opts.unattend_xml.len(),
        cmds.len()
    );
    command::trace_plan(PLANNER, &cmds);
    Ok(cmds)
}

/// Create the firmware entry unless one with `label` is already listed.
fn boot_entry_script(esp_dev: &str, label: &str) -> String {
    // grep reads all input so efibootmgr never dies of SIGPIPE under pipefail
    format!(
        r#"set -euo pipefail
ESP_DEV={esp_dev}
LABEL={label}
ESP_PART_NUM=$(lsblk -no PARTN "$ESP_DEV" | head -n1 | tr -d '[:space:]')
ESP_DISK=$(lsblk -no PKNAME "$ESP_DEV" | head -n1 | tr -d '[:space:]')
if [[ -z "$ESP_PART_NUM" || -z "$ESP_DISK" ]]; then
  echo "{PLANNER}: unable to resolve disk and partition number for $ESP_DEV" >&2
  exit 1
fi
if efibootmgr | grep -F -- "$LABEL" >/dev/null; then
  echo "{PLANNER}: boot entry '$LABEL' already present, skipping creation" >&2
  exit 0
fi
efibootmgr --create --disk "/dev/$ESP_DISK" --part "$ESP_PART_NUM" --label "$LABEL" --loader {loader}
"#,
        esp_dev = quote(esp_dev),
        label = quote(label),
        loader = quote(FIRMWARE_LOADER),
    )
}

/// Write `content` to `Windows/Panther/Unattend.xml` unless the file already
/// hashes to `digest`.
///
/// The file is staged under a private umask and truncated to the content
/// length, so its hash matches `digest` exactly, before being renamed into
/// place.
fn unattend_script(win: &str, content: &str, digest: &str) -> String {
    let target = paths::join(win, &["Windows/Panther/Unattend.xml"]);
    let panther = paths::parent(&target);
    let terminator = script::heredoc_terminator(content, UNATTEND_TERMINATOR);
    let short = script::digest_prefix(digest);

    format!(
        r#"set -euo pipefail
umask 077
PANTHER_DIR={panther}
UNATTEND_FILE={target}
NEW_HASH={digest}
if [[ -f "$UNATTEND_FILE" ]]; then
  EXISTING_HASH=$(sha256sum "$UNATTEND_FILE" | awk '{{print $1}}')
  if [[ "$EXISTING_HASH" == "$NEW_HASH" ]]; then
    echo "{PLANNER}: unattend.xml unchanged (sha256: {short}), skipping write" >&2
    exit 0
  fi
fi
mkdir -p "$PANTHER_DIR"
TMP_FILE="$UNATTEND_FILE.tmp.$$"
trap 'rm -f "$TMP_FILE"' EXIT
cat > "$TMP_FILE" <<'{terminator}'
{body}
truncate -s {len} "$TMP_FILE"
chmod 0600 "$TMP_FILE"
mv -f "$TMP_FILE" "$UNATTEND_FILE"
echo "{PLANNER}: unattend.xml written (sha256: {short})" >&2
"#,
        panther = quote(&panther),
        target = quote(&target),
        body = script::heredoc_body(content, &terminator),
        len = content.len(),
    )
}
