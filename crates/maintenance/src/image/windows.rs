//! WIM applier for Windows partitions.
//!
//! Two variants share the same options:
//! - [`plan_windows`]: mount, stream-apply, unmount as four plain commands
//! - [`plan_windows_idempotent`]: a single script that skips the apply when
//!   the image's manifest digest matches the stamp left by the last apply
//!
//! The digest is taken over the OCI manifest, not the WIM payload. It is
//! cheap to fetch but cannot notice a blob replaced in place under an
//! unchanged manifest; hashing the full image on every run costs too much.

use serde::{Deserialize, Serialize};

use crate::command::{self, Command, Plan, quote};
use crate::defaults;
use crate::error::{Error, Result};
use crate::paths;

/// Name of the digest stamp file, relative to the Windows mount point.
pub const WIM_DIGEST_STAMP: &str = ".provisioner_wim_digest";

/// Options for applying a WIM image to an NTFS partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowsImageOptions {
    /// OCI reference of the WIM artifact
    pub oci_url: String,
    /// Mount point for the Windows partition
    pub windows_path: String,
    /// Image index inside the WIM; values below 1 select index 1
    pub wim_index: i64,
    /// NTFS partition device, e.g. `/dev/sda3`
    pub partition_dev: String,
}

impl Default for WindowsImageOptions {
    fn default() -> Self {
        Self {
            oci_url: String::new(),
            windows_path: defaults::WINDOWS_PATH.to_string(),
            wim_index: defaults::WIM_INDEX,
            partition_dev: String::new(),
        }
    }
}

struct Resolved<'a> {
    url: &'a str,
    windows_path: String,
    index: i64,
    partition_dev: &'a str,
}

fn resolve(opts: &WindowsImageOptions) -> Result<Resolved<'_>> {
    let url = opts.oci_url.trim();
    if url.is_empty() {
        return Err(Error::missing("image", "OCI URL"));
    }
    let partition_dev = opts.partition_dev.trim();
    if partition_dev.is_empty() {
        return Err(Error::missing("image", "partition device"));
    }
    Ok(Resolved {
        url,
        windows_path: paths::or_default(&opts.windows_path, defaults::WINDOWS_PATH),
        index: opts.wim_index.max(defaults::WIM_INDEX),
        partition_dev,
    })
}

/// Plan mounting the partition, applying the WIM and unmounting again.
pub fn plan_windows(opts: &WindowsImageOptions) -> Result<Plan> {
    let r = resolve(opts)?;
    let win = r.windows_path.as_str();

    let cmds = vec![
        Command::new("mkdir", ["-p", win], "ensure Windows mount directory exists"),
        Command::new(
            "mount",
            ["-t", "ntfs-3g", r.partition_dev, win],
            "mount Windows partition",
        ),
        Command::bash(
            format!(
                "oras pull {} --output - | wimapply - {} --index={}",
                quote(r.url),
                quote(win),
                r.index
            ),
            format!("stream WIM image (index {})", r.index),
        ),
        Command::new("umount", [win], "unmount Windows partition"),
    ];

    log::debug!("WIM plan for {}: {} commands", r.url, cmds.len());
    command::trace_plan("image", &cmds);
    Ok(cmds)
}

/// Plan a digest-stamped WIM apply that is safe to re-run.
///
/// The script only unmounts the partition if it mounted it itself, and does
/// so on every exit path.
pub fn plan_windows_idempotent(opts: &WindowsImageOptions) -> Result<Plan> {
    let r = resolve(opts)?;

    let script = format!(
        r#"set -euo pipefail
WIN_PATH={win}
OCI_REF={url}
PART_DEV={dev}
WIM_INDEX={index}
STAMP_FILE="$WIN_PATH/{stamp}"
MOUNTED=0

cleanup() {{
  if [[ "$MOUNTED" == "1" ]]; then
    umount "$WIN_PATH"
  fi
}}
trap cleanup EXIT

mkdir -p "$WIN_PATH"
if mountpoint -q "$WIN_PATH"; then
  echo "image-windows: $WIN_PATH already mounted" >&2
else
  mount -t ntfs-3g "$PART_DEV" "$WIN_PATH"
  MOUNTED=1
fi

CURRENT_DIGEST=$(oras manifest fetch "$OCI_REF" | sha256sum | awk '{{print $1}}') || {{
  echo "image-windows: failed to fetch manifest for $OCI_REF" >&2
  exit 1
}}

if [[ -f "$STAMP_FILE" && "$(cat "$STAMP_FILE")" == "$CURRENT_DIGEST" ]]; then
  echo "image-windows: WIM digest unchanged ($CURRENT_DIGEST), skipping apply" >&2
  exit 0
fi

echo "image-windows: applying WIM (index=$WIM_INDEX, digest=$CURRENT_DIGEST)" >&2
oras pull "$OCI_REF" --output - | wimapply - "$WIN_PATH" --index="$WIM_INDEX"
echo "$CURRENT_DIGEST" > "$STAMP_FILE"
sync
"#,
        win = quote(&r.windows_path),
        url = quote(r.url),
        dev = quote(r.partition_dev),
        index = r.index,
        stamp = WIM_DIGEST_STAMP,
    );

    let cmds = vec![Command::bash(
        script,
        format!("idempotent WIM apply (index {}) with digest stamp", r.index),
    )];
    log::debug!("idempotent WIM plan for {} (index {})", r.url, r.index);
    command::trace_plan("image", &cmds);
    Ok(cmds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> WindowsImageOptions {
        WindowsImageOptions {
            oci_url: "controller:8080/os-images/windows-wim:22H2".to_string(),
            partition_dev: "/dev/sda3".to_string(),
            ..WindowsImageOptions::default()
        }
    }

    #[test]
    fn test_plan_windows_sequence() {
        let cmds = plan_windows(&opts()).unwrap();
        let lines: Vec<String> = cmds.iter().map(Command::shell).collect();
        assert_eq!(
            lines,
            vec![
                "mkdir -p /mnt/new-windows",
                "mount -t ntfs-3g /dev/sda3 /mnt/new-windows",
                "bash -c 'oras pull controller:8080/os-images/windows-wim:22H2 --output - | wimapply - /mnt/new-windows --index=1'",
                "umount /mnt/new-windows",
            ]
        );
    }

    #[test]
    fn test_plan_windows_custom_index() {
        let cmds = plan_windows(&WindowsImageOptions {
            wim_index: 3,
            ..opts()
        })
        .unwrap();
        assert!(cmds[2].args()[1].ends_with("--index=3"));
    }

    #[test]
    fn test_plan_windows_coerces_low_index() {
        for index in [0, -4] {
            let cmds = plan_windows(&WindowsImageOptions {
                wim_index: index,
                ..opts()
            })
            .unwrap();
            assert!(cmds[2].args()[1].ends_with("--index=1"));
        }
    }

    #[test]
    fn test_plan_windows_requires_fields() {
        let missing_url = WindowsImageOptions {
            oci_url: String::new(),
            ..opts()
        };
        assert!(plan_windows(&missing_url).is_err());
        assert!(plan_windows_idempotent(&missing_url).is_err());

        let missing_dev = WindowsImageOptions {
            partition_dev: " ".to_string(),
            ..opts()
        };
        let err = plan_windows(&missing_dev).unwrap_err();
        assert_eq!(err.to_string(), "image: partition device is required");
    }

    #[test]
    fn test_idempotent_is_single_script() {
        let cmds = plan_windows_idempotent(&opts()).unwrap();
        assert_eq!(cmds.len(), 1);
        assert_eq!(cmds[0].program(), "bash");
        assert_eq!(
            cmds[0].description(),
            "idempotent WIM apply (index 1) with digest stamp"
        );

        let script = &cmds[0].args()[1];
        assert!(script.starts_with("set -euo pipefail\n"));
        assert!(script.contains("WIN_PATH=/mnt/new-windows\n"));
        assert!(script.contains("PART_DEV=/dev/sda3\n"));
        assert!(script.contains("STAMP_FILE=\"$WIN_PATH/.provisioner_wim_digest\""));
        assert!(script.contains("oras manifest fetch \"$OCI_REF\" | sha256sum"));
        assert!(script.contains("skipping apply"));
        assert!(script.contains("wimapply - \"$WIN_PATH\" --index=\"$WIM_INDEX\""));
        assert!(script.contains("echo \"$CURRENT_DIGEST\" > \"$STAMP_FILE\"\nsync\n"));
    }

    #[test]
    fn test_idempotent_only_unmounts_own_mount() {
        let cmds = plan_windows_idempotent(&opts()).unwrap();
        let script = &cmds[0].args()[1];
        assert!(script.contains("if mountpoint -q \"$WIN_PATH\"; then"));
        assert!(script.contains("MOUNTED=1"));
        assert!(script.contains("trap cleanup EXIT"));
        assert_eq!(script.matches("umount").count(), 1);
    }

    #[test]
    fn test_idempotent_quotes_values() {
        let cmds = plan_windows_idempotent(&WindowsImageOptions {
            windows_path: "/mnt/win dows".to_string(),
            ..opts()
        })
        .unwrap();
        assert!(cmds[0].args()[1].contains("WIN_PATH='/mnt/win dows'\n"));
    }

    #[test]
    fn test_idempotent_script_parses() {
        let cmds = plan_windows_idempotent(&opts()).unwrap();
        let status = std::process::Command::new("bash")
            .args(["-n", "-c", &cmds[0].args()[1]])
            .status()
            .expect("bash should run");
        assert!(status.success());
    }
}
