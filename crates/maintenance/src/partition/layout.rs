//! Layout entries and the per-entry value types derived from them.

use serde::{Deserialize, Serialize};

use crate::command::Command;

/// Maximum GPT partition name length, in UTF-16 code units.
pub const MAX_LABEL_LEN: usize = 36;

/// One partition in a declarative disk layout.
///
/// The partition number is the entry's 1-based position in the layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutEntry {
    /// Size token, e.g. `512M`, `+20G` or `100%`
    pub size: String,
    /// Type alias (`ef00`, `8300`, ...) or full type GUID
    pub type_guid: String,
    /// Filesystem to create, empty for none
    pub format: String,
    /// GPT partition name, empty for none
    pub label: String,
}

/// Filesystems the layout can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filesystem {
    Vfat,
    Ext4,
    Xfs,
    Btrfs,
    Swap,
    /// Leave the partition unformatted
    Raw,
}

impl Filesystem {
    /// Parse a format token, ignoring case.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "vfat" => Some(Self::Vfat),
            "ext4" => Some(Self::Ext4),
            "xfs" => Some(Self::Xfs),
            "btrfs" => Some(Self::Btrfs),
            "swap" => Some(Self::Swap),
            "raw" => Some(Self::Raw),
            _ => None,
        }
    }

    /// Command that creates this filesystem on `device`, if any.
    pub fn format_command(self, label: Option<&str>, device: &str) -> Option<Command> {
        let (program, base, label_flag, what): (&str, &[&str], &str, &str) = match self {
            Self::Vfat => ("mkfs.vfat", &["-F", "32"], "-n", "FAT filesystem"),
            Self::Ext4 => ("mkfs.ext4", &["-F"], "-L", "ext4 filesystem"),
            Self::Xfs => ("mkfs.xfs", &["-f"], "-L", "XFS filesystem"),
            Self::Btrfs => ("mkfs.btrfs", &["-f"], "-L", "Btrfs filesystem"),
            Self::Swap => ("mkswap", &[], "-L", "swap area"),
            Self::Raw => return None,
        };

        let mut args: Vec<String> = base.iter().map(ToString::to_string).collect();
        if let Some(label) = label {
            args.push(label_flag.to_string());
            args.push(label.to_string());
        }
        args.push(device.to_string());

        Some(Command::new(
            program,
            args,
            format!("create {what} on {device}"),
        ))
    }
}

/// Where a new partition ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartitionEnd {
    /// Consume all remaining space
    Remaining,
    /// Relative size, without the leading `+`
    Relative(String),
}

impl PartitionEnd {
    /// Parse a size token. Returns `None` when nothing is left after
    /// trimming whitespace and a single leading `+`.
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.trim();
        if token.eq_ignore_ascii_case("100%") {
            return Some(Self::Remaining);
        }
        let size = token.strip_prefix('+').unwrap_or(token);
        if size.is_empty() {
            None
        } else {
            Some(Self::Relative(size.to_string()))
        }
    }

    /// Render as the end field of `sgdisk --new`.
    pub fn sgdisk_end(&self) -> String {
        match self {
            Self::Remaining => "0".to_string(),
            Self::Relative(size) => format!("+{size}"),
        }
    }
}

/// Device node of partition `number` on `disk`.
///
/// Disks whose name ends in a digit (`/dev/nvme0n1`, `/dev/mmcblk0`) take a
/// `p` separator.
pub fn partition_device(disk: &str, number: usize) -> String {
    if disk.ends_with(|c: char| c.is_ascii_digit()) {
        format!("{disk}p{number}")
    } else {
        format!("{disk}{number}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_end_tokens() {
        assert_eq!(PartitionEnd::from_token("100%"), Some(PartitionEnd::Remaining));
        assert_eq!(PartitionEnd::from_token(" 100% "), Some(PartitionEnd::Remaining));
        assert_eq!(
            PartitionEnd::from_token("512M").map(|e| e.sgdisk_end()),
            Some("+512M".to_string())
        );
        assert_eq!(
            PartitionEnd::from_token("+512M").map(|e| e.sgdisk_end()),
            Some("+512M".to_string())
        );
        assert_eq!(PartitionEnd::Remaining.sgdisk_end(), "0");
        assert_eq!(PartitionEnd::from_token("+"), None);
        assert_eq!(PartitionEnd::from_token("   "), None);
    }

    #[test]
    fn test_partition_device_names() {
        assert_eq!(partition_device("/dev/sda", 2), "/dev/sda2");
        assert_eq!(partition_device("/dev/nvme0n1", 2), "/dev/nvme0n1p2");
        assert_eq!(partition_device("/dev/mmcblk0", 1), "/dev/mmcblk0p1");
        assert_eq!(partition_device("/dev/vdb", 10), "/dev/vdb10");
    }

    #[test]
    fn test_filesystem_tokens_ignore_case() {
        assert_eq!(Filesystem::from_token("VFAT"), Some(Filesystem::Vfat));
        assert_eq!(Filesystem::from_token("Ext4"), Some(Filesystem::Ext4));
        assert_eq!(Filesystem::from_token("ntfs"), None);
    }

    #[test]
    fn test_format_commands() {
        let vfat = Filesystem::Vfat
            .format_command(Some("ESP"), "/dev/sda1")
            .unwrap();
        assert_eq!(vfat.shell(), "mkfs.vfat -F 32 -n ESP /dev/sda1");
        assert_eq!(vfat.description(), "create FAT filesystem on /dev/sda1");

        let ext4 = Filesystem::Ext4.format_command(None, "/dev/sda2").unwrap();
        assert_eq!(ext4.shell(), "mkfs.ext4 -F /dev/sda2");

        let xfs = Filesystem::Xfs.format_command(Some("data"), "/dev/sdb1").unwrap();
        assert_eq!(xfs.shell(), "mkfs.xfs -f -L data /dev/sdb1");

        let btrfs = Filesystem::Btrfs.format_command(None, "/dev/sdb2").unwrap();
        assert_eq!(btrfs.shell(), "mkfs.btrfs -f /dev/sdb2");

        let swap = Filesystem::Swap.format_command(Some("swap"), "/dev/sda3").unwrap();
        assert_eq!(swap.shell(), "mkswap -L swap /dev/sda3");

        assert!(Filesystem::Raw.format_command(Some("x"), "/dev/sda4").is_none());
    }

    #[test]
    fn test_layout_entry_decodes_with_missing_fields() {
        let entry: LayoutEntry = serde_json::from_str(r#"{"size":"1G","type_guid":"8300"}"#).unwrap();
        assert_eq!(entry.size, "1G");
        assert!(entry.format.is_empty());
        assert!(entry.label.is_empty());
    }
}
