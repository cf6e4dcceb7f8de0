//! Documented defaults for planner options.

/// Mount point of the Linux root filesystem being provisioned.
pub const ROOT_PATH: &str = "/mnt/new-root";

/// Mount point of the Windows partition being provisioned.
pub const WINDOWS_PATH: &str = "/mnt/new-windows";

/// Mount point of the EFI system partition.
pub const ESP_MOUNT_PATH: &str = "/mnt/efi";

/// Mount point of the cloud-init seed partition.
pub const CIDATA_MOUNT_PATH: &str = "/mnt/cidata";

/// Root filesystem type written to fstab.
pub const ROOT_FS_TYPE: &str = "ext4";
/// `grub-install --bootloader-id`.
pub const GRUB_BOOTLOADER_ID: &str = "Shoal";
/// `grub-install --target`.
pub const GRUB_TARGET: &str = "x86_64-efi";

/// Boot manager installed on Windows targets.
pub const WINDOWS_BOOTLOADER_ID: &str = "Windows Boot Manager";
/// Firmware boot entry label for Windows targets.
pub const WINDOWS_BOOT_ENTRY_LABEL: &str = "Windows";

/// WIM image index applied when none (or a value below 1) is given.
pub const WIM_INDEX: i64 = 1;

/// user-data source written by the provisioning dispatcher.
pub const USER_DATA_PATH: &str = "/run/provision/user-data";
/// meta-data source written by the provisioning dispatcher.
pub const META_DATA_PATH: &str = "/run/provision/meta-data";

/// cloud-init instance id used when none is given.
pub const INSTANCE_ID: &str = "shoal-instance";
/// cloud-init hostname used when none is given.
pub const HOSTNAME: &str = "shoal-host";
