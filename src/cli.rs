use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "shoal-plan")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Compile provisioning intent into shell-safe command plans", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Defaults file (default: <config dir>/plan.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<String>,

    /// Plan encoding written to stdout
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Shell, global = true)]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One shell command per line
    Shell,
    /// Indented JSON array of {Program, Args, Description}
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Wipe a disk and lay out GPT partitions
    Partition(PartitionArgs),

    /// Extract a rootfs tarball from an OCI registry
    Image(ImageArgs),

    /// Apply a Windows WIM image from an OCI registry
    ImageWindows(ImageWindowsArgs),

    /// Install GRUB and write /etc/fstab for a Linux root
    Bootloader(BootloaderArgs),

    /// Install Windows Boot Manager and place unattend.xml
    BootloaderWindows(BootloaderWindowsArgs),

    /// Populate a cloud-init NoCloud config drive
    ConfigDrive(ConfigDriveArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Partition
// ============================================================================

#[derive(Args)]
pub struct PartitionArgs {
    /// Target disk, e.g. /dev/sda or /dev/nvme0n1
    #[arg(long)]
    pub disk: String,

    /// JSON layout file; `-` or omitted reads stdin
    #[arg(long, value_name = "FILE")]
    pub layout: Option<String>,
}

// ============================================================================
// Images
// ============================================================================

#[derive(Args)]
pub struct ImageArgs {
    /// OCI reference of the rootfs tarball
    #[arg(long)]
    pub oci_url: Option<String>,

    /// Directory to extract into
    #[arg(long)]
    pub root: Option<String>,
}

#[derive(Args)]
pub struct ImageWindowsArgs {
    /// OCI reference of the WIM image
    #[arg(long)]
    pub oci_url: Option<String>,

    /// NTFS partition device
    #[arg(long)]
    pub partition: Option<String>,

    /// Mount point for the Windows partition
    #[arg(long)]
    pub windows_path: Option<String>,

    /// Image index inside the WIM
    #[arg(long, allow_negative_numbers = true)]
    pub wim_index: Option<i64>,

    /// Skip the apply when the manifest digest is unchanged
    #[arg(long)]
    pub idempotent: bool,
}

// ============================================================================
// Bootloaders
// ============================================================================

#[derive(Args)]
pub struct BootloaderArgs {
    /// EFI system partition device
    #[arg(long)]
    pub esp_device: Option<String>,

    /// Root filesystem device
    #[arg(long)]
    pub root_device: Option<String>,

    /// Mount point of the root filesystem
    #[arg(long)]
    pub root: Option<String>,

    /// Mount point for the ESP
    #[arg(long)]
    pub esp_mount: Option<String>,

    /// Root filesystem type written to fstab
    #[arg(long)]
    pub root_fs_type: Option<String>,

    /// grub-install --bootloader-id
    #[arg(long)]
    pub bootloader_id: Option<String>,

    /// grub-install --target
    #[arg(long)]
    pub grub_target: Option<String>,
}

#[derive(Args)]
pub struct BootloaderWindowsArgs {
    /// EFI system partition device
    #[arg(long)]
    pub esp_device: Option<String>,

    /// NTFS partition holding the applied image
    #[arg(long)]
    pub windows_device: Option<String>,

    /// unattend.xml to place in Windows/Panther
    #[arg(long, value_name = "FILE")]
    pub unattend: String,

    /// Mount point for the Windows partition
    #[arg(long)]
    pub windows_path: Option<String>,

    /// Mount point for the ESP
    #[arg(long)]
    pub esp_mount: Option<String>,

    /// Boot manager name
    #[arg(long)]
    pub bootloader_id: Option<String>,

    /// Firmware boot entry label
    #[arg(long)]
    pub boot_entry_label: Option<String>,
}

// ============================================================================
// Config drive
// ============================================================================

#[derive(Args)]
pub struct ConfigDriveArgs {
    /// CIDATA partition device
    #[arg(long)]
    pub device: Option<String>,

    /// Mount point for the CIDATA partition
    #[arg(long)]
    pub mount: Option<String>,

    /// user-data file on the executing host
    #[arg(long)]
    pub user_data: Option<String>,

    /// meta-data file on the executing host
    #[arg(long)]
    pub meta_data: Option<String>,

    /// instance-id for synthesised meta-data
    #[arg(long)]
    pub instance_id: Option<String>,

    /// local-hostname for synthesised meta-data
    #[arg(long)]
    pub hostname: Option<String>,
}
