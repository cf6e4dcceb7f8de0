//! Bootloader planners.
//!
//! - [`plan`]: GRUB for a Linux root, with a PARTUUID-based `/etc/fstab`
//! - [`plan_windows`]: Windows Boot Manager, firmware entry and unattend.xml
//!
//! Both mount the ESP first and unmount it last.

mod linux;
mod windows;

pub use linux::{LinuxBootOptions, plan};
pub use windows::{UNATTEND_TERMINATOR, WindowsBootOptions, plan_windows};
