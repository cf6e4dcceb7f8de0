//! # maintenance
//!
//! Compiles bare-metal provisioning intent into ordered, shell-safe command
//! plans. Nothing here executes anything: every planner is a pure function
//! from options to a [`Plan`], or an [`Error`] and no plan at all.
//!
//! Planners:
//! - [`partition`]: GPT layouts via `sgdisk`, `mkfs.*` and `mkswap`
//! - [`image`]: rootfs tarballs and Windows WIM images pulled with `oras`
//! - [`bootloader`]: GRUB for Linux, Windows Boot Manager for Windows
//! - [`configdrive`]: cloud-init NoCloud seed files
//!
//! ## Example
//!
//! ```
//! use maintenance::{image, render};
//!
//! let plan = image::plan(&image::RootfsOptions {
//!     oci_url: "registry:8080/img:1".to_string(),
//!     ..Default::default()
//! })?;
//!
//! assert_eq!(
//!     render::to_shell(&plan),
//!     "mkdir -p /mnt/new-root\n\
//!      bash -c 'oras pull registry:8080/img:1 --output - | tar -xpf - -C /mnt/new-root'\n"
//! );
//! # Ok::<(), maintenance::Error>(())
//! ```
//!
//! ## Quoting
//!
//! Arguments only become shell text through [`quote`]:
//!
//! ```
//! use maintenance::quote;
//!
//! assert_eq!(quote(""), "''");
//! assert_eq!(quote("simple"), "simple");
//! assert_eq!(quote("d'quote"), r"'d'\''quote'");
//! ```

pub mod bootloader;
pub mod command;
pub mod configdrive;
pub mod defaults;
pub mod error;
pub mod image;
pub mod partition;
pub mod paths;
pub mod render;
pub mod script;

pub use command::{Command, Plan, quote};
pub use error::{Error, ErrorCategory, Result};
