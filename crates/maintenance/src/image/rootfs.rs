//! Streaming rootfs applier.

use serde::{Deserialize, Serialize};

use crate::command::{self, Command, Plan, quote};
use crate::defaults;
use crate::error::{Error, Result};
use crate::paths;

/// Options for extracting an OCI-hosted rootfs tarball.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RootfsOptions {
    /// OCI reference of the rootfs tarball artifact
    pub oci_url: String,
    /// Directory the rootfs is extracted into
    pub root_path: String,
}

impl Default for RootfsOptions {
    fn default() -> Self {
        Self {
            oci_url: String::new(),
            root_path: defaults::ROOT_PATH.to_string(),
        }
    }
}

/// Plan the extraction of a rootfs tarball into the target root.
///
/// The artifact is streamed from `oras pull` straight into `tar`, so no
/// intermediate copy of the tarball ever lands on disk.
pub fn plan(opts: &RootfsOptions) -> Result<Plan> {
    let url = opts.oci_url.trim();
    if url.is_empty() {
        return Err(Error::missing("image", "OCI URL"));
    }
    let root = paths::or_default(&opts.root_path, defaults::ROOT_PATH);

    let cmds = vec![
        Command::new(
            "mkdir",
            ["-p", root.as_str()],
            "ensure root mount directory exists",
        ),
        Command::bash(
            format!(
                "oras pull {} --output - | tar -xpf - -C {}",
                quote(url),
                quote(&root)
            ),
            "stream root filesystem tarball",
        ),
    ];

    log::debug!("rootfs plan for {url} into {root}: {} commands", cmds.len());
    command::trace_plan("image", &cmds);
    Ok(cmds)
}
