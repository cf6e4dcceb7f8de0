//! Image appliers: rootfs tarballs and Windows WIM images, both pulled from
//! an OCI registry with `oras`.

mod rootfs;
mod windows;

pub use rootfs::{RootfsOptions, plan};
pub use windows::{
    WIM_DIGEST_STAMP, WindowsImageOptions, plan_windows, plan_windows_idempotent,
};
