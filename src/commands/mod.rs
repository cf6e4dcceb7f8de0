pub mod bootloader;
pub mod configdrive;
pub mod image;
pub mod partition;

use anyhow::{Context as _, Result};
use maintenance::{Plan, render};
use std::io::{self, Write};

use crate::Context;
use crate::cli::OutputFormat;

/// Write a finished plan to stdout in the selected encoding.
pub fn emit(ctx: &Context, plan: &Plan) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_plan(ctx.output, plan, &mut out).context("Could not write plan")?;
    log::info!("Emitted {} commands", plan.len());
    Ok(())
}

fn write_plan<W: Write>(format: OutputFormat, plan: &Plan, out: &mut W) -> io::Result<()> {
    match format {
        OutputFormat::Shell => out.write_all(render::to_shell(plan).as_bytes())?,
        OutputFormat::Json => render::write_json(plan, &mut *out)?,
    }
    out.flush()
}

/// Overwrite `target` when a flag was given.
fn set<T>(target: &mut T, flag: Option<T>) {
    if let Some(value) = flag {
        *target = value;
    }
}

/// Like [`set`], expanding `~` and environment variables first.
fn set_path(target: &mut String, flag: Option<String>) {
    set(target, flag.map(|p| crate::paths::expand_str(&p)));
}
