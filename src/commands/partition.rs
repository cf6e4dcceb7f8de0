use anyhow::{Context as _, Result};
use std::io::{self, Read};

use crate::Context;
use crate::cli::PartitionArgs;
use crate::config;

pub fn run(ctx: &Context, args: PartitionArgs) -> Result<()> {
    let layout = match args.layout.as_deref() {
        None | Some("-") => read_stdin()?,
        Some(path) => config::read_input(path)?,
    };
    let plan = maintenance::partition::plan(&args.disk, &layout)?;
    super::emit(ctx, &plan)
}

fn read_stdin() -> Result<Vec<u8>> {
    log::debug!("Reading layout from stdin");
    let mut buf = Vec::new();
    io::stdin()
        .read_to_end(&mut buf)
        .context("Could not read layout from stdin")?;
    Ok(buf)
}
