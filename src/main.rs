mod cli;
mod commands;
mod config;
mod paths;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command, OutputFormat};
use config::PlanConfig;
use std::io;
use std::process::ExitCode;

/// Global context for the application
pub struct Context {
    pub output: OutputFormat,
    pub config: PlanConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            ui::report(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Command::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "shoal-plan", &mut io::stdout());
        return Ok(());
    }

    let ctx = Context {
        output: cli.output,
        config: PlanConfig::load(cli.config.as_deref())?,
    };

    match cli.command {
        Command::Partition(args) => commands::partition::run(&ctx, args),
        Command::Image(args) => commands::image::run(&ctx, args),
        Command::ImageWindows(args) => commands::image::run_windows(&ctx, args),
        Command::Bootloader(args) => commands::bootloader::run(&ctx, args),
        Command::BootloaderWindows(args) => commands::bootloader::run_windows(&ctx, args),
        Command::ConfigDrive(args) => commands::configdrive::run(&ctx, args),
        Command::Completions { .. } => Ok(()),
    }
}
