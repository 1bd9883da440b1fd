//! Frametree CLI Binary
//!
//! Command-line front end for emitting, importing and checking frame trees.

use anyhow::{anyhow, Context};
use clap::Parser;
use frametree::cli::{command_name, map_error, Cli, RunContext};
use frametree::config::ConfigLoader;
use frametree::logging::{init_logging, LoggingConfig};
use std::process;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    let logging_config = build_logging_config(&cli);
    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("Frametree CLI starting");

    match run(&cli) {
        Ok(output) => {
            // Program text already ends with its own newline.
            print!("{}", output);
            if !output.is_empty() && !output.ends_with('\n') {
                println!();
            }
        }
        Err(e) => {
            error!("{:#}", e);
            eprintln!("{:#}", e);
            process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<String> {
    let context = RunContext::new(cli.workspace.clone(), cli.config.clone())
        .map_err(|e| anyhow!(map_error(&e)))
        .context("Failed to load configuration")?;
    context
        .execute(&cli.command)
        .map_err(|e| anyhow!(map_error(&e)))
        .with_context(|| format!("Command `{}` failed", command_name(&cli.command)))
}

/// Build logging configuration from CLI args and config file.
/// Precedence: CLI flags override config file override defaults.
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    let mut config = if let Some(ref config_path) = cli.config {
        ConfigLoader::load_from_file(config_path)
            .ok()
            .map(|c| c.logging)
            .unwrap_or_default()
    } else {
        ConfigLoader::load(&cli.workspace)
            .ok()
            .map(|c| c.logging)
            .unwrap_or_default()
    };

    if cli.quiet {
        config.enabled = false;
    }
    if cli.verbose {
        config.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }
    if let Some(ref file) = cli.log_file {
        config.file = file.clone();
    }

    config
}
