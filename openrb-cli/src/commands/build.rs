//! Containerized build command implementation.

use anyhow::{Context, Result};
use console::style;
use openrb::BuildOptions;
use openrb::build::{DEFAULT_CONTAINER_NAME, DEFAULT_IMAGE, DEFAULT_PIO_ENV, DEFAULT_PLATFORM};

use crate::Cli;
use crate::config::Config;

/// Build command implementation: compile the firmware inside Docker.
pub(crate) fn cmd_build(
    cli: &Cli,
    config: &Config,
    image: Option<&str>,
    name: Option<&str>,
    platform: Option<&str>,
    pio_env: Option<&str>,
) -> Result<()> {
    let project_root = std::env::current_dir().context("cannot determine project root")?;

    let options = BuildOptions {
        image: image
            .map(str::to_string)
            .or_else(|| config.build.image.clone())
            .unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
        container_name: name
            .map(str::to_string)
            .unwrap_or_else(|| DEFAULT_CONTAINER_NAME.to_string()),
        platform: platform
            .map(str::to_string)
            .or_else(|| config.build.platform.clone())
            .unwrap_or_else(|| DEFAULT_PLATFORM.to_string()),
        env: pio_env
            .map(str::to_string)
            .or_else(|| config.build.env.clone())
            .unwrap_or_else(|| DEFAULT_PIO_ENV.to_string()),
        verbose: cli.verbose > 0,
        project_root,
    };

    if !cli.quiet {
        eprintln!(
            "{} Compiling env {} in {} ({})",
            style("🐳").cyan(),
            style(&options.env).bold(),
            style(&options.image).bold(),
            options.platform
        );
    }

    match openrb::run_build(&options)? {
        Some(firmware) => {
            if !cli.quiet {
                eprintln!(
                    "{} firmware.bin ready: {}",
                    style("✓").green().bold(),
                    firmware.display()
                );
            }
        },
        None => {
            if !cli.quiet {
                eprintln!(
                    "{} Build finished, but firmware.bin was not produced; check the build output folder.",
                    style("⚠").yellow()
                );
            }
        },
    }

    Ok(())
}
