//! openrb CLI - build and flash firmware for the OpenRB-150 board.
//!
//! ## Features
//!
//! - Upload firmware over USB serial via the external `bossac` tool
//! - 1200 bps bootloader touch with a configurable settle delay
//! - Serial device listing with per-OS formatting
//! - Dockerized PlatformIO compile step
//! - Shell completion generation
//! - Environment variable and config file support

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use env_logger::Env;
use log::debug;
use std::env;
use std::path::PathBuf;

mod commands;
mod config;

use config::Config;

/// openrb - host-side tooling for the OpenRB-150 board.
///
/// Environment variables:
///   OPENRB_PORT      - Default serial port
///   OPENRB_FIRMWARE  - Default firmware artifact path
///   OPENRB_BOSSAC    - Default bossac command or path
#[derive(Parser)]
#[command(name = "openrb")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbose output level (-v, -vv for increasing detail).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (suppress non-essential output).
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to a configuration file.
    #[arg(long = "config", global = true, value_name = "PATH")]
    config_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Flash firmware onto the board over USB serial.
    ///
    /// No port locking is performed; running two uploads against the
    /// same port concurrently is the operator's responsibility.
    Upload {
        /// USB serial port (e.g. /dev/cu.usbmodem1101, /dev/ttyACM0, COM5).
        #[arg(short, long, env = "OPENRB_PORT")]
        port: Option<String>,

        /// Firmware path (default: .pio/build/OpenRB-150/firmware.bin).
        #[arg(long, env = "OPENRB_FIRMWARE")]
        firmware: Option<PathBuf>,

        /// bossac command or path (default: bossac).
        #[arg(long, env = "OPENRB_BOSSAC")]
        bossac: Option<String>,

        /// Skip the 1200 bps touch/reset.
        #[arg(long)]
        no_touch: bool,

        /// Seconds to wait after the touch (default: 2.0).
        #[arg(long)]
        wait: Option<f64>,
    },

    /// List connected serial devices.
    ListPorts {
        /// Emit machine-readable JSON on stdout.
        #[arg(long)]
        json: bool,
    },

    /// Compile the firmware inside Docker (compile only).
    Build {
        /// Docker image name.
        #[arg(long, env = "IMAGE_NAME")]
        image: Option<String>,

        /// Docker container name.
        #[arg(long, env = "CONTAINER_NAME")]
        name: Option<String>,

        /// Docker platform (default: linux/amd64).
        #[arg(long, env = "PIO_PLATFORM")]
        platform: Option<String>,

        /// PlatformIO env name (default: OpenRB-150).
        #[arg(long = "env", value_name = "ENV")]
        pio_env: Option<String>,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // NO_COLOR and TTY detection
    if env::var("NO_COLOR").is_ok() || !console::Term::stderr().is_term() {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    // Setup logging based on verbosity
    let log_level = if cli.quiet {
        "warn"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_target(cli.verbose >= 2)
        .format_timestamp(if cli.verbose >= 2 {
            Some(env_logger::TimestampPrecision::Millis)
        } else {
            None
        })
        .init();

    debug!(
        "openrb v{} (verbose level: {})",
        env!("CARGO_PKG_VERSION"),
        cli.verbose
    );

    // Load configuration
    let config = if let Some(ref path) = cli.config_path {
        Config::load_from_path(path)
    } else {
        Config::load()
    };

    match &cli.command {
        Commands::Upload {
            port,
            firmware,
            bossac,
            no_touch,
            wait,
        } => {
            let code = commands::upload::cmd_upload(
                &cli,
                &config,
                port.as_deref(),
                firmware.as_deref(),
                bossac.as_deref(),
                *no_touch,
                *wait,
            );
            if code != 0 {
                std::process::exit(code);
            }
        },
        Commands::ListPorts { json } => {
            commands::ports::cmd_list_ports(*json)?;
        },
        Commands::Build {
            image,
            name,
            platform,
            pio_env,
        } => {
            commands::build::cmd_build(
                &cli,
                &config,
                image.as_deref(),
                name.as_deref(),
                platform.as_deref(),
                pio_env.as_deref(),
            )?;
        },
        Commands::Completions { shell } => {
            commands::completions::cmd_completions(*shell);
        },
    }

    Ok(())
}

#[cfg(test)]
mod cli_tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_command_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parse_upload_minimal() {
        let cli = Cli::try_parse_from(["openrb", "upload", "--port", "/dev/ttyACM0"]).unwrap();
        if let Commands::Upload {
            port,
            firmware,
            bossac,
            no_touch,
            wait,
        } = cli.command
        {
            assert_eq!(port.as_deref(), Some("/dev/ttyACM0"));
            assert!(firmware.is_none());
            assert!(bossac.is_none());
            assert!(!no_touch);
            assert!(wait.is_none());
        } else {
            panic!("Expected Upload command");
        }
    }

    #[test]
    fn test_cli_parse_upload_full() {
        let cli = Cli::try_parse_from([
            "openrb",
            "upload",
            "--port",
            "COM5",
            "--firmware",
            "out/firmware.bin",
            "--bossac",
            "/opt/bossac/bossac",
            "--no-touch",
            "--wait",
            "3.5",
        ])
        .unwrap();
        if let Commands::Upload {
            port,
            firmware,
            bossac,
            no_touch,
            wait,
        } = cli.command
        {
            assert_eq!(port.as_deref(), Some("COM5"));
            assert_eq!(firmware.unwrap().to_str().unwrap(), "out/firmware.bin");
            assert_eq!(bossac.as_deref(), Some("/opt/bossac/bossac"));
            assert!(no_touch);
            assert_eq!(wait, Some(3.5));
        } else {
            panic!("Expected Upload command");
        }
    }

    #[test]
    fn test_cli_parse_list_ports() {
        let cli = Cli::try_parse_from(["openrb", "list-ports"]).unwrap();
        assert!(matches!(cli.command, Commands::ListPorts { json: false }));
    }

    #[test]
    fn test_cli_parse_list_ports_json() {
        let cli = Cli::try_parse_from(["openrb", "list-ports", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::ListPorts { json: true }));
    }

    #[test]
    fn test_cli_parse_build_options() {
        let cli = Cli::try_parse_from([
            "openrb",
            "build",
            "--image",
            "custom:latest",
            "--env",
            "OpenRB-150",
        ])
        .unwrap();
        if let Commands::Build { image, pio_env, .. } = cli.command {
            assert_eq!(image.as_deref(), Some("custom:latest"));
            assert_eq!(pio_env.as_deref(), Some("OpenRB-150"));
        } else {
            panic!("Expected Build command");
        }
    }

    #[test]
    fn test_cli_parse_completions() {
        let cli = Cli::try_parse_from(["openrb", "completions", "bash"]).unwrap();
        assert!(matches!(cli.command, Commands::Completions { .. }));
    }

    #[test]
    fn test_cli_global_options() {
        let cli = Cli::try_parse_from([
            "openrb",
            "-vv",
            "--quiet",
            "--config",
            "/tmp/openrb.toml",
            "list-ports",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.quiet);
        assert_eq!(
            cli.config_path.as_deref(),
            Some(std::path::Path::new("/tmp/openrb.toml"))
        );
    }

    #[test]
    fn test_cli_missing_subcommand_is_error() {
        assert!(Cli::try_parse_from(["openrb"]).is_err());
    }

    #[test]
    fn test_cli_invalid_wait_is_error() {
        assert!(
            Cli::try_parse_from(["openrb", "upload", "--port", "COM5", "--wait", "soon"]).is_err()
        );
    }
}
