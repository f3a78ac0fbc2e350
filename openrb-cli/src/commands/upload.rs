//! Upload command implementation.

use console::style;
use openrb::{DEFAULT_FIRMWARE_PATH, DEFAULT_TOOL, UploadOutcome, UploadRequest, Uploader};
use std::path::Path;
use std::time::Duration;

use crate::Cli;
use crate::config::Config;

/// Default post-touch settle delay in seconds.
const DEFAULT_WAIT_SECS: f64 = 2.0;

/// Upload command implementation.
///
/// Returns the process exit code: 0 on success, 2 when the firmware
/// artifact is missing, 127 when bossac cannot be located, or
/// bossac's own exit code when it reports failure.
pub(crate) fn cmd_upload(
    cli: &Cli,
    config: &Config,
    port: Option<&str>,
    firmware: Option<&Path>,
    bossac: Option<&str>,
    no_touch: bool,
    wait: Option<f64>,
) -> i32 {
    let Some(port) = port
        .map(str::to_string)
        .or_else(|| config.upload.port.clone())
    else {
        eprintln!(
            "{} no serial port given; pass {} or set `port` in openrb.toml",
            style("Error:").red().bold(),
            style("--port").cyan()
        );
        eprintln!(
            "  Run {} to see connected devices.",
            style("openrb list-ports").cyan()
        );
        // Usage error, same class as a clap parse failure.
        std::process::exit(2);
    };

    let wait_secs = wait
        .or(config.upload.wait)
        .unwrap_or(DEFAULT_WAIT_SECS)
        .max(0.0);
    // try_from rejects what .max(0.0) lets through: infinity and
    // values past the Duration range.
    let Ok(post_touch_delay) = Duration::try_from_secs_f64(wait_secs) else {
        eprintln!(
            "{} invalid {} value: {wait_secs} (expected a finite number of seconds)",
            style("Error:").red().bold(),
            style("--wait").cyan()
        );
        // Usage error, same class as a clap parse failure.
        std::process::exit(2);
    };

    let request = UploadRequest {
        port,
        firmware: firmware
            .map(Path::to_path_buf)
            .or_else(|| config.upload.firmware.clone())
            .unwrap_or_else(|| DEFAULT_FIRMWARE_PATH.into()),
        tool: bossac
            .map(str::to_string)
            .or_else(|| config.upload.bossac.clone())
            .unwrap_or_else(|| DEFAULT_TOOL.to_string()),
        perform_touch: !(no_touch || config.upload.no_touch),
        post_touch_delay,
    };

    if !cli.quiet {
        eprintln!(
            "{} Uploading {} to {}",
            style("⬆").cyan(),
            style(request.firmware.display()).bold(),
            style(&request.port).bold()
        );
    }

    let outcome = Uploader::new().upload(&request);

    match outcome {
        UploadOutcome::Success => {
            if !cli.quiet {
                eprintln!("{} Upload complete", style("✓").green().bold());
            }
        },
        UploadOutcome::FirmwareMissing => {
            eprintln!(
                "{} Firmware not found: {}",
                style("✗").red().bold(),
                request.firmware.display()
            );
            eprintln!(
                "  Run {} first to produce it.",
                style("openrb build").cyan()
            );
        },
        UploadOutcome::ToolNotFound => {
            eprintln!(
                "{} bossac not found in PATH or the PlatformIO cache.",
                style("✗").red().bold()
            );
            eprintln!("  - macOS: brew install bossac");
            eprintln!("  - Linux: sudo apt install bossac");
            eprintln!("  - Windows: install the Arduino SAMD tools and add bossac.exe to PATH");
        },
        UploadOutcome::ToolFailed(code) => {
            eprintln!(
                "{} Upload failed (bossac exited with {code}); see its output above.",
                style("✗").red().bold()
            );
        },
    }

    outcome.exit_code()
}
