//! Upload orchestration: touch, settle, invoke `bossac`, interpret
//! its exit status.
//!
//! The orchestrator is single-threaded and blocking throughout. Two
//! wall-clock suspension points exist: the post-touch settle delay
//! and the subprocess itself, which is waited on unconditionally with
//! no timeout. No step is retried; a failed flash is surfaced
//! immediately because retrying a physical flashing operation without
//! re-validating device presence is unsafe, so retry stays with the
//! operator.

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread;
use std::time::Duration;

use log::{error, info, warn};

use crate::tool::{self, ResolvedTool};
use crate::touch::{self, TouchOutcome};

/// Conventional PlatformIO build output for the OpenRB-150 env.
pub const DEFAULT_FIRMWARE_PATH: &str = ".pio/build/OpenRB-150/firmware.bin";

/// Bare tool name, resolved against PATH and the PlatformIO cache.
pub const DEFAULT_TOOL: &str = "bossac";

/// Settle time between the touch and the tool invocation.
///
/// Bootloader re-enumeration is asynchronous relative to the touch;
/// without this window the flashing tool races the OS recreating the
/// device file.
pub const DEFAULT_POST_TOUCH_DELAY: Duration = Duration::from_secs(2);

/// Parameters for one upload attempt. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Target serial port (e.g., "/dev/ttyACM0" or "COM5").
    pub port: String,
    /// Path to the firmware artifact to write.
    pub firmware: PathBuf,
    /// Flashing tool command name or path.
    pub tool: String,
    /// Whether to perform the 1200 bps bootloader touch.
    pub perform_touch: bool,
    /// How long to wait after the touch before invoking the tool.
    pub post_touch_delay: Duration,
}

impl UploadRequest {
    /// Build a request for `port` with the conventional defaults.
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            firmware: PathBuf::from(DEFAULT_FIRMWARE_PATH),
            tool: DEFAULT_TOOL.to_string(),
            perform_touch: true,
            post_touch_delay: DEFAULT_POST_TOUCH_DELAY,
        }
    }
}

/// Terminal result of one orchestration run.
///
/// `Success` implies the flashing tool ran and exited 0;
/// `FirmwareMissing` and `ToolNotFound` imply the subprocess was
/// never launched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The flashing tool ran and reported success.
    Success,
    /// The firmware artifact does not exist; run the build step.
    FirmwareMissing,
    /// The flashing tool could not be located or launched.
    ToolNotFound,
    /// The flashing tool ran and reported failure with this code.
    ToolFailed(i32),
}

impl UploadOutcome {
    /// Map the outcome to the program's exit status.
    #[must_use]
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::FirmwareMissing => 2,
            Self::ToolNotFound => 127,
            Self::ToolFailed(code) => code,
        }
    }

    /// Whether the upload completed successfully.
    #[must_use]
    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

/// Seam for invoking the flashing tool subprocess.
///
/// Returns the subprocess exit code, or `None` when the process was
/// terminated without one (killed by a signal).
pub trait ToolRunner {
    /// Run `tool` with `args`, blocking until it terminates.
    fn run(&mut self, tool: &Path, args: &[String]) -> io::Result<Option<i32>>;
}

/// Production runner: blocking [`std::process::Command`] with
/// inherited standard streams, so the tool's own diagnostics pass
/// through unmodified.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run(&mut self, tool: &Path, args: &[String]) -> io::Result<Option<i32>> {
        let status = Command::new(tool).args(args).status()?;
        Ok(status.code())
    }
}

/// Seam for the bootloader touch.
pub trait Toucher {
    /// Perform the 1200 bps touch on `port`, best-effort.
    fn touch(&mut self, port: &str) -> TouchOutcome;
}

/// Production toucher backed by [`touch_1200bps`](crate::touch_1200bps).
#[derive(Debug, Default)]
pub struct SerialToucher;

impl Toucher for SerialToucher {
    fn touch(&mut self, port: &str) -> TouchOutcome {
        touch::touch_1200bps(port)
    }
}

/// Fixed `bossac` argument set for one write-and-reset cycle:
/// interactive info, debug output, target port, erase-before-write,
/// explicit erase, write from path, reset after upload.
#[must_use]
pub fn bossac_args(port: &str, firmware: &Path) -> Vec<String> {
    vec![
        "-i".to_string(),
        "-d".to_string(),
        format!("--port={port}"),
        "-U".to_string(),
        "true".to_string(),
        "-e".to_string(),
        "-w".to_string(),
        firmware.display().to_string(),
        "-R".to_string(),
    ]
}

/// Sequences one upload attempt end to end.
///
/// The default instance touches real serial ports and spawns real
/// subprocesses; every external effect sits behind a replaceable seam
/// so the sequencing can be exercised without hardware.
pub struct Uploader {
    runner: Box<dyn ToolRunner>,
    toucher: Box<dyn Toucher>,
    resolver: Box<dyn FnMut(&str) -> ResolvedTool>,
    sleep: Box<dyn FnMut(Duration)>,
}

impl Default for Uploader {
    fn default() -> Self {
        Self::new()
    }
}

impl Uploader {
    /// Uploader with the production runner, toucher, and resolver.
    #[must_use]
    pub fn new() -> Self {
        Self {
            runner: Box::new(SystemRunner),
            toucher: Box::new(SerialToucher),
            resolver: Box::new(tool::resolve_tool),
            sleep: Box::new(thread::sleep),
        }
    }

    /// Replace the subprocess runner.
    #[must_use]
    pub fn with_runner(mut self, runner: impl ToolRunner + 'static) -> Self {
        self.runner = Box::new(runner);
        self
    }

    /// Replace the bootloader toucher.
    #[must_use]
    pub fn with_toucher(mut self, toucher: impl Toucher + 'static) -> Self {
        self.toucher = Box::new(toucher);
        self
    }

    /// Replace the tool resolver.
    #[must_use]
    pub fn with_resolver(mut self, resolver: impl FnMut(&str) -> ResolvedTool + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    /// Replace the settle-delay sleep.
    #[must_use]
    pub fn with_sleep(mut self, sleep: impl FnMut(Duration) + 'static) -> Self {
        self.sleep = Box::new(sleep);
        self
    }

    /// Run one upload attempt. Each step is a potential early exit.
    pub fn upload(&mut self, request: &UploadRequest) -> UploadOutcome {
        // Step 1: firmware precondition, before any side effect.
        if !request.firmware.exists() {
            let cwd = env::current_dir()
                .map_or_else(|_| "<unknown>".to_string(), |p| p.display().to_string());
            error!(
                "Firmware not found: {} (cwd: {cwd})",
                request.firmware.display()
            );
            return UploadOutcome::FirmwareMissing;
        }

        // Step 2: locate the flashing tool; never invoke an
        // unresolved command.
        let tool_name = tool::normalize_tool_name(&request.tool);
        let resolved = (self.resolver)(&tool_name);
        if !resolved.is_resolved() {
            error!("Flashing tool not found: {tool_name}");
            return UploadOutcome::ToolNotFound;
        }

        // Step 3: bootloader touch plus settle delay. Touch failure
        // is tolerated: the board may already be in bootloader mode.
        if request.perform_touch {
            if self.toucher.touch(&request.port) == TouchOutcome::Failed {
                warn!("Continuing without a successful touch");
            }
            info!(
                "Waiting {:.1}s for the bootloader to re-enumerate...",
                request.post_touch_delay.as_secs_f64()
            );
            (self.sleep)(request.post_touch_delay);
        }

        // Step 4: invoke the tool and block until it terminates.
        let args = bossac_args(&request.port, &request.firmware);
        info!("Running: {} {}", resolved.path.display(), args.join(" "));

        // Step 5: map the exit status.
        match self.runner.run(&resolved.path, &args) {
            Ok(Some(0)) => {
                info!("Upload complete");
                UploadOutcome::Success
            },
            Ok(Some(code)) => {
                error!("Flashing tool exited with code {code}");
                UploadOutcome::ToolFailed(code)
            },
            Ok(None) => {
                error!("Flashing tool terminated without an exit code");
                UploadOutcome::ToolFailed(1)
            },
            Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied) => {
                error!("Failed to launch flashing tool: {e}");
                UploadOutcome::ToolNotFound
            },
            Err(e) => {
                error!("Failed to run flashing tool: {e}");
                UploadOutcome::ToolFailed(1)
            },
        }
    }
}
