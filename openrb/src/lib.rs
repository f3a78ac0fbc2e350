//! # openrb
//!
//! A library for building and flashing firmware onto the OpenRB-150
//! board over USB serial.
//!
//! This crate provides the host-side upload orchestration:
//!
//! - Serial device discovery with per-OS formatting
//! - Cross-platform resolution of the external `bossac` flashing tool
//! - The 1200 bps "touch" that resets the board into its bootloader
//! - Sequencing of touch, settle delay, and the `bossac` subprocess
//! - A thin wrapper around the Dockerized PlatformIO compile step
//!
//! The flashing tool itself is treated as a black box: its only
//! observable outputs are its exit code and its inherited standard
//! streams. The library never implements the bootloader protocol and
//! never parses the firmware image.
//!
//! ## Example
//!
//! ```rust,no_run
//! use openrb::{UploadOutcome, UploadRequest, Uploader};
//!
//! let request = UploadRequest::new("/dev/ttyACM0");
//! let outcome = Uploader::new().upload(&request);
//! std::process::exit(outcome.exit_code());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod build;
pub mod device;
pub mod error;
pub mod tool;
pub mod touch;
pub mod upload;

pub use {
    build::{BuildOptions, run_build},
    device::{DetectedPort, HostFamily, detect_ports, format_port_line},
    error::{Error, Result},
    tool::{ResolvedTool, ToolSource, normalize_tool_name, resolve_tool},
    touch::{TOUCH_BAUD, TouchOutcome, touch_1200bps},
    upload::{
        DEFAULT_FIRMWARE_PATH, DEFAULT_TOOL, SerialToucher, SystemRunner, ToolRunner, Toucher,
        UploadOutcome, UploadRequest, Uploader,
    },
};
