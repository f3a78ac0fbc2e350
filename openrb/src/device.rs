//! Serial device discovery and per-OS listing format.
//!
//! Enumeration is transient: every call re-queries the OS serial
//! subsystem and no state is retained between calls.

use log::{debug, trace};

/// A discovered serial device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedPort {
    /// OS device identifier (e.g., "/dev/ttyACM0" or "COM5").
    pub name: String,
    /// Human-readable label, usually the USB product string.
    pub description: Option<String>,
    /// Vendor/product identifier string (if the device is USB).
    pub hardware_id: Option<String>,
}

/// Host family for device-listing purposes.
///
/// POSIX hosts share the `/dev/` device-file convention; Windows has
/// no such convention and lists every enumerated port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostFamily {
    /// Linux, macOS, and other `/dev/`-based systems.
    Posix,
    /// Windows (COMx port names).
    Windows,
}

impl HostFamily {
    /// The family of the host this binary was compiled for.
    #[must_use]
    pub fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Posix
        }
    }
}

/// Enumerate all serial devices currently visible to the OS.
///
/// An empty result is not an error; enumeration failures are logged
/// at debug level and yield an empty list.
#[must_use]
pub fn detect_ports() -> Vec<DetectedPort> {
    let mut result = Vec::new();

    match serialport::available_ports() {
        Ok(ports) => {
            for info in ports {
                let mut detected = DetectedPort {
                    name: info.port_name.clone(),
                    description: None,
                    hardware_id: None,
                };

                if let serialport::SerialPortType::UsbPort(usb) = info.port_type {
                    detected.description = usb.product.clone();
                    detected.hardware_id = Some(format_hardware_id(
                        usb.vid,
                        usb.pid,
                        usb.serial_number.as_deref(),
                    ));

                    trace!(
                        "Found USB port: {} (VID: {:04X}, PID: {:04X})",
                        info.port_name, usb.vid, usb.pid
                    );
                }

                result.push(detected);
            }
        },
        Err(e) => {
            debug!("Failed to enumerate serial ports: {e}");
        },
    }

    result
}

/// Format a USB VID/PID pair (plus optional serial number) as a
/// hardware identifier string.
fn format_hardware_id(vid: u16, pid: u16, serial: Option<&str>) -> String {
    match serial {
        Some(sn) if !sn.is_empty() => format!("USB VID:PID={vid:04X}:{pid:04X} SER={sn}"),
        _ => format!("USB VID:PID={vid:04X}:{pid:04X}"),
    }
}

/// Format one listing line for a device, or `None` if the device
/// should not be listed on this host family.
///
/// POSIX hosts list only devices under `/dev/` (this filters out
/// pseudo-terminals and other non-serial entries) as
/// `<path> | <description>`. Windows lists every device as
/// `<name> | <description> | <hardware id>`.
#[must_use]
pub fn format_port_line(port: &DetectedPort, family: HostFamily) -> Option<String> {
    let desc = port.description.as_deref().unwrap_or("").trim();

    match family {
        HostFamily::Posix => {
            if port.name.starts_with("/dev/") {
                Some(format!("{} | {desc}", port.name))
            } else {
                None
            }
        },
        HostFamily::Windows => {
            let hwid = port.hardware_id.as_deref().unwrap_or("").trim();
            Some(format!("{} | {desc} | {hwid}", port.name))
        },
    }
}
