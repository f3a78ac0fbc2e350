//! The 1200 bps bootloader touch.
//!
//! SAMD boards with a UF2/BOSSA-style bootloader watch for a host
//! opening their CDC serial port at 1200 baud; opening and closing
//! the port at that rate makes the firmware reset into the
//! bootloader. The touch is best-effort: the board may already be in
//! bootloader mode, the port may be busy, or the device may vanish
//! mid-open, and none of that should abort the upload flow.

use std::time::Duration;

use log::{info, warn};

/// Sentinel baud rate that requests a reset into the bootloader.
pub const TOUCH_BAUD: u32 = 1200;

/// Result of a bootloader touch attempt.
///
/// A failed touch is tolerated by design; callers proceed either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchOutcome {
    /// The port was opened at 1200 bps and closed again.
    Touched,
    /// The port could not be opened; logged and ignored.
    Failed,
}

impl TouchOutcome {
    /// Whether the port open actually went through.
    #[must_use]
    pub fn succeeded(self) -> bool {
        matches!(self, Self::Touched)
    }
}

/// Open `port` at 1200 bps and close it immediately.
///
/// The handle is dropped before returning so the flashing tool can
/// acquire the same port right after. Never fails to the caller.
pub fn touch_1200bps(port: &str) -> TouchOutcome {
    info!("1200 bps touch on {port}");

    match serialport::new(port, TOUCH_BAUD)
        .timeout(Duration::from_millis(500))
        .open()
    {
        Ok(handle) => {
            drop(handle);
            TouchOutcome::Touched
        },
        Err(e) => {
            warn!("1200 bps touch on {port} failed: {e}");
            TouchOutcome::Failed
        },
    }
}
