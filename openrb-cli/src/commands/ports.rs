//! Serial device listing command implementation.

use anyhow::Result;
use openrb::{DetectedPort, HostFamily, detect_ports, format_port_line};

/// List connected serial devices, one line per device.
///
/// Human output is host-dependent: POSIX hosts list only `/dev/…`
/// paths as `<path> | <description>`; Windows lists everything as
/// `<name> | <description> | <hwid>`. Prints a literal `(none)` line
/// when enumeration finds no devices at all.
pub(crate) fn cmd_list_ports(json: bool) -> Result<()> {
    let detected = detect_ports();

    if json {
        let ports: Vec<serde_json::Value> = detected
            .iter()
            .map(|p| {
                serde_json::json!({
                    "name": p.name,
                    "description": p.description,
                    "hardware_id": p.hardware_id,
                })
            })
            .collect();
        let output = serde_json::json!({
            "ok": true,
            "data": {
                "ports": ports,
            }
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for line in render_lines(&detected, HostFamily::current()) {
        println!("{line}");
    }

    Ok(())
}

/// Render the human listing: the `(none)` sentinel for an empty
/// enumeration, otherwise one formatted line per listable device.
fn render_lines(detected: &[DetectedPort], family: HostFamily) -> Vec<String> {
    if detected.is_empty() {
        return vec!["(none)".to_string()];
    }

    detected
        .iter()
        .filter_map(|port| format_port_line(port, family))
        .collect()
}
