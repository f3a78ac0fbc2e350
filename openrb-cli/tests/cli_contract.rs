//! Integration tests for core CLI contract behavior.

use {predicates::prelude::*, std::fs, tempfile::tempdir};

fn cli_cmd() -> assert_cmd::Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("openrb");
    // Keep the ambient environment out of the contract under test.
    cmd.env_remove("OPENRB_PORT")
        .env_remove("OPENRB_FIRMWARE")
        .env_remove("OPENRB_BOSSAC");
    cmd
}

#[test]
fn help_exits_zero_and_writes_stdout_only() {
    let mut cmd = cli_cmd();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("openrb"))
        .stderr(predicate::str::is_empty());
}

#[test]
fn version_exits_zero_and_writes_stdout_only() {
    let mut cmd = cli_cmd();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("openrb"))
        .stderr(predicate::str::is_empty());
}

#[test]
fn unknown_subcommand_fails() {
    let mut cmd = cli_cmd();
    cmd.arg("frobnicate").assert().failure();
}

// ============================================================================
// Exit Code Tests - Upload Outcome Contract
// ============================================================================

/// Exit code 2: firmware artifact missing, nothing else attempted.
#[test]
fn upload_missing_firmware_exits_2() {
    let dir = tempdir().expect("tempdir");

    let mut cmd = cli_cmd();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .args(["upload", "--port", "/dev/ttyACM0", "--no-touch"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Firmware not found"));
}

/// Exit code 127: flashing tool not resolvable by any strategy.
#[test]
fn upload_unresolvable_tool_exits_127() {
    let dir = tempdir().expect("tempdir");
    let firmware = dir.path().join("firmware.bin");
    fs::write(&firmware, b"\x00\x01\x02\x03").expect("write firmware");

    let mut cmd = cli_cmd();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .args([
            "upload",
            "--port",
            "/dev/ttyACM0",
            "--firmware",
            "firmware.bin",
            "--bossac",
            "openrb-test-no-such-tool",
            "--no-touch",
        ])
        .assert()
        .code(127)
        .stderr(predicate::str::contains("not found"));
}

/// Exit code 2: no port given anywhere (usage error class).
#[test]
fn upload_without_port_exits_2() {
    let dir = tempdir().expect("tempdir");

    let mut cmd = cli_cmd();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .args(["upload", "--no-touch"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("port"));
}

/// Exit code 2: a settle delay beyond the representable range is a
/// usage error, not a crash.
#[test]
fn upload_out_of_range_wait_exits_2() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("firmware.bin"), b"\x00").expect("write firmware");

    for wait in ["1e30", "inf"] {
        let mut cmd = cli_cmd();
        cmd.current_dir(dir.path())
            .env("HOME", dir.path())
            .args([
                "upload",
                "--port",
                "/dev/ttyACM0",
                "--firmware",
                "firmware.bin",
                "--wait",
                wait,
            ])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("--wait"));
    }
}

#[cfg(unix)]
fn write_fake_bossac(dir: &std::path::Path, exit_code: i32) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let tool = dir.join("fake-bossac");
    fs::write(&tool, format!("#!/bin/sh\nexit {exit_code}\n")).expect("write fake tool");
    fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).expect("chmod fake tool");
    tool
}

/// The flashing tool's own non-zero exit code is propagated verbatim.
#[cfg(unix)]
#[test]
fn upload_propagates_tool_exit_code() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("firmware.bin"), b"\x00").expect("write firmware");
    write_fake_bossac(dir.path(), 5);

    let mut cmd = cli_cmd();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .args([
            "upload",
            "--port",
            "/dev/ttyACM0",
            "--firmware",
            "firmware.bin",
            "--bossac",
            "./fake-bossac",
            "--no-touch",
        ])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("exited with 5"));
}

/// Exit code 0 when the tool succeeds; the touch is suppressed so no
/// hardware is involved.
#[cfg(unix)]
#[test]
fn upload_succeeds_with_exit_code_zero() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("firmware.bin"), b"\x00").expect("write firmware");
    write_fake_bossac(dir.path(), 0);

    let mut cmd = cli_cmd();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .args([
            "upload",
            "--port",
            "/dev/ttyACM0",
            "--firmware",
            "firmware.bin",
            "--bossac",
            "./fake-bossac",
            "--no-touch",
        ])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

// ============================================================================
// Device Listing Contract
// ============================================================================

#[test]
fn list_ports_prints_lines_or_none_sentinel() {
    let mut cmd = cli_cmd();
    cmd.arg("list-ports")
        .assert()
        .success()
        .stdout(predicate::str::contains(" | ").or(predicate::str::contains("(none)")));
}

#[test]
fn list_ports_json_returns_valid_json() {
    let mut cmd = cli_cmd();
    let output = cmd
        .args(["list-ports", "--json"])
        .output()
        .expect("command should execute");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value =
        serde_json::from_str(&stdout).expect("stdout should be valid JSON");
    assert_eq!(parsed["ok"], serde_json::json!(true));
    assert!(parsed["data"]["ports"].is_array());
}

// ============================================================================
// Completions
// ============================================================================

#[test]
fn completions_bash_writes_script_to_stdout() {
    let mut cmd = cli_cmd();
    cmd.args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("openrb"));
}
