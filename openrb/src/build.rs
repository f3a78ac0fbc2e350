//! Thin wrapper around the Dockerized PlatformIO compile step.
//!
//! The compiler itself is an external collaborator: this module only
//! assembles the `docker run` invocation, waits for it, and reports
//! where the firmware artifact landed. It never parses or validates
//! the produced image.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use log::{info, warn};

use crate::error::{Error, Result};

/// Default development image name.
pub const DEFAULT_IMAGE: &str = "openrb150-dev-env:latest";
/// Default name for the transient compile container.
pub const DEFAULT_CONTAINER_NAME: &str = "openrb150-dev-compile";
/// Default container platform; the toolchain image is amd64-only.
pub const DEFAULT_PLATFORM: &str = "linux/amd64";
/// Default PlatformIO environment to build.
pub const DEFAULT_PIO_ENV: &str = "OpenRB-150";

/// Parameters for one containerized compile.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Docker image to run the compile in.
    pub image: String,
    /// Container name for the transient compile container.
    pub container_name: String,
    /// Docker platform to request.
    pub platform: String,
    /// PlatformIO environment name.
    pub env: String,
    /// Pass `-v` to `pio run`.
    pub verbose: bool,
    /// Project root mounted as the container workspace.
    pub project_root: PathBuf,
}

impl BuildOptions {
    /// Options for `project_root` with the conventional defaults.
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            image: DEFAULT_IMAGE.to_string(),
            container_name: DEFAULT_CONTAINER_NAME.to_string(),
            platform: DEFAULT_PLATFORM.to_string(),
            env: DEFAULT_PIO_ENV.to_string(),
            verbose: false,
            project_root: project_root.into(),
        }
    }
}

/// Shell fragment executed inside the container.
fn pio_run_script(env: &str, verbose: bool) -> String {
    let verbose_flag = if verbose { " -v" } else { "" };
    format!("set -e; pio run -e {env}{verbose_flag}")
}

/// Arguments passed to `docker` for the compile run.
fn docker_run_args(options: &BuildOptions) -> Vec<String> {
    vec![
        "run".to_string(),
        "--rm".to_string(),
        "--name".to_string(),
        options.container_name.clone(),
        "--platform".to_string(),
        options.platform.clone(),
        "-v".to_string(),
        format!("{}:/workspace", options.project_root.display()),
        "-w".to_string(),
        "/workspace".to_string(),
        options.image.clone(),
        "/bin/bash".to_string(),
        "-lc".to_string(),
        pio_run_script(&options.env, options.verbose),
    ]
}

/// Check whether the development image exists locally.
#[must_use]
pub fn docker_image_exists(image: &str) -> bool {
    Command::new("docker")
        .args(["image", "inspect", image])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Compile the firmware inside Docker.
///
/// Returns the firmware artifact path when `firmware.bin` is present
/// after the compile, or `None` when the environment emitted other
/// artifact formats (a warning points at the build output directory).
pub fn run_build(options: &BuildOptions) -> Result<Option<PathBuf>> {
    if !docker_image_exists(&options.image) {
        return Err(Error::Build(format!(
            "Docker image '{}' not found; build it first (e.g. ./docker/build.sh)",
            options.image
        )));
    }

    info!("Compiling inside Docker...");
    info!("Repo: {}", options.project_root.display());
    info!("Image: {}", options.image);
    info!("Env: {}", options.env);

    let status = Command::new("docker").args(docker_run_args(options)).status()?;
    if !status.success() {
        return Err(Error::Build(format!(
            "containerized compile failed ({status})"
        )));
    }

    let build_dir = options
        .project_root
        .join(".pio")
        .join("build")
        .join(&options.env);
    let firmware = build_dir.join("firmware.bin");

    if firmware.exists() {
        info!("firmware.bin ready: {}", firmware.display());
        Ok(Some(firmware))
    } else {
        // Some envs output only .elf/.hex; point at the folder.
        warn!(
            "firmware.bin not found; check the build output folder: {}",
            build_dir.display()
        );
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_defaults() {
        let options = BuildOptions::new("/repo");
        assert_eq!(options.image, DEFAULT_IMAGE);
        assert_eq!(options.container_name, DEFAULT_CONTAINER_NAME);
        assert_eq!(options.platform, DEFAULT_PLATFORM);
        assert_eq!(options.env, DEFAULT_PIO_ENV);
        assert!(!options.verbose);
        assert_eq!(options.project_root, PathBuf::from("/repo"));
    }

    #[test]
    fn test_pio_run_script_plain() {
        assert_eq!(
            pio_run_script("OpenRB-150", false),
            "set -e; pio run -e OpenRB-150"
        );
    }

    #[test]
    fn test_pio_run_script_verbose() {
        assert_eq!(
            pio_run_script("OpenRB-150", true),
            "set -e; pio run -e OpenRB-150 -v"
        );
    }

    #[test]
    fn test_docker_run_args_shape() {
        let options = BuildOptions::new("/repo");
        let args = docker_run_args(&options);
        assert_eq!(
            args,
            [
                "run",
                "--rm",
                "--name",
                DEFAULT_CONTAINER_NAME,
                "--platform",
                DEFAULT_PLATFORM,
                "-v",
                "/repo:/workspace",
                "-w",
                "/workspace",
                DEFAULT_IMAGE,
                "/bin/bash",
                "-lc",
                "set -e; pio run -e OpenRB-150",
            ]
        );
    }
}
