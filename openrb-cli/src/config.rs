//! Configuration file support for openrb.
//!
//! Configuration is loaded from multiple sources with the following priority (highest first):
//! 1. Command-line arguments
//! 2. Environment variables (OPENRB_*)
//! 3. Local config file (./openrb.toml)
//! 4. Global config file (~/.config/openrb/config.toml)

use directories::ProjectDirs;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Upload defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Preferred serial port (e.g., "/dev/ttyACM0" or "COM5").
    pub port: Option<String>,
    /// Firmware artifact path.
    pub firmware: Option<PathBuf>,
    /// bossac command or path.
    pub bossac: Option<String>,
    /// Post-touch settle delay in seconds.
    pub wait: Option<f64>,
    /// Skip the 1200 bps touch by default.
    #[serde(default)]
    pub no_touch: bool,
}

/// Containerized build defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Docker image name.
    pub image: Option<String>,
    /// Docker platform.
    pub platform: Option<String>,
    /// PlatformIO env name.
    pub env: Option<String>,
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Upload defaults.
    #[serde(default)]
    pub upload: UploadConfig,
    /// Build defaults.
    #[serde(default)]
    pub build: BuildConfig,
}

impl Config {
    /// Load configuration from all available sources.
    pub fn load() -> Self {
        let mut config = Self::default();

        // Load global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                if let Some(global_config) = Self::load_from_file(&global_path) {
                    debug!("Loaded global config from {}", global_path.display());
                    config.merge(global_config);
                }
            }
        }

        // Load local config (overrides global)
        if let Some(local_config) = Self::load_from_file(Path::new("openrb.toml")) {
            debug!("Loaded local config from openrb.toml");
            config.merge(local_config);
        }

        config
    }

    /// Load configuration from a specific file path (--config flag).
    pub fn load_from_path(path: &Path) -> Self {
        if let Some(config) = Self::load_from_file(path) {
            debug!("Loaded config from {}", path.display());
            config
        } else {
            warn!(
                "Could not load config from {}, using defaults",
                path.display()
            );
            Self::default()
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => Some(config),
                Err(e) => {
                    warn!("Failed to parse config file {}: {}", path.display(), e);
                    None
                },
            },
            Err(e) => {
                warn!("Failed to read config file {}: {}", path.display(), e);
                None
            },
        }
    }

    /// Get the global configuration directory.
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "openrb").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the global configuration file path.
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Merge another config into this one.
    fn merge(&mut self, other: Self) {
        // Upload config
        if other.upload.port.is_some() {
            self.upload.port = other.upload.port;
        }
        if other.upload.firmware.is_some() {
            self.upload.firmware = other.upload.firmware;
        }
        if other.upload.bossac.is_some() {
            self.upload.bossac = other.upload.bossac;
        }
        if other.upload.wait.is_some() {
            self.upload.wait = other.upload.wait;
        }
        if other.upload.no_touch {
            self.upload.no_touch = true;
        }

        // Build config
        if other.build.image.is_some() {
            self.build.image = other.build.image;
        }
        if other.build.platform.is_some() {
            self.build.platform = other.build.platform;
        }
        if other.build.env.is_some() {
            self.build.env = other.build.env;
        }
    }
}
