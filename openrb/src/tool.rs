//! Resolution of the external `bossac` flashing tool.
//!
//! The tool may be installed on the system search path, referenced by
//! an explicit path, or left behind by PlatformIO in its per-user
//! package cache. Resolution is an ordered sequence of probes with
//! first match winning; absence is reported through
//! [`ToolSource::Unresolved`] rather than an error, so callers must
//! check before invoking anything.

use std::borrow::Cow;
use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use log::debug;

/// PlatformIO package that ships the `bossac` binary.
const PIO_TOOL_PACKAGE: &str = "tool-bossac";

/// Where a resolved tool path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolSource {
    /// The input was an explicit path that exists on disk.
    Explicit,
    /// Found on the process's executable search path.
    SearchPath,
    /// Found in the PlatformIO per-user package cache.
    PioCache,
    /// Not found anywhere; the path echoes the original input.
    Unresolved,
}

/// A flashing tool location derived from a name or path.
///
/// Re-derived on every upload attempt: the environment and `PATH` may
/// change between runs, so results are never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTool {
    /// Absolute or verbatim path to the tool.
    pub path: PathBuf,
    /// Which probe produced the path.
    pub source: ToolSource,
}

impl ResolvedTool {
    /// Whether any probe actually located the tool on disk.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.source != ToolSource::Unresolved
    }
}

/// Resolve a tool name or path against the current environment.
///
/// Performs only filesystem existence checks; nothing is executed.
#[must_use]
pub fn resolve_tool(name_or_path: &str) -> ResolvedTool {
    let home = BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
    resolve_in(
        name_or_path,
        env::var_os("PATH").as_deref(),
        home.as_deref(),
        cfg!(windows),
    )
}

/// Resolution against an explicit environment, for callers and tests
/// that must not depend on the live process environment.
pub(crate) fn resolve_in(
    input: &str,
    path_var: Option<&OsStr>,
    home: Option<&Path>,
    windows: bool,
) -> ResolvedTool {
    // Probe 1: explicit path, used verbatim.
    if has_path_separator(input, windows) && Path::new(input).exists() {
        debug!("Tool resolved from explicit path: {input}");
        return ResolvedTool {
            path: PathBuf::from(input),
            source: ToolSource::Explicit,
        };
    }

    // Probe 2: executable search path.
    if let Some(found) = search_path(input, path_var) {
        debug!("Tool resolved from PATH: {}", found.display());
        return ResolvedTool {
            path: found,
            source: ToolSource::SearchPath,
        };
    }

    // Probe 3: PlatformIO package cache under the home directory.
    if let Some(found) = pio_cache(input, home, windows) {
        debug!("Tool resolved from PlatformIO cache: {}", found.display());
        return ResolvedTool {
            path: found,
            source: ToolSource::PioCache,
        };
    }

    debug!("Tool not resolved: {input}");
    ResolvedTool {
        path: PathBuf::from(input),
        source: ToolSource::Unresolved,
    }
}

/// Whether the input names a path rather than a bare command.
fn has_path_separator(input: &str, windows: bool) -> bool {
    input.contains('/') || (windows && input.contains('\\'))
}

/// Look for `name` in each directory of the given search path value.
fn search_path(name: &str, path_var: Option<&OsStr>) -> Option<PathBuf> {
    let path_var = path_var?;
    env::split_paths(path_var)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

/// Probe the PlatformIO package cache (`~/.platformio/packages/`).
fn pio_cache(name: &str, home: Option<&Path>, windows: bool) -> Option<PathBuf> {
    let name = normalize_for(name, windows);
    let candidate = home?
        .join(".platformio")
        .join("packages")
        .join(PIO_TOOL_PACKAGE)
        .join(name.as_ref());
    candidate.is_file().then_some(candidate)
}

/// Append the Windows executable extension to a tool name when the
/// host family requires it.
#[must_use]
pub fn normalize_tool_name(name: &str) -> Cow<'_, str> {
    normalize_for(name, cfg!(windows))
}

fn normalize_for(name: &str, windows: bool) -> Cow<'_, str> {
    if windows && !name.to_ascii_lowercase().ends_with(".exe") {
        Cow::Owned(format!("{name}.exe"))
    } else {
        Cow::Borrowed(name)
    }
}
