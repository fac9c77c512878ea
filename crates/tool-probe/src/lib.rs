//! # tool-probe
//!
//! Locate external command-line tools (`wkhtmltopdf`, `weasyprint`, …) on
//! disk so that callers can decide which rendering path is viable *before*
//! committing to it.
//!
//! ## How it works
//!
//! [`locate`] resolves a [`Tool`] in this order:
//!
//! 1. The tool's override environment variable (e.g. `WKHTMLTOPDF_PATH`).
//! 2. Every directory listed in `PATH`.
//! 3. Well-known per-platform install directories (e.g.
//!    `C:\Program Files\wkhtmltopdf\bin` on Windows, `/opt/homebrew/bin`
//!    on macOS).
//!
//! Probing only inspects file metadata: nothing is spawned. [`version`] is
//! the one function that runs the tool, and only when asked to.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tool_probe::{locate, is_installed, WKHTMLTOPDF};
//!
//! if is_installed(&WKHTMLTOPDF) {
//!     let path = locate(&WKHTMLTOPDF).unwrap();
//!     println!("wkhtmltopdf at {}", path.display());
//! }
//! ```
//!
//! ## Environment variable overrides
//!
//! - `WKHTMLTOPDF_PATH` — explicit path to the `wkhtmltopdf` executable.
//! - `WEASYPRINT_PATH` — explicit path to the `weasyprint` executable.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;

// ── Known tools ──────────────────────────────────────────────────────────────

/// Description of an external executable and where to look for it.
#[derive(Debug, Clone, Copy)]
pub struct Tool {
    /// Bare program name, without platform suffix (e.g. `wkhtmltopdf`).
    pub name: &'static str,
    /// Environment variable that may hold an explicit path to the program.
    pub env_var: &'static str,
    /// Extra directories checked after `PATH`, per platform.
    pub fallback_dirs: fn() -> Vec<PathBuf>,
}

/// The `wkhtmltopdf` renderer (Qt WebKit based).
pub const WKHTMLTOPDF: Tool = Tool {
    name: "wkhtmltopdf",
    env_var: "WKHTMLTOPDF_PATH",
    fallback_dirs: wkhtmltopdf_dirs,
};

/// The `weasyprint` renderer (Python, CSS paged media).
pub const WEASYPRINT: Tool = Tool {
    name: "weasyprint",
    env_var: "WEASYPRINT_PATH",
    fallback_dirs: weasyprint_dirs,
};

// ── Error type ───────────────────────────────────────────────────────────────

/// Errors returned by tool-probe operations.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The tool was not found in any searched location.
    #[error("'{tool}' not found on PATH or in {searched} fallback location(s)")]
    NotFound { tool: String, searched: usize },

    /// The override environment variable points at something unusable.
    #[error("{var} is set to '{path}' but no executable exists there")]
    OverrideInvalid { var: String, path: PathBuf },

    /// Running `<tool> --version` failed.
    #[error("Could not query version of '{path}': {reason}")]
    Version { path: PathBuf, reason: String },
}

// ── Internal: platform metadata ──────────────────────────────────────────────

/// Platform-specific executable file name, e.g. `wkhtmltopdf.exe` on Windows.
pub fn executable_name(name: &str) -> String {
    match std::env::consts::OS {
        "windows" => format!("{name}.exe"),
        _ => name.to_string(),
    }
}

fn wkhtmltopdf_dirs() -> Vec<PathBuf> {
    match std::env::consts::OS {
        "windows" => vec![
            PathBuf::from(r"C:\Program Files\wkhtmltopdf\bin"),
            PathBuf::from(r"C:\Program Files (x86)\wkhtmltopdf\bin"),
        ],
        "macos" => vec![
            PathBuf::from("/usr/local/bin"),
            PathBuf::from("/opt/homebrew/bin"),
        ],
        _ => vec![PathBuf::from("/usr/local/bin"), PathBuf::from("/usr/bin")],
    }
}

fn weasyprint_dirs() -> Vec<PathBuf> {
    let mut dirs = match std::env::consts::OS {
        "macos" => vec![
            PathBuf::from("/usr/local/bin"),
            PathBuf::from("/opt/homebrew/bin"),
        ],
        "windows" => Vec::new(),
        _ => vec![PathBuf::from("/usr/local/bin"), PathBuf::from("/usr/bin")],
    };
    // `pip install --user` puts console scripts here.
    if let Some(home) = std::env::var_os("HOME") {
        dirs.push(PathBuf::from(home).join(".local").join("bin"));
    }
    dirs
}

// ── Public API ───────────────────────────────────────────────────────────────

/// Resolve the on-disk path of `tool`.
///
/// An override variable that is set but points nowhere is an error rather
/// than a silent fall-through, so a typo in `WKHTMLTOPDF_PATH` is reported
/// instead of quietly picking a different binary.
pub fn locate(tool: &Tool) -> Result<PathBuf, ProbeError> {
    if let Some(raw) = std::env::var_os(tool.env_var) {
        if !raw.is_empty() {
            let p = PathBuf::from(raw);
            if is_executable(&p) {
                return Ok(p);
            }
            return Err(ProbeError::OverrideInvalid {
                var: tool.env_var.to_string(),
                path: p,
            });
        }
    }

    let exe = executable_name(tool.name);

    if let Some(path_var) = std::env::var_os("PATH") {
        if let Some(found) = find_in_path(&exe, &path_var) {
            return Ok(found);
        }
    }

    let fallbacks = (tool.fallback_dirs)();
    for dir in &fallbacks {
        let candidate = dir.join(&exe);
        if is_executable(&candidate) {
            return Ok(candidate);
        }
    }

    Err(ProbeError::NotFound {
        tool: tool.name.to_string(),
        searched: fallbacks.len(),
    })
}

/// Returns `true` if [`locate`] would succeed.
pub fn is_installed(tool: &Tool) -> bool {
    locate(tool).is_ok()
}

/// Search a `PATH`-style list of directories for `exe`.
pub fn find_in_path(exe: &str, path_var: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(path_var)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(exe))
        .find(|candidate| is_executable(candidate))
}

/// Run `<path> --version` and return the first non-empty line of output.
///
/// Some tools print their version on stderr, so both streams are checked.
pub fn version(path: &Path) -> Result<String, ProbeError> {
    let output = Command::new(path)
        .arg("--version")
        .stdin(Stdio::null())
        .output()
        .map_err(|e| ProbeError::Version {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(ProbeError::Version {
            path: path.to_path_buf(),
            reason: format!("exited with {}", output.status),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    stdout
        .lines()
        .chain(stderr.lines())
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ProbeError::Version {
            path: path.to_path_buf(),
            reason: "no output".into(),
        })
}

// ── Internal helpers ─────────────────────────────────────────────────────────

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|m| m.is_file())
        .unwrap_or(false)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
