//! Error types for the edgequake-md2pdf library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Md2PdfError`] — **Fatal**: the conversion cannot proceed at all
//!   (no renderer installed, source file missing, every backend failed).
//!   Returned as `Err(Md2PdfError)` from the top-level `convert*` functions.
//!
//! * [`BackendError`] — **Non-fatal**: one rendering backend failed, but the
//!   next one in the registry may still succeed. Stored inside
//!   [`crate::output::AttemptRecord`] so callers can see why a fallback
//!   happened.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-md2pdf library.
///
/// Per-backend failures use [`BackendError`] and only surface here, wrapped
/// in [`Md2PdfError::AllBackendsExhausted`], when no backend is left to try.
#[derive(Debug, Error)]
pub enum Md2PdfError {
    // ── Environment errors ────────────────────────────────────────────────
    /// No PDF rendering backend is installed.
    #[error(
        "Missing dependencies: {}\n\n{guidance}",
        .missing.join(" or ")
    )]
    MissingCapability {
        missing: Vec<String>,
        guidance: String,
    },

    // ── Input errors ──────────────────────────────────────────────────────
    /// Source Markdown file was not found at the given path.
    #[error("File not found: '{path}'")]
    SourceNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists but is not valid UTF-8 text.
    #[error("Source '{path}' is not valid UTF-8 text")]
    SourceNotUtf8 { path: PathBuf },

    /// Any other I/O failure while reading the source.
    #[error("Failed to read '{path}': {source}")]
    SourceReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Rendering errors ──────────────────────────────────────────────────
    /// Every configured backend was unavailable or failed.
    #[error(
        "Could not generate the PDF: all {} backend(s) failed.\n{}",
        .attempts.len(),
        .attempts.iter().map(|e| format!("  • {e}")).collect::<Vec<_>>().join("\n")
    )]
    AllBackendsExhausted { attempts: Vec<BackendError> },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not stage, persist or emit an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single backend attempt.
///
/// The orchestrator records it and moves on to the next backend.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum BackendError {
    /// The backend's executable is not installed.
    #[error("{backend}: not available ({detail})")]
    Unavailable { backend: String, detail: String },

    /// The executable exists but could not be started.
    #[error("{backend}: failed to start: {detail}")]
    Spawn { backend: String, detail: String },

    /// The renderer ran and exited unsuccessfully.
    #[error("{backend}: exited with {status}: {stderr}")]
    Failed {
        backend: String,
        status: String,
        stderr: String,
    },

    /// The renderer claimed success but did not produce a usable PDF.
    #[error("{backend}: produced no valid PDF: {detail}")]
    InvalidOutput { backend: String, detail: String },

    /// Staging input for the renderer failed.
    #[error("{backend}: I/O error: {detail}")]
    Io { backend: String, detail: String },
}

impl BackendError {
    /// Name of the backend that produced this error.
    pub fn backend(&self) -> &str {
        match self {
            BackendError::Unavailable { backend, .. }
            | BackendError::Spawn { backend, .. }
            | BackendError::Failed { backend, .. }
            | BackendError::InvalidOutput { backend, .. }
            | BackendError::Io { backend, .. } => backend,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_capability_lists_every_backend() {
        let e = Md2PdfError::MissingCapability {
            missing: vec!["wkhtmltopdf".into(), "weasyprint".into()],
            guidance: "install one".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("wkhtmltopdf or weasyprint"), "got: {msg}");
        assert!(msg.contains("install one"));
    }

    #[test]
    fn exhausted_display_includes_each_attempt() {
        let e = Md2PdfError::AllBackendsExhausted {
            attempts: vec![
                BackendError::Unavailable {
                    backend: "wkhtmltopdf".into(),
                    detail: "not on PATH".into(),
                },
                BackendError::Failed {
                    backend: "weasyprint".into(),
                    status: "exit status: 1".into(),
                    stderr: "boom".into(),
                },
            ],
        };
        let msg = e.to_string();
        assert!(msg.contains("all 2 backend(s)"), "got: {msg}");
        assert!(msg.contains("wkhtmltopdf: not available"));
        assert!(msg.contains("weasyprint: exited with exit status: 1: boom"));
    }

    #[test]
    fn backend_name_accessor() {
        let e = BackendError::InvalidOutput {
            backend: "weasyprint".into(),
            detail: "empty file".into(),
        };
        assert_eq!(e.backend(), "weasyprint");
    }

    #[test]
    fn source_not_found_display() {
        let e = Md2PdfError::SourceNotFound {
            path: PathBuf::from("docs/missing.md"),
        };
        assert!(e.to_string().contains("docs/missing.md"));
    }
}
