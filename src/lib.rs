//! # edgequake-md2pdf
//!
//! Convert a Markdown document into a styled PDF.
//!
//! Markdown is turned into HTML in-process (pulldown-cmark, with tables,
//! fenced code and an optional `[TOC]`), wrapped in a print stylesheet, and
//! handed to an external HTML-to-PDF renderer. Two renderers are supported
//! and tried in order; the first one that works wins.
//!
//! ## Pipeline Overview
//!
//! ```text
//! .md
//!  │
//!  ├─ 1. Check    at least one backend installed? (else MissingCapability)
//!  ├─ 2. Source   read UTF-8 text
//!  ├─ 3. Markdown pulldown-cmark → HTML body (+ heading anchors, TOC)
//!  ├─ 4. Template wrap in stylesheet flavor for the backend
//!  ├─ 5. Backend  wkhtmltopdf, else WeasyPrint (spawn_blocking)
//!  └─ 6. Sink     validate %PDF, atomic rename onto the destination
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_md2pdf::{convert, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let report = convert("docs/proposal.md", "docs/proposal.pdf", &config).await?;
//!     eprintln!("rendered by {} ({} bytes)", report.backend, report.pdf_bytes);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `md2pdf` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! edgequake-md2pdf = { version = "0.1", default-features = false }
//! ```
//!
//! ## Backends
//!
//! | Backend | Page geometry from | Install |
//! |---------|--------------------|---------|
//! | `wkhtmltopdf` | command-line options | <https://wkhtmltopdf.org/downloads.html> |
//! | `weasyprint`  | CSS `@page` rule     | `pip install weasyprint` |
//!
//! Executables are located via `WKHTMLTOPDF_PATH` / `WEASYPRINT_PATH`, then
//! `PATH`, then the usual install directories (see the `tool-probe` crate).

// ── Modules ──────────────────────────────────────────────────────────────

pub mod backend;
pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use backend::{Availability, BackendRegistry, PdfBackend, WeasyPrint, Wkhtmltopdf};
pub use config::{
    default_output_for, BackendChoice, ConversionConfig, ConversionConfigBuilder, HeadingAnchors,
    Margins, PageLayout, PageSize, DEFAULT_INPUT,
};
pub use convert::{capability_report, check_capabilities, convert, convert_sync, render_html};
pub use error::{BackendError, Md2PdfError};
pub use output::{AttemptOutcome, AttemptRecord, CapabilityReport, CapabilityStatus, ConversionReport};
pub use pipeline::template::TemplateFlavor;
pub use progress::{NoopProgressCallback, ProgressCallback, RenderProgressCallback};
