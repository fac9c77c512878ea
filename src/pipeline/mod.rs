//! Pipeline stages for Markdown-to-PDF conversion.
//!
//! Each submodule implements exactly one transformation step; the backend
//! invocation itself lives in [`crate::backend`].
//!
//! ## Data Flow
//!
//! ```text
//! source ──▶ markdown ──▶ template ──▶ backend ──▶ sink
//! (.md file)  (pulldown)   (CSS)       (A, then B)  (stage + rename)
//! ```
//!
//! 1. [`source`]   — read the UTF-8 Markdown file, classify I/O failures
//! 2. [`markdown`] — Markdown → HTML body, with heading anchors and `[TOC]`
//! 3. [`template`] — wrap the body in the stylesheet flavor a backend expects
//! 4. [`sink`]     — staging files per attempt, `%PDF` validation, atomic
//!    persist

pub mod markdown;
pub mod sink;
pub mod source;
pub mod template;
