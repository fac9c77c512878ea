//! Progress-callback trait for per-backend rendering events.
//!
//! Inject an [`Arc<dyn RenderProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to observe
//! the fallback chain as it runs: which backend is tried, which one is
//! skipped, which one failed and why.
//!
//! # Example
//!
//! ```rust
//! use edgequake_md2pdf::{ConversionConfig, RenderProgressCallback};
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl RenderProgressCallback for Printer {
//!     fn on_attempt_start(&self, backend: &str) {
//!         eprintln!("trying {backend}…");
//!     }
//! }
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(Arc::new(Printer) as Arc<dyn RenderProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by the conversion pipeline as it walks the backend registry.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait RenderProgressCallback: Send + Sync {
    /// Called once the Markdown has been converted, before any backend runs.
    ///
    /// # Arguments
    /// * `html_len` — byte length of the HTML body
    fn on_html_ready(&self, html_len: usize) {
        let _ = html_len;
    }

    /// A backend was passed over because it is not installed.
    fn on_backend_skipped(&self, backend: &str, reason: &str) {
        let _ = (backend, reason);
    }

    /// A backend is about to render.
    fn on_attempt_start(&self, backend: &str) {
        let _ = backend;
    }

    /// A backend failed; the next one (if any) will be tried.
    fn on_attempt_failed(&self, backend: &str, error: &str) {
        let _ = (backend, error);
    }

    /// A backend produced the PDF, now persisted at `output`.
    fn on_attempt_succeeded(&self, backend: &str, output: &Path) {
        let _ = (backend, output);
    }
}

/// A no-op implementation for callers that must pass a callback but don't
/// need progress events.
///
/// A [`crate::config::ConversionConfig`] without a callback fires no events
/// at all; this type is never installed implicitly.
pub struct NoopProgressCallback;

impl RenderProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn RenderProgressCallback>;
