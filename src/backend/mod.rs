//! HTML-to-PDF rendering backends.
//!
//! Each backend is a capability-checked plugin: [`PdfBackend::probe`] reports
//! whether it can run (without running it), [`PdfBackend::render`] does the
//! work. The [`BackendRegistry`] holds backends in priority order; the
//! orchestrator in [`crate::convert`] walks it until one succeeds.
//!
//! | Priority | Backend | Stylesheet flavor |
//! |----------|---------|-------------------|
//! | 1 | [`Wkhtmltopdf`] | [`TemplateFlavor::OptionsPaged`] |
//! | 2 | [`WeasyPrint`]  | [`TemplateFlavor::CssPaged`] |
//!
//! `render` is blocking; callers run it inside `spawn_blocking`.

mod weasyprint;
mod wkhtmltopdf;

pub use weasyprint::WeasyPrint;
pub use wkhtmltopdf::Wkhtmltopdf;

use crate::config::{BackendChoice, PageLayout};
use crate::error::BackendError;
use crate::pipeline::template::TemplateFlavor;
use std::ffi::OsString;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tool_probe::Tool;
use tracing::debug;

/// Result of probing a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    /// Ready to render; `location` is the executable, when there is one.
    Installed { location: Option<PathBuf> },
    /// Cannot render.
    Missing { reason: String },
}

impl Availability {
    pub fn is_installed(&self) -> bool {
        matches!(self, Availability::Installed { .. })
    }
}

/// A strategy that turns a complete HTML document into a PDF file.
pub trait PdfBackend: Send + Sync {
    /// Short stable name used in logs, reports and `--backend`.
    fn name(&self) -> &str;

    /// Stylesheet flavor this backend expects.
    fn flavor(&self) -> TemplateFlavor;

    /// Installation instructions shown when the backend is missing.
    fn install_hint(&self) -> &str;

    /// Check availability. Must not spawn the renderer or touch the output.
    fn probe(&self) -> Availability;

    /// Render `html` into the file at `output`.
    fn render(&self, html: &str, output: &Path, layout: &PageLayout) -> Result<(), BackendError>;
}

/// Ordered list of backends to try.
#[derive(Clone)]
pub struct BackendRegistry {
    backends: Vec<Arc<dyn PdfBackend>>,
}

impl BackendRegistry {
    pub fn new(backends: Vec<Arc<dyn PdfBackend>>) -> Self {
        Self { backends }
    }

    /// wkhtmltopdf, then WeasyPrint.
    pub fn builtin() -> Self {
        Self::from_choice(BackendChoice::Auto)
    }

    pub fn from_choice(choice: BackendChoice) -> Self {
        let backends: Vec<Arc<dyn PdfBackend>> = match choice {
            BackendChoice::Auto => vec![
                Arc::new(Wkhtmltopdf::new()),
                Arc::new(WeasyPrint::new()),
            ],
            BackendChoice::Wkhtmltopdf => vec![Arc::new(Wkhtmltopdf::new())],
            BackendChoice::WeasyPrint => vec![Arc::new(WeasyPrint::new())],
        };
        Self::new(backends)
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn names(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn PdfBackend>> {
        self.backends.iter()
    }

    /// Probe every backend once, in priority order.
    pub fn probe_all(&self) -> Vec<(Arc<dyn PdfBackend>, Availability)> {
        self.backends
            .iter()
            .map(|b| {
                let availability = b.probe();
                debug!("Backend {}: {:?}", b.name(), availability);
                (Arc::clone(b), availability)
            })
            .collect()
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

// ── Shared helpers for process-driven backends ───────────────────────────────

/// An external renderer executable: either pinned to a path or located via
/// `tool-probe` on each use.
#[derive(Debug, Clone)]
pub(crate) struct ExternalTool {
    tool: Tool,
    program: Option<PathBuf>,
}

impl ExternalTool {
    pub(crate) fn new(tool: Tool) -> Self {
        Self { tool, program: None }
    }

    pub(crate) fn with_program(tool: Tool, program: PathBuf) -> Self {
        Self {
            tool,
            program: Some(program),
        }
    }

    pub(crate) fn name(&self) -> &'static str {
        self.tool.name
    }

    fn locate(&self) -> Result<PathBuf, String> {
        match &self.program {
            Some(p) if p.is_file() => Ok(p.clone()),
            Some(p) => Err(format!("'{}' does not exist", p.display())),
            None => tool_probe::locate(&self.tool).map_err(|e| e.to_string()),
        }
    }

    pub(crate) fn probe(&self) -> Availability {
        match self.locate() {
            Ok(path) => Availability::Installed {
                location: Some(path),
            },
            Err(reason) => Availability::Missing { reason },
        }
    }

    /// Stage `html` and run the executable with `args(staged_html_path)`.
    pub(crate) fn render(
        &self,
        html: &str,
        args: impl FnOnce(&Path) -> Vec<OsString>,
    ) -> Result<(), BackendError> {
        let name = self.name();
        let program = self.locate().map_err(|detail| BackendError::Unavailable {
            backend: name.to_string(),
            detail,
        })?;
        let input = stage_html(name, html)?;
        run_renderer(name, &program, &args(input.path()))
    }
}

/// Longest stderr excerpt kept in a [`BackendError::Failed`].
const STDERR_LIMIT: usize = 2000;

/// Write `html` to a temporary `.html` file the renderer can read.
pub(crate) fn stage_html(backend: &str, html: &str) -> Result<NamedTempFile, BackendError> {
    let io_err = |e: std::io::Error| BackendError::Io {
        backend: backend.to_string(),
        detail: e.to_string(),
    };
    let mut file = tempfile::Builder::new()
        .prefix("md2pdf-")
        .suffix(".html")
        .tempfile()
        .map_err(io_err)?;
    file.write_all(html.as_bytes()).map_err(io_err)?;
    file.flush().map_err(io_err)?;
    Ok(file)
}

/// Run `program args…`, mapping spawn failures and non-zero exits.
pub(crate) fn run_renderer(
    backend: &str,
    program: &Path,
    args: &[OsString],
) -> Result<(), BackendError> {
    debug!("Running {} {:?}", program.display(), args);

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| BackendError::Spawn {
            backend: backend.to_string(),
            detail: format!("{}: {e}", program.display()),
        })?;

    let stderr = String::from_utf8_lossy(&output.stderr);
    if !output.status.success() {
        return Err(BackendError::Failed {
            backend: backend.to_string(),
            status: output.status.to_string(),
            stderr: tail(stderr.trim(), STDERR_LIMIT).to_string(),
        });
    }

    if !stderr.trim().is_empty() {
        debug!("{backend} stderr: {}", stderr.trim());
    }
    Ok(())
}

/// Last `limit` bytes of `s`, cut on a char boundary.
fn tail(s: &str, limit: usize) -> &str {
    if s.len() <= limit {
        return s;
    }
    let mut start = s.len() - limit;
    while !s.is_char_boundary(start) {
        start += 1;
    }
    &s[start..]
}
