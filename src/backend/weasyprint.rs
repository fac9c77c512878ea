//! Backend B: WeasyPrint.
//!
//! WeasyPrint implements CSS paged media, so page size and margins travel in
//! the `@page` rule of the [`TemplateFlavor::CssPaged`] stylesheet and the
//! command line only names the files.

use super::{Availability, ExternalTool, PdfBackend};
use crate::config::PageLayout;
use crate::error::BackendError;
use crate::pipeline::template::TemplateFlavor;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tool_probe::WEASYPRINT;

const INSTALL_HINT: &str = "\
pip install weasyprint
  System libraries (Pango) are also required:
  https://doc.courtbouillon.org/weasyprint/stable/first_steps.html
  Or set WEASYPRINT_PATH=/path/to/weasyprint";

/// Renders through the `weasyprint` executable.
#[derive(Debug, Clone)]
pub struct WeasyPrint {
    exe: ExternalTool,
}

impl Default for WeasyPrint {
    fn default() -> Self {
        Self::new()
    }
}

impl WeasyPrint {
    /// Locate the executable via `tool-probe` on each use.
    pub fn new() -> Self {
        Self {
            exe: ExternalTool::new(WEASYPRINT),
        }
    }

    /// Use a specific executable instead of searching for one.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            exe: ExternalTool::with_program(WEASYPRINT, program.into()),
        }
    }

    pub fn args(layout: &PageLayout, input: &Path, output: &Path) -> Vec<OsString> {
        vec![
            OsString::from("--encoding"),
            OsString::from(layout.encoding.to_lowercase()),
            input.as_os_str().to_owned(),
            output.as_os_str().to_owned(),
        ]
    }
}

impl PdfBackend for WeasyPrint {
    fn name(&self) -> &str {
        self.exe.name()
    }

    fn flavor(&self) -> TemplateFlavor {
        TemplateFlavor::CssPaged
    }

    fn install_hint(&self) -> &str {
        INSTALL_HINT
    }

    fn probe(&self) -> Availability {
        self.exe.probe()
    }

    fn render(&self, html: &str, output: &Path, layout: &PageLayout) -> Result<(), BackendError> {
        self.exe.render(html, |input| Self::args(layout, input, output))
    }
}
