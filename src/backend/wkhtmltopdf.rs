//! Backend A: `wkhtmltopdf`.
//!
//! Page geometry is passed on the command line, so this backend consumes the
//! [`TemplateFlavor::OptionsPaged`] stylesheet.

use super::{Availability, ExternalTool, PdfBackend};
use crate::config::PageLayout;
use crate::error::BackendError;
use crate::pipeline::template::TemplateFlavor;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tool_probe::WKHTMLTOPDF;

const INSTALL_HINT: &str = "\
wkhtmltopdf: https://wkhtmltopdf.org/downloads.html
  Debian/Ubuntu: sudo apt install wkhtmltopdf
  macOS:         brew install --cask wkhtmltopdf
  Windows:       installer from the link above (adds C:\\Program Files\\wkhtmltopdf\\bin)
  Or set WKHTMLTOPDF_PATH=/path/to/wkhtmltopdf";

/// Renders through the `wkhtmltopdf` executable.
#[derive(Debug, Clone)]
pub struct Wkhtmltopdf {
    exe: ExternalTool,
}

impl Default for Wkhtmltopdf {
    fn default() -> Self {
        Self::new()
    }
}

impl Wkhtmltopdf {
    /// Locate the executable via `tool-probe` on each use.
    pub fn new() -> Self {
        Self {
            exe: ExternalTool::new(WKHTMLTOPDF),
        }
    }

    /// Use a specific executable instead of searching for one.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            exe: ExternalTool::with_program(WKHTMLTOPDF, program.into()),
        }
    }

    /// Command-line arguments for one render.
    pub fn args(layout: &PageLayout, input: &Path, output: &Path) -> Vec<OsString> {
        let m = &layout.margins;
        let mut args: Vec<OsString> = [
            "--quiet",
            "--page-size",
            layout.page_size.as_str(),
            "--margin-top",
            &m.top,
            "--margin-right",
            &m.right,
            "--margin-bottom",
            &m.bottom,
            "--margin-left",
            &m.left,
            "--encoding",
            &layout.encoding,
            if layout.outline { "--outline" } else { "--no-outline" },
            "--enable-local-file-access",
        ]
        .iter()
        .map(OsString::from)
        .collect();
        args.push(input.as_os_str().to_owned());
        args.push(output.as_os_str().to_owned());
        args
    }
}

impl PdfBackend for Wkhtmltopdf {
    fn name(&self) -> &str {
        self.exe.name()
    }

    fn flavor(&self) -> TemplateFlavor {
        TemplateFlavor::OptionsPaged
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
