//! Output handling: staging files for backends and persisting the result.
//!
//! A backend never writes to the destination path directly. Each attempt
//! renders into a hidden staging file in the destination's directory; only
//! after the staged file passes [`validate_pdf`] is it renamed over the
//! destination. A failed or aborted attempt drops its staging file, so the
//! destination is either the previous file or a complete new PDF.

use crate::error::{BackendError, Md2PdfError};
use std::io::Read;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tracing::debug;

/// A staging file that becomes the output on [`StagedOutput::persist`].
#[derive(Debug)]
pub struct StagedOutput {
    temp: TempPath,
    destination: PathBuf,
}

/// Create a staging file next to `destination`, creating parent dirs.
pub fn stage(destination: &Path) -> Result<StagedOutput, Md2PdfError> {
    let parent = match destination.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let io_err = |source| Md2PdfError::OutputWriteFailed {
        path: destination.to_path_buf(),
        source,
    };

    std::fs::create_dir_all(&parent).map_err(io_err)?;
    let temp = tempfile::Builder::new()
        .prefix(".md2pdf-")
        .suffix(".pdf")
        .tempfile_in(&parent)
        .map_err(io_err)?
        .into_temp_path();

    debug!("Staging {} via {}", destination.display(), temp.display());
    Ok(StagedOutput {
        temp,
        destination: destination.to_path_buf(),
    })
}

impl StagedOutput {
    /// Where the backend should write.
    pub fn path(&self) -> &Path {
        &self.temp
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Atomically move the staged file onto the destination.
    pub fn persist(self) -> Result<(), Md2PdfError> {
        let destination = self.destination;
        self.temp
            .persist(&destination)
            .map_err(|e| Md2PdfError::OutputWriteFailed {
                path: destination.clone(),
                source: e.error,
            })
    }
}

/// Check that `path` holds a non-empty file starting with `%PDF`.
///
/// Returns the file size on success.
pub fn validate_pdf(path: &Path, backend: &str) -> Result<u64, BackendError> {
    let invalid = |detail: String| BackendError::InvalidOutput {
        backend: backend.to_string(),
        detail,
    };

    let mut f = std::fs::File::open(path).map_err(|e| invalid(e.to_string()))?;
    let size = f
        .metadata()
        .map_err(|e| invalid(e.to_string()))?
        .len();
    if size == 0 {
        return Err(invalid("output file is empty".into()));
    }

    let mut magic = [0u8; 4];
    f.read_exact(&mut magic)
        .map_err(|e| invalid(format!("could not read header: {e}")))?;
    if &magic != b"%PDF" {
        return Err(invalid(format!("unexpected header {magic:?}")));
    }

    Ok(size)
}

/// Write the intermediate HTML document, creating parent dirs.
pub async fn write_html(path: &Path, html: &str) -> Result<(), Md2PdfError> {
    let io_err = |source| Md2PdfError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
    }
    tokio::fs::write(path, html).await.map_err(io_err)
}
