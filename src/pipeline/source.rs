//! Source resolution: read the Markdown document from disk.
//!
//! Errors are classified here (missing, unreadable, not UTF-8) so the
//! orchestrator can report them without inspecting `io::ErrorKind` itself.

use crate::error::Md2PdfError;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// Read `path` as UTF-8 Markdown.
///
/// A leading byte-order mark is stripped; line endings are left to the
/// Markdown parser, which accepts both LF and CRLF.
pub async fn read_source(path: &Path) -> Result<String, Md2PdfError> {
    if !path.exists() {
        return Err(Md2PdfError::SourceNotFound {
            path: path.to_path_buf(),
        });
    }

    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => Md2PdfError::SourceNotFound {
            path: path.to_path_buf(),
        },
        ErrorKind::PermissionDenied => Md2PdfError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => Md2PdfError::SourceReadFailed {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    let text = String::from_utf8(bytes).map_err(|_| Md2PdfError::SourceNotUtf8 {
        path: path.to_path_buf(),
    })?;

    let text = match text.strip_prefix('\u{FEFF}') {
        Some(rest) => rest.to_string(),
        None => text,
    };

    debug!("Read source {} ({} bytes)", path.display(), text.len());
    Ok(text)
}
