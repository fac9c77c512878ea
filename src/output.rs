//! Result types returned by the conversion and capability-check APIs.

use crate::error::BackendError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Outcome of a successful conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionReport {
    /// Name of the backend that produced the PDF.
    pub backend: String,
    /// Where the PDF was written.
    pub output: PathBuf,
    /// Size of the HTML body fed to the template, in bytes.
    pub html_bytes: usize,
    /// Size of the persisted PDF, in bytes.
    pub pdf_bytes: u64,
    /// Wall-clock duration of the whole run.
    pub duration_ms: u64,
    /// Every backend considered, in registry order, up to and including the
    /// one that succeeded.
    pub attempts: Vec<AttemptRecord>,
}

/// What happened when one backend was considered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub backend: String,
    pub outcome: AttemptOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// Not installed; never invoked.
    Skipped { reason: String },
    /// Invoked and failed.
    Failed { error: BackendError },
    /// Invoked and produced the output.
    Succeeded { duration_ms: u64 },
}

/// Availability of every capability the pipeline depends on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityReport {
    /// Markdown parser. Always linked in, listed for completeness.
    pub markdown: CapabilityStatus,
    /// PDF backends in registry order.
    pub backends: Vec<CapabilityStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityStatus {
    pub name: String,
    pub available: bool,
    /// Where the capability was found, if it lives on disk.
    pub location: Option<PathBuf>,
    /// Why it is unavailable, when it is.
    pub detail: Option<String>,
    /// How to install it.
    pub install_hint: String,
}

impl CapabilityReport {
    /// `true` when Markdown conversion and at least one backend are present.
    pub fn is_viable(&self) -> bool {
        self.markdown.available && self.backends.iter().any(|b| b.available)
    }

    /// Names of the capabilities whose absence blocks the pipeline.
    ///
    /// Empty when [`is_viable`](Self::is_viable). Backends are only listed
    /// when *none* of them is available, since any one of them suffices.
    pub fn missing(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if !self.markdown.available {
            missing.push(self.markdown.name.clone());
        }
        if !self.backends.iter().any(|b| b.available) {
            missing.extend(self.backends.iter().map(|b| b.name.clone()));
        }
        missing
    }

    /// Installation instructions for exactly the missing capabilities.
    ///
    /// Returns an empty string when nothing is missing.
    pub fn install_guidance(&self) -> String {
        let missing = self.missing();
        if missing.is_empty() {
            return String::new();
        }

        let mut out = String::from("To install:\n");
        let hints = std::iter::once(&self.markdown)
            .chain(self.backends.iter())
            .filter(|c| missing.contains(&c.name));
        for (i, cap) in hints.enumerate() {
            if i > 0 {
                out.push_str("  # or\n");
            }
            for line in cap.install_hint.lines() {
                out.push_str("  ");
                out.push_str(line);
                out.push('\n');
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(name: &str, available: bool) -> CapabilityStatus {
        CapabilityStatus {
            name: name.into(),
            available,
            location: None,
            detail: None,
            install_hint: format!("install {name}"),
        }
    }

    fn report(a: bool, b: bool) -> CapabilityReport {
        CapabilityReport {
            markdown: status("markdown", true),
            backends: vec![status("wkhtmltopdf", a), status("weasyprint", b)],
        }
    }

    #[test]
    fn one_backend_is_enough() {
        assert!(report(true, false).is_viable());
        assert!(report(false, true).is_viable());
        assert!(report(false, true).missing().is_empty());
        assert_eq!(report(true, true).install_guidance(), "");
    }

    #[test]
    fn no_backend_lists_both() {
        let r = report(false, false);
        assert!(!r.is_viable());
        assert_eq!(r.missing(), vec!["wkhtmltopdf", "weasyprint"]);
        let g = r.install_guidance();
        assert!(g.contains("install wkhtmltopdf"));
        assert!(g.contains("# or"));
        assert!(g.contains("install weasyprint"));
        assert!(!g.contains("install markdown"));
    }

    #[test]
    fn attempt_outcome_serialises_with_status_tag() {
        let rec = AttemptRecord {
            backend: "weasyprint".into(),
            outcome: AttemptOutcome::Succeeded { duration_ms: 12 },
        };
        let json = serde_json::to_string(&rec).unwrap();
        assert!(json.contains(r#""status":"succeeded""#), "got: {json}");
    }
}
