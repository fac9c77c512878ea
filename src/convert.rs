//! Conversion entry points.
//!
//! [`convert`] runs the whole pipeline: capability check, source read,
//! Markdown conversion, then the backend fallback chain. [`check_capabilities`]
//! runs only the first step and is what `md2pdf --check` reports.

use crate::backend::{Availability, BackendRegistry, PdfBackend};
use crate::config::{ConversionConfig, PageLayout};
use crate::error::{BackendError, Md2PdfError};
use crate::output::{AttemptOutcome, AttemptRecord, CapabilityReport, CapabilityStatus, ConversionReport};
use crate::pipeline::markdown::{self, MarkdownOutput};
use crate::pipeline::template::{self, TemplateFlavor};
use crate::pipeline::{sink, source};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Name under which the Markdown converter appears in capability reports.
pub const MARKDOWN_CAPABILITY: &str = "markdown";

/// Probe every capability the configured pipeline needs.
///
/// Never runs a renderer and never touches any file.
pub fn check_capabilities(config: &ConversionConfig) -> CapabilityReport {
    capability_report(&config.registry())
}

/// Capability report for an explicit backend registry.
pub fn capability_report(registry: &BackendRegistry) -> CapabilityReport {
    report_from_probes(&registry.probe_all())
}

fn report_from_probes(probes: &[(Arc<dyn PdfBackend>, Availability)]) -> CapabilityReport {
    let backends = probes
        .iter()
        .map(|(backend, availability)| {
            let (available, location, detail) = match availability {
                Availability::Installed { location } => (true, location.clone(), None),
                Availability::Missing { reason } => (false, None, Some(reason.clone())),
            };
            CapabilityStatus {
                name: backend.name().to_string(),
                available,
                location,
                detail,
                install_hint: backend.install_hint().to_string(),
            }
        })
        .collect();

    CapabilityReport {
        markdown: CapabilityStatus {
            name: MARKDOWN_CAPABILITY.to_string(),
            available: true,
            location: None,
            detail: Some("pulldown-cmark (built in)".to_string()),
            install_hint: String::new(),
        },
        backends,
    }
}

/// Build the complete HTML document a backend of `flavor` would receive.
///
/// Pure: the same Markdown and config always yield the same string.
pub fn render_html(markdown: &str, flavor: TemplateFlavor, config: &ConversionConfig) -> String {
    let converted = markdown::markdown_to_html(markdown, config.anchors);
    document_for(&converted, flavor, config)
}

fn document_for(converted: &MarkdownOutput, flavor: TemplateFlavor, config: &ConversionConfig) -> String {
    let title = config.title.as_deref().or_else(|| converted.first_title());
    template::wrap_document(&converted.body, flavor, &config.layout, title)
}

/// Convert the Markdown file at `input` into a PDF at `output`.
///
/// Backends are tried in registry order; the first one that produces a valid
/// PDF wins and the rest are never invoked. The destination is only replaced
/// once a complete PDF exists, so on any error a pre-existing file at
/// `output` is left as it was.
///
/// # Errors
/// - [`Md2PdfError::MissingCapability`] when no backend is installed
///   (checked before the source is read)
/// - [`Md2PdfError::SourceNotFound`] and friends when `input` is unreadable
/// - [`Md2PdfError::AllBackendsExhausted`] when every backend failed
pub async fn convert(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionReport, Md2PdfError> {
    let total_start = Instant::now();
    let input = input.as_ref();
    let output = output.as_ref();
    info!("Converting {} -> {}", input.display(), output.display());

    // ── Step 1: Capabilities ─────────────────────────────────────────────
    let registry = config.registry();
    let probes = registry.probe_all();
    let capabilities = report_from_probes(&probes);
    if !capabilities.is_viable() {
        return Err(Md2PdfError::MissingCapability {
            missing: capabilities.missing(),
            guidance: capabilities.install_guidance(),
        });
    }

    // ── Step 2: Source ───────────────────────────────────────────────────
    let text = source::read_source(input).await?;

    // ── Step 3: Markdown → HTML body ─────────────────────────────────────
    let converted = markdown::markdown_to_html(&text, config.anchors);
    let html_bytes = converted.body.len();
    debug!(
        "Converted {} bytes of Markdown into {} bytes of HTML ({} headings)",
        text.len(),
        html_bytes,
        converted.headings.len()
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_html_ready(html_bytes);
    }

    if let Some(ref path) = config.emit_html {
        let document = document_for(&converted, TemplateFlavor::CssPaged, config);
        sink::write_html(path, &document).await?;
        info!("Wrote intermediate HTML to {}", path.display());
    }

    // ── Step 4: Backend chain ────────────────────────────────────────────
    let mut attempts: Vec<AttemptRecord> = Vec::with_capacity(probes.len());
    let mut failures: Vec<BackendError> = Vec::new();

    for (backend, availability) in probes {
        let name = backend.name().to_string();

        if let Availability::Missing { reason } = availability {
            debug!("Skipping {name}: {reason}");
            if let Some(ref cb) = config.progress_callback {
                cb.on_backend_skipped(&name, &reason);
            }
            failures.push(BackendError::Unavailable {
                backend: name.clone(),
                detail: reason.clone(),
            });
            attempts.push(AttemptRecord {
                backend: name,
                outcome: AttemptOutcome::Skipped { reason },
            });
            continue;
        }

        info!("Rendering with {name}");
        if let Some(ref cb) = config.progress_callback {
            cb.on_attempt_start(&name);
        }

        let attempt_start = Instant::now();
        let document = document_for(&converted, backend.flavor(), config);
        let staged = sink::stage(output)?;

        match render_attempt(backend, document, staged.path().to_path_buf(), config.layout.clone()).await {
            Ok(pdf_bytes) => {
                staged.persist()?;
                let duration_ms = attempt_start.elapsed().as_millis() as u64;
                info!(
                    "PDF generated with {name}: {} ({pdf_bytes} bytes, {duration_ms}ms)",
                    output.display()
                );
                if let Some(ref cb) = config.progress_callback {
                    cb.on_attempt_succeeded(&name, output);
                }
                attempts.push(AttemptRecord {
                    backend: name.clone(),
                    outcome: AttemptOutcome::Succeeded { duration_ms },
                });
                return Ok(ConversionReport {
                    backend: name,
                    output: output.to_path_buf(),
                    html_bytes,
                    pdf_bytes,
                    duration_ms: total_start.elapsed().as_millis() as u64,
                    attempts,
                });
            }
            Err(e) => {
                // `staged` drops here and removes the partial file.
                warn!("{e}");
                if let Some(ref cb) = config.progress_callback {
                    cb.on_attempt_failed(&name, &e.to_string());
                }
                attempts.push(AttemptRecord {
                    backend: name,
                    outcome: AttemptOutcome::Failed { error: e.clone() },
                });
                failures.push(e);
            }
        }
    }

    Err(Md2PdfError::AllBackendsExhausted { attempts: failures })
}

/// Run one backend off the async runtime and validate what it wrote.
///
/// A panic inside the backend is reported as that backend's failure so the
/// chain can move on.
async fn render_attempt(
    backend: Arc<dyn PdfBackend>,
    document: String,
    target: PathBuf,
    layout: PageLayout,
) -> Result<u64, BackendError> {
    let name = backend.name().to_string();
    tokio::task::spawn_blocking(move || {
        backend.render(&document, &target, &layout)?;
        sink::validate_pdf(&target, backend.name())
    })
    .await
    .unwrap_or_else(|join_err| {
        Err(BackendError::Failed {
            backend: name,
            status: "panicked".to_string(),
            stderr: join_err.to_string(),
        })
    })
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionReport, Md2PdfError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Md2PdfError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(input, output, config))
}
