//! Integration tests for the conversion pipeline.
//!
//! Real renderers are replaced by in-process fakes injected through
//! [`BackendRegistry`], so these run everywhere without wkhtmltopdf or
//! WeasyPrint installed. See `tests/e2e.rs` for the real-tool variant.

use edgequake_md2pdf::{
    convert, convert_sync, AttemptOutcome, Availability, BackendError, BackendRegistry,
    ConversionConfig, Md2PdfError, PageLayout, PdfBackend, RenderProgressCallback, TemplateFlavor,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

const SAMPLE: &str = "# Title\n\nSome *text*.\n\n| a | b |\n|---|---|\n| 1 | 2 |\n";

// ── Fake backends ────────────────────────────────────────────────────────────

#[derive(Clone, Copy)]
enum Behaviour {
    /// Writes `%PDF-1.4 <name>`.
    Succeed,
    /// Returns `BackendError::Failed`.
    Fail,
    /// Exits "successfully" but writes HTML instead of a PDF.
    WriteGarbage,
    /// Reports itself as not installed.
    Missing,
    /// Panics inside `render`.
    Panic,
}

struct FakeBackend {
    name: &'static str,
    flavor: TemplateFlavor,
    behaviour: Behaviour,
    calls: AtomicUsize,
    last_html: Mutex<Option<String>>,
}

impl FakeBackend {
    fn new(name: &'static str, flavor: TemplateFlavor, behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            name,
            flavor,
            behaviour,
            calls: AtomicUsize::new(0),
            last_html: Mutex::new(None),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_html(&self) -> Option<String> {
        self.last_html.lock().unwrap().clone()
    }
}

impl PdfBackend for FakeBackend {
    fn name(&self) -> &str {
        self.name
    }

    fn flavor(&self) -> TemplateFlavor {
        self.flavor
    }

    fn install_hint(&self) -> &str {
        match self.name {
            "a" => "install a",
            _ => "install b",
        }
    }

    fn probe(&self) -> Availability {
        match self.behaviour {
            Behaviour::Missing => Availability::Missing {
                reason: "not on PATH".into(),
            },
            _ => Availability::Installed { location: None },
        }
    }

    fn render(&self, html: &str, output: &Path, _layout: &PageLayout) -> Result<(), BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_html.lock().unwrap() = Some(html.to_string());
        match self.behaviour {
            Behaviour::Succeed => {
                std::fs::write(output, format!("%PDF-1.4 {}", self.name)).map_err(|e| {
                    BackendError::Io {
                        backend: self.name.into(),
                        detail: e.to_string(),
                    }
                })
            }
            Behaviour::Fail => {
                // Leave a partial file behind, like a crashed renderer would.
                let _ = std::fs::write(output, b"%PDF-partial");
                Err(BackendError::Failed {
                    backend: self.name.into(),
                    status: "exit status: 1".into(),
                    stderr: "simulated failure".into(),
                })
            }
            Behaviour::WriteGarbage => {
                let _ = std::fs::write(output, b"<html>not a pdf</html>");
                Ok(())
            }
            Behaviour::Missing => unreachable!("a missing backend is never rendered"),
            Behaviour::Panic => panic!("renderer crashed"),
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

struct Workspace {
    _dir: tempfile::TempDir,
    input: PathBuf,
    output: PathBuf,
}

fn workspace(markdown: &str) -> Workspace {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("doc.md");
    std::fs::write(&input, markdown).unwrap();
    let output = dir.path().join("out").join("doc.pdf");
    Workspace {
        input,
        output,
        _dir: dir,
    }
}

fn config_with(a: &Arc<FakeBackend>, b: &Arc<FakeBackend>) -> ConversionConfig {
    let registry = BackendRegistry::new(vec![
        Arc::clone(a) as Arc<dyn PdfBackend>,
        Arc::clone(b) as Arc<dyn PdfBackend>,
    ]);
    ConversionConfig::builder().backends(registry).build().unwrap()
}

fn backend_a(behaviour: Behaviour) -> Arc<FakeBackend> {
    FakeBackend::new("a", TemplateFlavor::OptionsPaged, behaviour)
}

fn backend_b(behaviour: Behaviour) -> Arc<FakeBackend> {
    FakeBackend::new("b", TemplateFlavor::CssPaged, behaviour)
}

fn staging_leftovers(dir: &Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .map(|rd| {
            rd.filter_map(Result::ok)
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .filter(|n| n.starts_with(".md2pdf-"))
                .collect()
        })
        .unwrap_or_default()
}

// ── Fallback chain ───────────────────────────────────────────────────────────

#[tokio::test]
async fn falls_back_to_second_backend_on_failure() {
    let ws = workspace(SAMPLE);
    let a = backend_a(Behaviour::Fail);
    let b = backend_b(Behaviour::Succeed);

    let report = convert(&ws.input, &ws.output, &config_with(&a, &b))
        .await
        .unwrap();

    assert_eq!(report.backend, "b");
    assert_eq!(report.output, ws.output);
    assert_eq!(std::fs::read(&ws.output).unwrap(), b"%PDF-1.4 b");
    assert_eq!((a.calls(), b.calls()), (1, 1));

    assert_eq!(report.attempts.len(), 2);
    assert!(matches!(
        report.attempts[0].outcome,
        AttemptOutcome::Failed {
            error: BackendError::Failed { .. }
        }
    ));
    assert!(matches!(
        report.attempts[1].outcome,
        AttemptOutcome::Succeeded { .. }
    ));
    assert!(staging_leftovers(ws.output.parent().unwrap()).is_empty());
}

#[tokio::test]
async fn first_success_stops_the_chain() {
    let ws = workspace(SAMPLE);
    let a = backend_a(Behaviour::Succeed);
    let b = backend_b(Behaviour::Succeed);

    let report = convert(&ws.input, &ws.output, &config_with(&a, &b))
        .await
        .unwrap();

    assert_eq!(report.backend, "a");
    assert_eq!(b.calls(), 0);
    assert_eq!(report.attempts.len(), 1);
    assert_eq!(report.pdf_bytes, "%PDF-1.4 a".len() as u64);
}

#[tokio::test]
async fn uninstalled_backend_is_skipped_not_invoked() {
    let ws = workspace(SAMPLE);
    let a = backend_a(Behaviour::Missing);
    let b = backend_b(Behaviour::Succeed);

    let report = convert(&ws.input, &ws.output, &config_with(&a, &b))
        .await
        .unwrap();

    assert_eq!(report.backend, "b");
    assert_eq!(a.calls(), 0);
    assert_eq!(
        report.attempts[0].outcome,
        AttemptOutcome::Skipped {
            reason: "not on PATH".into()
        }
    );
}

#[tokio::test]
async fn non_pdf_output_counts_as_failure() {
    let ws = workspace(SAMPLE);
    let a = backend_a(Behaviour::WriteGarbage);
    let b = backend_b(Behaviour::Succeed);

    let report = convert(&ws.input, &ws.output, &config_with(&a, &b))
        .await
        .unwrap();

    assert_eq!(report.backend, "b");
    assert!(matches!(
        report.attempts[0].outcome,
        AttemptOutcome::Failed {
            error: BackendError::InvalidOutput { .. }
        }
    ));
}

#[tokio::test]
async fn panicking_backend_does_not_abort_fallback() {
    let ws = workspace(SAMPLE);
    let a = backend_a(Behaviour::Panic);
    let b = backend_b(Behaviour::Succeed);

    let report = convert(&ws.input, &ws.output, &config_with(&a, &b))
        .await
        .unwrap();
    assert_eq!(report.backend, "b");
}

#[tokio::test]
async fn all_backends_failing_keeps_existing_output() {
    let ws = workspace(SAMPLE);
    std::fs::create_dir_all(ws.output.parent().unwrap()).unwrap();
    std::fs::write(&ws.output, b"%PDF-previous").unwrap();

    let a = backend_a(Behaviour::Fail);
    let b = backend_b(Behaviour::WriteGarbage);
    let err = convert(&ws.input, &ws.output, &config_with(&a, &b))
        .await
        .unwrap_err();

    match err {
        Md2PdfError::AllBackendsExhausted { attempts } => {
            let names: Vec<_> = attempts.iter().map(|e| e.backend()).collect();
            assert_eq!(names, vec!["a", "b"]);
        }
        other => panic!("unexpected: {other}"),
    }
    assert_eq!(std::fs::read(&ws.output).unwrap(), b"%PDF-previous");
    assert!(staging_leftovers(ws.output.parent().unwrap()).is_empty());
}

// ── Fail-fast paths ──────────────────────────────────────────────────────────

#[tokio::test]
async fn no_backend_installed_is_missing_capability() {
    let ws = workspace(SAMPLE);
    let a = backend_a(Behaviour::Missing);
    let b = backend_b(Behaviour::Missing);

    let err = convert(&ws.input, &ws.output, &config_with(&a, &b))
        .await
        .unwrap_err();

    match err {
        Md2PdfError::MissingCapability { missing, guidance } => {
            assert_eq!(missing, vec!["a", "b"]);
            assert!(guidance.contains("install a"));
            assert!(guidance.contains("install b"));
        }
        other => panic!("unexpected: {other}"),
    }
    assert!(!ws.output.exists());
}

#[tokio::test]
async fn missing_source_creates_no_output() {
    let ws = workspace(SAMPLE);
    let a = backend_a(Behaviour::Succeed);
    let b = backend_b(Behaviour::Succeed);
    let missing = ws.input.with_file_name("absent.md");

    let err = convert(&missing, &ws.output, &config_with(&a, &b))
        .await
        .unwrap_err();

    assert!(matches!(err, Md2PdfError::SourceNotFound { .. }), "{err}");
    assert!(!ws.output.exists());
    assert_eq!(a.calls() + b.calls(), 0);
}

// ── HTML handed to the backends ──────────────────────────────────────────────

#[tokio::test]
async fn each_backend_receives_its_flavor() {
    let ws = workspace(SAMPLE);
    let a = backend_a(Behaviour::Fail);
    let b = backend_b(Behaviour::Succeed);
    convert(&ws.input, &ws.output, &config_with(&a, &b))
        .await
        .unwrap();

    let html_a = a.last_html().unwrap();
    let html_b = b.last_html().unwrap();
    assert!(!html_a.contains("@page"));
    assert!(html_b.contains("@page"));

    for html in [&html_a, &html_b] {
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<em>text</em>"));
        assert!(html.contains("<table>"));
        assert!(html.contains("<title>Title</title>"));
    }
}

#[tokio::test]
async fn emit_html_writes_intermediate_document() {
    let ws = workspace("[TOC]\n\n# Intro\n\n```rust\nfn main() {}\n```\n");
    let html_path = ws.output.with_extension("html");
    let a = backend_a(Behaviour::Succeed);
    let b = backend_b(Behaviour::Succeed);
    let config = ConversionConfig {
        emit_html: Some(html_path.clone()),
        ..config_with(&a, &b)
    };

    convert(&ws.input, &ws.output, &config).await.unwrap();

    let html = std::fs::read_to_string(&html_path).unwrap();
    assert!(html.contains("<div class=\"toc\">"));
    assert!(html.contains("<h1 id=\"intro\">Intro</h1>"));
    assert!(html.contains("<pre><code class=\"language-rust\">"));
}

#[tokio::test]
async fn repeated_runs_produce_identical_html() {
    let ws = workspace(SAMPLE);
    let a = backend_a(Behaviour::Succeed);
    let b = backend_b(Behaviour::Succeed);
    let config = config_with(&a, &b);

    convert(&ws.input, &ws.output, &config).await.unwrap();
    let first = a.last_html().unwrap();
    convert(&ws.input, &ws.output, &config).await.unwrap();
    assert_eq!(a.last_html().unwrap(), first);
}

// ── Progress events ──────────────────────────────────────────────────────────

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<String>>,
}

impl RenderProgressCallback for Recorder {
    fn on_html_ready(&self, _html_len: usize) {
        self.events.lock().unwrap().push("html".into());
    }
    fn on_backend_skipped(&self, backend: &str, _reason: &str) {
        self.events.lock().unwrap().push(format!("skip:{backend}"));
    }
    fn on_attempt_start(&self, backend: &str) {
        self.events.lock().unwrap().push(format!("start:{backend}"));
    }
    fn on_attempt_failed(&self, backend: &str, _error: &str) {
        self.events.lock().unwrap().push(format!("fail:{backend}"));
    }
    fn on_attempt_succeeded(&self, backend: &str, _output: &Path) {
        self.events.lock().unwrap().push(format!("ok:{backend}"));
    }
}

#[tokio::test]
async fn progress_events_follow_the_chain() {
    let ws = workspace(SAMPLE);
    let a = backend_a(Behaviour::Fail);
    let b = backend_b(Behaviour::Succeed);
    let recorder = Arc::new(Recorder::default());
    let config = ConversionConfig {
        progress_callback: Some(recorder.clone() as Arc<dyn RenderProgressCallback>),
        ..config_with(&a, &b)
    };

    convert(&ws.input, &ws.output, &config).await.unwrap();

    assert_eq!(
        *recorder.events.lock().unwrap(),
        vec!["html", "start:a", "fail:a", "start:b", "ok:b"]
    );
}

// ── Sync wrapper ─────────────────────────────────────────────────────────────

#[test]
fn convert_sync_runs_without_a_runtime() {
    let ws = workspace(SAMPLE);
    let a = backend_a(Behaviour::Succeed);
    let b = backend_b(Behaviour::Succeed);
    let report = convert_sync(&ws.input, &ws.output, &config_with(&a, &b)).unwrap();
    assert_eq!(report.backend, "a");
    assert!(ws.output.exists());
}
