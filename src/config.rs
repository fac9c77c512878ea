//! Configuration types for Markdown-to-PDF conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Paths are not part of the config:
//! they are passed to [`crate::convert::convert`] directly, with
//! [`DEFAULT_INPUT`] / [`default_output_for`] as the fallbacks the CLI uses
//! when none are given.

use crate::backend::BackendRegistry;
use crate::error::Md2PdfError;
use crate::progress::ProgressCallback;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Source document converted when no input path is supplied.
pub const DEFAULT_INPUT: &str = "docs/Proposta_Arquitetura_TOTVS_HubIntegracao.md";

/// Margin applied to all four page edges by default.
pub const DEFAULT_MARGIN: &str = "2.5cm";

/// Output path derived from the input: same base name, `.pdf` extension.
pub fn default_output_for(input: &Path) -> PathBuf {
    input.with_extension("pdf")
}

/// Configuration for a Markdown-to-PDF conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_md2pdf::{ConversionConfig, PageSize};
///
/// let config = ConversionConfig::builder()
///     .page_size(PageSize::Letter)
///     .margin("2cm")
///     .title("Architecture proposal")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Page size, margins, encoding and outline flag handed to the backend.
    pub layout: PageLayout,

    /// When headings receive `id` anchors. Default: [`HeadingAnchors::Auto`].
    pub anchors: HeadingAnchors,

    /// Document `<title>`. If None, the first level-1 heading is used.
    pub title: Option<String>,

    /// Which backend(s) to try, in which order. Default: [`BackendChoice::Auto`].
    pub backend: BackendChoice,

    /// Pre-constructed backend registry. Takes precedence over `backend`.
    pub backends: Option<BackendRegistry>,

    /// Also write the intermediate HTML document to this path.
    pub emit_html: Option<PathBuf>,

    /// Optional per-attempt progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            layout: PageLayout::default(),
            anchors: HeadingAnchors::default(),
            title: None,
            backend: BackendChoice::default(),
            backends: None,
            emit_html: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("layout", &self.layout)
            .field("anchors", &self.anchors)
            .field("title", &self.title)
            .field("backend", &self.backend)
            .field("backends", &self.backends)
            .field("emit_html", &self.emit_html)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn RenderProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// The registry this config resolves to: the injected one if present,
    /// otherwise the built-in backends selected by `backend`.
    pub fn registry(&self) -> BackendRegistry {
        match &self.backends {
            Some(registry) => registry.clone(),
            None => BackendRegistry::from_choice(self.backend),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn page_size(mut self, size: PageSize) -> Self {
        self.config.layout.page_size = size;
        self
    }

    /// Same margin on all four edges.
    pub fn margin(mut self, margin: impl Into<String>) -> Self {
        self.config.layout.margins = Margins::uniform(margin);
        self
    }

    pub fn margins(mut self, margins: Margins) -> Self {
        self.config.layout.margins = margins;
        self
    }

    pub fn outline(mut self, v: bool) -> Self {
        self.config.layout.outline = v;
        self
    }

    pub fn anchors(mut self, anchors: HeadingAnchors) -> Self {
        self.config.anchors = anchors;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.config.title = Some(title.into());
        self
    }

    pub fn backend(mut self, choice: BackendChoice) -> Self {
        self.config.backend = choice;
        self
    }

    pub fn backends(mut self, registry: BackendRegistry) -> Self {
        self.config.backends = Some(registry);
        self
    }

    pub fn emit_html(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.emit_html = Some(path.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Md2PdfError> {
        self.config.layout.margins.validate()?;
        if let Some(registry) = &self.config.backends {
            if registry.is_empty() {
                return Err(Md2PdfError::InvalidConfig(
                    "Backend registry must contain at least one backend".into(),
                ));
            }
        }
        Ok(self.config)
    }
}

// ── Layout ───────────────────────────────────────────────────────────────

/// Page-layout options passed to the rendering backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLayout {
    /// Paper size. Default: A4.
    pub page_size: PageSize,
    /// Page margins. Default: 2.5cm on every edge.
    pub margins: Margins,
    /// Text encoding declared to the backend. Default: `UTF-8`.
    pub encoding: String,
    /// Emit a PDF outline (bookmarks). Default: false.
    pub outline: bool,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            page_size: PageSize::default(),
            margins: Margins::default(),
            encoding: "UTF-8".to_string(),
            outline: false,
        }
    }
}

static RE_CSS_LENGTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(?:\.\d+)?(?:cm|mm|in|pt|px)$").unwrap());

/// The four page margins as CSS lengths (`2.5cm`, `20mm`, `1in`, …).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Margins {
    pub top: String,
    pub right: String,
    pub bottom: String,
    pub left: String,
}

impl Margins {
    pub fn uniform(margin: impl Into<String>) -> Self {
        let m = margin.into();
        Self {
            top: m.clone(),
            right: m.clone(),
            bottom: m.clone(),
            left: m,
        }
    }

    /// `true` when all four edges share the same value.
    pub fn is_uniform(&self) -> bool {
        self.top == self.right && self.right == self.bottom && self.bottom == self.left
    }

    /// CSS `margin` shorthand, collapsed to one value when uniform.
    pub fn to_css(&self) -> String {
        if self.is_uniform() {
            self.top.clone()
        } else {
            format!("{} {} {} {}", self.top, self.right, self.bottom, self.left)
        }
    }

    fn validate(&self) -> Result<(), Md2PdfError> {
        for (edge, value) in [
            ("top", &self.top),
            ("right", &self.right),
            ("bottom", &self.bottom),
            ("left", &self.left),
        ] {
            if !RE_CSS_LENGTH.is_match(value) {
                return Err(Md2PdfError::InvalidConfig(format!(
                    "{edge} margin must be a length like 2.5cm, 20mm or 1in, got '{value}'"
                )));
            }
        }
        Ok(())
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self::uniform(DEFAULT_MARGIN)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Paper sizes understood by both wkhtmltopdf and CSS `@page`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageSize {
    A3,
    #[default]
    A4,
    A5,
    Letter,
    Legal,
}

impl PageSize {
    /// Name as accepted by `wkhtmltopdf --page-size` and CSS `size:`.
    pub fn as_str(&self) -> &'static str {
        match self {
            PageSize::A3 => "A3",
            PageSize::A4 => "A4",
            PageSize::A5 => "A5",
            PageSize::Letter => "Letter",
            PageSize::Legal => "Legal",
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When to give headings `id` attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HeadingAnchors {
    /// Only when the document contains a `[TOC]` marker. (default)
    #[default]
    Auto,
    /// Every heading gets an id.
    Always,
    /// No heading ids; a `[TOC]` marker renders as an unlinked list.
    Never,
}

/// Which rendering backend(s) to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BackendChoice {
    /// wkhtmltopdf first, WeasyPrint as fallback. (default)
    #[default]
    Auto,
    /// wkhtmltopdf only.
    Wkhtmltopdf,
    /// WeasyPrint only.
    WeasyPrint,
}
