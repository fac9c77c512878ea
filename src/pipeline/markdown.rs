//! Markdown → HTML body conversion.
//!
//! Parsing and HTML serialisation are delegated to `pulldown-cmark` with
//! GFM tables enabled (fenced code blocks are core CommonMark). On top of the
//! parser's event stream this module implements the table-of-contents
//! extension:
//!
//! 1. Collect every heading's plain text.
//! 2. Assign slug ids (`"Visão Geral"` → `visao-geral`, duplicates get
//!    `_1`, `_2`, …) when anchors are enabled.
//! 3. Re-emit the events with ids attached, replacing any paragraph that
//!    consists solely of `[TOC]` with a nested `<div class="toc">` list.
//!
//! The whole pass is a pure function of its input, so the same Markdown
//! always yields byte-identical HTML.

use crate::config::HeadingAnchors;
use once_cell::sync::Lazy;
use pulldown_cmark::{html, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use regex::Regex;
use std::collections::HashSet;

/// Marker paragraph replaced by the table of contents.
pub const TOC_MARKER: &str = "[TOC]";

/// A heading found in the document, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// 1–6.
    pub level: u8,
    /// Concatenated text and inline-code content.
    pub text: String,
    /// Slug id, when anchors are enabled.
    pub id: Option<String>,
}

/// Converted HTML body plus the headings it contains.
#[derive(Debug, Clone)]
pub struct MarkdownOutput {
    pub body: String,
    pub headings: Vec<Heading>,
}

impl MarkdownOutput {
    /// Text of the first level-1 heading, if any.
    pub fn first_title(&self) -> Option<&str> {
        self.headings
            .iter()
            .find(|h| h.level == 1)
            .map(|h| h.text.as_str())
    }
}

fn parser_options() -> Options {
    Options::ENABLE_TABLES
}

/// Convert `markdown` to an HTML fragment (no `<html>`/`<body>` wrapper).
pub fn markdown_to_html(markdown: &str, anchors: HeadingAnchors) -> MarkdownOutput {
    let events: Vec<Event<'_>> = Parser::new_ext(markdown, parser_options()).collect();

    let has_toc = (0..events.len()).any(|i| toc_paragraph_end(&events, i).is_some());
    let with_ids = match anchors {
        HeadingAnchors::Always => true,
        HeadingAnchors::Never => false,
        HeadingAnchors::Auto => has_toc,
    };

    let mut headings = collect_headings(&events);
    if with_ids {
        let mut used = HashSet::new();
        for h in &mut headings {
            h.id = Some(unique_slug(&h.text, &mut used));
        }
    }

    let rewritten = rewrite_events(events, &headings);

    let mut body = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut body, rewritten.into_iter());

    MarkdownOutput { body, headings }
}

// ── Pass 1: headings ─────────────────────────────────────────────────────────

fn collect_headings(events: &[Event<'_>]) -> Vec<Heading> {
    let mut headings = Vec::new();
    let mut current: Option<(u8, String)> = None;

    for event in events {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                current = Some((level_number(*level), String::new()));
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, text)) = current.take() {
                    headings.push(Heading {
                        level,
                        text: text.trim().to_string(),
                        id: None,
                    });
                }
            }
            Event::Text(t) | Event::Code(t) => {
                if let Some((_, buf)) = current.as_mut() {
                    buf.push_str(t);
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if let Some((_, buf)) = current.as_mut() {
                    buf.push(' ');
                }
            }
            _ => {}
        }
    }

    headings
}

fn level_number(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

// ── Pass 2: rewrite ──────────────────────────────────────────────────────────

fn rewrite_events<'a>(events: Vec<Event<'a>>, headings: &[Heading]) -> Vec<Event<'a>> {
    let mut out = Vec::with_capacity(events.len());
    let mut next_heading = headings.iter();
    let mut i = 0;

    while i < events.len() {
        if let Some(end) = toc_paragraph_end(&events, i) {
            out.push(Event::Html(CowStr::from(render_toc(headings))));
            i = end + 1;
            continue;
        }

        match &events[i] {
            Event::Start(Tag::Heading {
                level,
                id,
                classes,
                attrs,
            }) => {
                let slug = next_heading.next().and_then(|h| h.id.clone());
                out.push(Event::Start(Tag::Heading {
                    level: *level,
                    id: slug.map(CowStr::from).or_else(|| id.clone()),
                    classes: classes.clone(),
                    attrs: attrs.clone(),
                }));
            }
            other => out.push(other.clone()),
        }
        i += 1;
    }

    out
}

/// If `events[start]` opens a paragraph whose only content is the TOC
/// marker, return the index of the matching paragraph end.
fn toc_paragraph_end(events: &[Event<'_>], start: usize) -> Option<usize> {
    if !matches!(events.get(start), Some(Event::Start(Tag::Paragraph))) {
        return None;
    }

    let mut text = String::new();
    for (offset, event) in events[start + 1..].iter().enumerate() {
        match event {
            Event::Text(t) => text.push_str(t),
            Event::End(TagEnd::Paragraph) => {
                return (text.trim() == TOC_MARKER).then_some(start + 1 + offset);
            }
            _ => return None,
        }
    }
    None
}

fn render_toc(headings: &[Heading]) -> String {
    let mut out = String::from("<div class=\"toc\">\n");
    // Number of currently open <ul> elements.
    let mut open = 0usize;

    for (h, depth) in headings.iter().zip(toc_depths(headings)) {
        if open == 0 {
            out.push_str("<ul>\n");
            open = 1;
        } else if depth >= open {
            out.push_str("\n<ul>\n");
            open += 1;
        } else {
            out.push_str("</li>\n");
            while open > depth + 1 {
                open -= 1;
                out.push_str("</ul>\n</li>\n");
            }
        }

        let text = escape_html(&h.text);
        match &h.id {
            Some(id) => out.push_str(&format!("<li><a href=\"#{id}\">{text}</a>")),
            None => out.push_str(&format!("<li>{text}")),
        }
    }

    for _ in 0..open {
        out.push_str("</li>\n</ul>\n");
    }
    if headings.is_empty() {
        out.push_str("<ul></ul>\n");
    }
    out.push_str("</div>\n");
    out
}

/// Nesting depth of each heading in the TOC (0 = top level).
///
/// A heading nests under the closest preceding heading of a lower level, so
/// skipped levels (`#` then `###`) add one step of depth, not two, and a
/// later `##` lands beside the `###` rather than back at the top.
fn toc_depths(headings: &[Heading]) -> Vec<usize> {
    let mut depths = Vec::with_capacity(headings.len());
    let mut iter = headings.iter();
    let Some(first) = iter.next() else {
        return depths;
    };

    // `levels` holds the level of each open list, `parents` the level of the
    // heading owning each nested list.
    let mut levels = vec![first.level];
    let mut parents: Vec<u8> = Vec::new();
    let mut last = first.level;
    depths.push(0);

    for h in iter {
        let level = h.level;
        if levels.last().is_some_and(|&top| level < top) {
            levels.pop();
            let to_pop = parents.iter().rev().take_while(|&&p| level <= p).count();
            levels.truncate(levels.len().saturating_sub(to_pop));
            parents.truncate(parents.len() - to_pop);
            levels.push(level);
        }
        if levels.last() != Some(&level) {
            parents.push(last);
            levels.push(level);
        }
        depths.push(parents.len());
        last = level;
    }

    depths
}

// ── Slugs ────────────────────────────────────────────────────────────────────

static RE_NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s-]").unwrap());
static RE_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-\s]+").unwrap());
static RE_COUNTED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.*)_([0-9]+)$").unwrap());

/// Fold `text` to ASCII: accented letters lose their marks, anything that
/// does not reduce to a single ASCII letter or digit is dropped.
fn fold_ascii(text: &str) -> String {
    text.chars()
        .filter_map(|c| {
            if c.is_ascii() {
                return Some(c);
            }
            let folded = deunicode::deunicode_char(c)?;
            let mut chars = folded.chars();
            match (chars.next(), chars.next()) {
                (Some(f), None) if f.is_ascii_alphanumeric() => Some(f),
                _ => None,
            }
        })
        .collect()
}

/// ASCII-fold, lowercase, drop punctuation, join words with `-`.
pub fn slugify(text: &str) -> String {
    let lowered = fold_ascii(text).to_lowercase();
    let cleaned = RE_NON_WORD.replace_all(&lowered, "");
    RE_SEPARATORS
        .replace_all(cleaned.trim(), "-")
        .into_owned()
}

/// Slug of `text` that is not yet in `used`; records the result.
fn unique_slug(text: &str, used: &mut HashSet<String>) -> String {
    let mut id = slugify(text);
    while id.is_empty() || used.contains(&id) {
        let bumped = RE_COUNTED.captures(&id).and_then(|caps| {
            let n = caps[2].parse::<u64>().ok()?.checked_add(1)?;
            Some(format!("{}_{}", &caps[1], n))
        });
        id = bumped.unwrap_or_else(|| format!("{id}_1"));
    }
    used.insert(id.clone());
    id
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// ── Tests ────────────────────────────────────────────────────────────────────
