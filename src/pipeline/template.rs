//! HTML document assembly: wrap a converted body in the house stylesheet.
//!
//! Two flavors exist because the backends disagree on who owns page
//! geometry. wkhtmltopdf takes page size and margins as command-line options
//! and ignores `@page`; WeasyPrint implements CSS paged media and takes them
//! from `@page`. Apart from that rule the two documents are identical, so
//! both backends produce the same look and the same page inset.

use crate::config::PageLayout;

/// Which stylesheet a backend consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateFlavor {
    /// Page geometry comes from backend options only.
    OptionsPaged,
    /// Page geometry comes from a CSS `@page` rule.
    CssPaged,
}

/// Rules common to both flavors.
const SHARED_CSS: &str = r#"        h1, h2, h3 {
            color: #333;
        }
        code {
            background-color: #f4f4f4;
            padding: 2px 4px;
            border-radius: 3px;
        }
        pre {
            background-color: #f4f4f4;
            padding: 10px;
            border-radius: 5px;
            overflow-x: auto;
        }
        pre code {
            padding: 0;
            background-color: transparent;
        }
        table {
            border-collapse: collapse;
            width: 100%;
        }
        th, td {
            border: 1px solid #ddd;
            padding: 8px;
            text-align: left;
        }
        th {
            background-color: #f2f2f2;
        }
        .toc ul {
            list-style: none;
            padding-left: 1.2em;
        }
"#;

const BODY_CSS: &str = "        body {
            font-family: Arial, sans-serif;
            line-height: 1.6;
        }
";

/// The `@page` rule of the CSS-paged flavor.
fn page_rule(layout: &PageLayout) -> String {
    format!(
        "        @page {{\n\
         \x20           size: {size};\n\
         \x20           margin: {margin};\n\
         \x20       }}\n",
        size = layout.page_size.as_str(),
        margin = layout.margins.to_css(),
    )
}

/// Page-level rules for `flavor`. The options-paged flavor carries no margin
/// of its own: wkhtmltopdf already applies the page margins.
fn page_css(flavor: TemplateFlavor, layout: &PageLayout) -> String {
    match flavor {
        TemplateFlavor::OptionsPaged => BODY_CSS.to_string(),
        TemplateFlavor::CssPaged => format!("{}{BODY_CSS}", page_rule(layout)),
    }
}

/// Wrap `body` in a complete HTML document for the given flavor.
pub fn wrap_document(
    body: &str,
    flavor: TemplateFlavor,
    layout: &PageLayout,
    title: Option<&str>,
) -> String {
    let title = title.map(escape_text).unwrap_or_default();
    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head>\n\
         \x20   <meta charset=\"{charset}\">\n\
         \x20   <title>{title}</title>\n\
         \x20   <style>\n\
         {page}{shared}\
         \x20   </style>\n\
         </head>\n\
         <body>\n\
         {body}\
         </body>\n\
         </html>\n",
        charset = layout.encoding,
        page = page_css(flavor, layout),
        shared = SHARED_CSS,
    )
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
