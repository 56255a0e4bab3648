//! Fallback rendering of the structured fields into an HTML fragment.
//!
//! Callers with their own templating supply `renderedMarkup` directly; the
//! store never parses it.

use crate::Feature;
use std::fmt::Write;

/// Escapes the five HTML-significant characters.
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders title, subtitle, paragraphs and features as a content fragment.
#[must_use]
pub fn render_markup(title: &str, subtitle: &str, body: &[String], features: &[Feature]) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write!(out, "<h1>{}</h1>", escape_html(title));
    if !subtitle.is_empty() {
        let _ = write!(out, "<h2>{}</h2>", escape_html(subtitle));
    }
    for paragraph in body {
        let _ = write!(out, "<p>{}</p>", escape_html(paragraph));
    }
    if !features.is_empty() {
        out.push_str("<ul class=\"features\">");
        for feature in features {
            let _ = write!(
                out,
                "<li><h3>{}</h3><p>{}</p></li>",
                escape_html(&feature.title),
                escape_html(&feature.description)
            );
        }
        out.push_str("</ul>");
    }
    out
}
