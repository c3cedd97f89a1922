//! HTML Injector Module
//!
//! Splices markup into an HTML string without parsing it:
//! - document start: after `<head>`, else after `<html>`, else after a
//!   leading doctype line, else prepended
//! - document end: before the last `</body>`, else before the last
//!   `</html>`, else appended
//!
//! Repeated end injections stack in call order: each one lands right before
//! the anchor, after everything injected earlier.

use once_cell::sync::Lazy;
use regex::Regex;

static HEAD_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<head(?:\s[^>]*)?>").expect("valid <head> regex"));
static HTML_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<html(?:\s[^>]*)?>").expect("valid <html> regex"));

const BODY_CLOSE: &str = "</body>";
const HTML_CLOSE: &str = "</html>";

/// Insertion points of a document. Implementations decide how anchors are
/// found; callers only choose between start and end.
pub trait HtmlInjector {
    /// Insert `injection` where the browser discovers it first.
    fn insert_at_document_start(&self, html: &str, injection: &str) -> String;

    /// Insert `injection` at the end of the document body.
    fn insert_at_document_end(&self, html: &str, injection: &str) -> String;
}

/// The regex/string-splice injector.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpliceInjector;

impl HtmlInjector for SpliceInjector {
    fn insert_at_document_start(&self, html: &str, injection: &str) -> String {
        inject_begin(html, injection)
    }

    fn insert_at_document_end(&self, html: &str, injection: &str) -> String {
        inject_end(html, injection)
    }
}

pub fn inject_begin(html: &str, injection: &str) -> String {
    if let Some(result) = inject_at_opening_tag(html, &HEAD_OPEN, injection) {
        return result;
    }
    if let Some(result) = inject_at_opening_tag(html, &HTML_OPEN, injection) {
        return result;
    }

    if starts_with_doctype(html) {
        // Keep the doctype on the first line
        let (first_line, rest) = match html.split_once('\n') {
            Some((first_line, rest)) => (first_line, Some(rest)),
            None => (html, None),
        };
        let mut out = String::with_capacity(html.len() + injection.len() + 2);
        out.push_str(first_line);
        out.push('\n');
        out.push_str(injection);
        if let Some(rest) = rest {
            out.push('\n');
            out.push_str(rest);
        }
        return out;
    }

    format!("{}\n{}", injection, html)
}

pub fn inject_end(html: &str, injection: &str) -> String {
    if let Some(result) = inject_at_closing_tag(html, BODY_CLOSE, injection) {
        return result;
    }
    if let Some(result) = inject_at_closing_tag(html, HTML_CLOSE, injection) {
        return result;
    }
    format!("{}\n{}", html, injection)
}

/// Insert right after the first match of `opening_tag`.
fn inject_at_opening_tag(html: &str, opening_tag: &Regex, injection: &str) -> Option<String> {
    let tag = opening_tag.find(html)?;
    let mut out = String::with_capacity(html.len() + injection.len());
    out.push_str(&html[..tag.end()]);
    out.push_str(injection);
    out.push_str(&html[tag.end()..]);
    Some(out)
}

/// Insert right before the last occurrence of `closing_tag`, ignoring ASCII
/// case like the opening-tag regexes.
fn inject_at_closing_tag(html: &str, closing_tag: &str, injection: &str) -> Option<String> {
    debug_assert!(closing_tag.starts_with("</") && closing_tag.ends_with('>'));
    // ASCII lowercasing keeps byte offsets
    let position = html.to_ascii_lowercase().rfind(closing_tag)?;
    let mut out = String::with_capacity(html.len() + injection.len());
    out.push_str(&html[..position]);
    out.push_str(injection);
    out.push_str(&html[position..]);
    Some(out)
}

fn starts_with_doctype(html: &str) -> bool {
    html.get(..9)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("<!doctype"))
}
