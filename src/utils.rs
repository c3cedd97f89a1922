//! Utility functions shared by the resolver, renderer and serializer.
//!
//! - Path and URL normalization (separators, base URL, manifest keys)
//! - JS string escaping (safe inside an inline `<script>`)

use std::path::{Component, Path};

use crate::{Result, SsrError};

// ---------------------------------------------------------------------------
// Paths & URLs
// ---------------------------------------------------------------------------

/// Replace Windows path separators with `/`.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// Normalize a configured base URL.
///
/// Accepts `/`, `/some/prefix/` or an absolute `http(s)://` URL. The result
/// has no trailing slash, except for the root base `/`.
pub fn normalize_base_url(base_url: &str) -> Result<String> {
    let base_url = base_url.trim();
    if base_url.is_empty() {
        return Ok("/".into());
    }
    let is_absolute = base_url.starts_with("http://") || base_url.starts_with("https://");
    if !is_absolute && !base_url.starts_with('/') {
        return Err(SsrError::usage(format!(
            "Base URL `{}` is invalid: it should start with `/` or be an absolute `http(s)://` URL.",
            base_url
        )));
    }
    let trimmed = base_url.trim_end_matches('/');
    if trimmed.is_empty() {
        Ok("/".into())
    } else {
        Ok(trimmed.to_string())
    }
}

/// Prefix a root-relative URL with a normalized base URL.
/// Absolute URLs (`scheme://...`) are returned untouched.
pub fn prepend_base_url(base_url: &str, url: &str) -> String {
    if url.contains("://") || base_url == "/" {
        return url.to_string();
    }
    if url.starts_with('/') {
        format!("{}{}", base_url, url)
    } else {
        format!("{}/{}", base_url, url)
    }
}

/// Derive the manifest key of a module: its path relative to the project
/// root, `/`-separated, without a leading slash.
///
/// Paths outside of `root` keep their full path minus the leading slash,
/// which never matches a manifest entry.
pub fn manifest_key(root: &Path, file_path: &Path) -> String {
    let relative = file_path.strip_prefix(root).unwrap_or(file_path);
    let parts: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect();
    parts.join("/")
}

// ---------------------------------------------------------------------------
// JS String Escaping
// ---------------------------------------------------------------------------

/// Escape a string as a double-quoted JS string literal, quotes included.
///
/// Besides the usual escapes, `<`, `>` and `/` are written as `\u` escapes so
/// the literal can never close the surrounding `<script>` element, and
/// U+2028/U+2029 are escaped because older engines treat them as newlines.
pub fn escape_js_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '<' => out.push_str("\\u003C"),
            '>' => out.push_str("\\u003E"),
            '/' => out.push_str("\\u002F"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Whether `key` can be written as a bare object-literal property name.
pub fn is_js_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c == '_' || c == '$' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c == '$' || c.is_ascii_alphanumeric())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
