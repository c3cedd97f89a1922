//! Asset classification by file extension.
//!
//! Maps a file path or URL to the media type used in `type="..."` attributes
//! and, for preloadable assets, the `as="..."` preload destination.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A MIME type such as `text/css` or `font/woff2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaType(String);

impl MediaType {
    pub const JAVASCRIPT: &'static str = "text/javascript";
    pub const CSS: &'static str = "text/css";

    pub fn new(media_type: impl Into<String>) -> Self {
        Self(media_type.into())
    }

    pub fn javascript() -> Self {
        Self::new(Self::JAVASCRIPT)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_javascript(&self) -> bool {
        self.0 == Self::JAVASCRIPT
    }

    pub fn is_css(&self) -> bool {
        self.0 == Self::CSS
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Preload destination, rendered as the `as` attribute of a preload link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreloadType {
    Script,
    Style,
    Font,
    Image,
    Fetch,
    Video,
    Audio,
}

impl PreloadType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PreloadType::Script => "script",
            PreloadType::Style => "style",
            PreloadType::Font => "font",
            PreloadType::Image => "image",
            PreloadType::Fetch => "fetch",
            PreloadType::Video => "video",
            PreloadType::Audio => "audio",
        }
    }
}

impl fmt::Display for PreloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTypeInfo {
    pub media_type: MediaType,
    pub preload_type: PreloadType,
}

/// Infer the media type of an asset from its extension.
///
/// Query strings and fragments are ignored. Returns `None` for unknown
/// extensions; such assets are still preloaded, just without `as`/`type`.
pub fn infer_media_type(url: &str) -> Option<MediaTypeInfo> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let file_name = path.rsplit('/').next().unwrap_or(path);
    let (_, extension) = file_name.rsplit_once('.')?;
    let extension = extension.to_ascii_lowercase();

    let (media_type, preload_type) = match extension.as_str() {
        // Scripts
        "js" | "mjs" | "cjs" | "jsx" | "ts" | "tsx" | "mts" | "cts" | "vue" | "svelte" => {
            (MediaType::JAVASCRIPT, PreloadType::Script)
        }

        // Styles
        "css" | "scss" | "sass" | "less" | "styl" | "stylus" | "pcss" | "postcss" => {
            (MediaType::CSS, PreloadType::Style)
        }

        // Fonts
        "ttf" => ("font/ttf", PreloadType::Font),
        "otf" => ("font/otf", PreloadType::Font),
        "woff" => ("font/woff", PreloadType::Font),
        "woff2" => ("font/woff2", PreloadType::Font),

        // Images
        "png" => ("image/png", PreloadType::Image),
        "jpg" | "jpeg" => ("image/jpeg", PreloadType::Image),
        "gif" => ("image/gif", PreloadType::Image),
        "webp" => ("image/webp", PreloadType::Image),
        "avif" => ("image/avif", PreloadType::Image),
        "svg" => ("image/svg+xml", PreloadType::Image),
        "ico" => ("image/x-icon", PreloadType::Image),
        "bmp" => ("image/bmp", PreloadType::Image),

        // Media
        "mp4" => ("video/mp4", PreloadType::Video),
        "webm" => ("video/webm", PreloadType::Video),
        "mp3" => ("audio/mpeg", PreloadType::Audio),

        "json" => ("application/json", PreloadType::Fetch),

        _ => return None,
    };

    Some(MediaTypeInfo {
        media_type: MediaType::new(media_type),
        preload_type,
    })
}
