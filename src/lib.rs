//! # Zenith SSR
//!
//! HTML assembly for server-side rendered pages. Takes the HTML produced by a
//! page's render hook plus the build manifests and returns the document sent
//! to the browser:
//!
//! - stylesheet and preload `<link>` tags as early as possible in `<head>`
//! - the serialized client page context before `</body>`
//! - the page's entry script before `</body>`
//!
//! The crate never parses HTML into a tree. It only locates a handful of
//! anchors (`<head>`, `<html>`, `<!doctype`, `</body>`, `</html>`).
//!
//! ```text
//! render hook → PageContext → get_page_assets (ManifestStore + infer_media_type)
//!             → infer_asset_tag → HtmlInjector → final HTML
//! ```

pub mod assets;
pub mod config;
pub mod html;
pub mod inject;
pub mod manifest;
pub mod media_type;
pub mod page_context;
pub mod preload;
pub mod serialize;
pub mod tags;
pub mod utils;

use std::path::PathBuf;

use thiserror::Error;

pub use assets::{get_page_assets, AssetType, PageAsset};
pub use config::{DevServer, HtmlTransform, RenderMode, SsrConfig, SsrSettings};
pub use html::{HtmlInjector, SpliceInjector};
pub use inject::{inject_assets, inject_assets_internal};
pub use manifest::{LoadedManifests, Manifest, ManifestChunk, ManifestStore};
pub use media_type::{infer_media_type, MediaType, MediaTypeInfo, PreloadType};
pub use page_context::PageContext;
pub use serialize::{uneval, PageValue};
pub use tags::infer_asset_tag;

// ---------------------------------------------------------------------------
// SsrError
// ---------------------------------------------------------------------------

/// Errors raised while assembling a page.
///
/// `Usage` errors are caused by the project setup or by the caller and carry
/// text telling the user what to fix. `Invariant` errors mean the framework
/// itself (or the build it consumes) is inconsistent.
#[derive(Debug, Error)]
pub enum SsrError {
    #[error("[zenith-ssr][Wrong Usage] {0}")]
    Usage(String),

    #[error("[zenith-ssr][Bug] {0}")]
    Invariant(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Build manifest `{}` is not valid JSON: {source}", path.display())]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("HTML transform failed: {0}")]
    Transform(anyhow::Error),
}

impl SsrError {
    pub(crate) fn usage(message: impl Into<String>) -> Self {
        SsrError::Usage(message.into())
    }

    /// Build an invariant error and report it. These indicate a defect, so
    /// they are always logged even if the caller swallows the error.
    pub(crate) fn invariant(message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::error!("zenith-ssr invariant violated: {}", message);
        SsrError::Invariant(message)
    }

    /// Whether the error is fixable by the user (project setup, call site).
    pub fn is_usage(&self) -> bool {
        matches!(self, SsrError::Usage(_))
    }
}

pub type Result<T, E = SsrError> = std::result::Result<T, E>;
