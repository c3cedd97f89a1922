//! Render configuration.
//!
//! Everything the assembly layer needs to know about its environment is
//! carried by an explicit [`SsrConfig`] passed into each entry point:
//! the render mode, the project root and the base URL.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::utils;
use crate::Result;

// ---------------------------------------------------------------------------
// Hooks
// ---------------------------------------------------------------------------

/// The development server, consumed as an opaque hook.
#[async_trait]
pub trait DevServer: Send + Sync {
    /// Apply the dev server's HTML transforms (HMR client, plugin hooks, ...).
    async fn transform_index_html(&self, url: &str, html: String) -> anyhow::Result<String>;

    /// Root-relative URLs the module at `file_path` statically imports, as
    /// known to the dev server's module graph. Only direct imports.
    fn direct_imports(&self, _file_path: &Path) -> Vec<String> {
        Vec::new()
    }
}

/// An HTML transform applied to production documents, in registration order.
#[async_trait]
pub trait HtmlTransform: Send + Sync {
    async fn transform(&self, html: String, url: &str) -> anyhow::Result<String>;
}

// ---------------------------------------------------------------------------
// RenderMode
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub enum RenderMode {
    /// Development: sources are served raw by the dev server.
    Development { dev_server: Arc<dyn DevServer> },
    /// Production: assets are resolved through the build manifests.
    Production {
        html_transforms: Vec<Arc<dyn HtmlTransform>>,
    },
}

impl fmt::Debug for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderMode::Development { .. } => f.write_str("Development"),
            RenderMode::Production { html_transforms } => f
                .debug_struct("Production")
                .field("html_transforms", &html_transforms.len())
                .finish(),
        }
    }
}

// ---------------------------------------------------------------------------
// SsrConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SsrConfig {
    /// Project root. Manifests live under `<root>/dist/`.
    pub root: PathBuf,
    /// Normalized base URL prepended to every emitted asset URL.
    pub base_url: String,
    pub mode: RenderMode,
}

impl SsrConfig {
    pub fn development(root: impl Into<PathBuf>, dev_server: Arc<dyn DevServer>) -> Self {
        Self {
            root: root.into(),
            base_url: "/".into(),
            mode: RenderMode::Development { dev_server },
        }
    }

    pub fn production(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            base_url: "/".into(),
            mode: RenderMode::Production {
                html_transforms: Vec::new(),
            },
        }
    }

    /// Set the base URL. Fails with a usage error unless it starts with `/`
    /// or is an absolute `http(s)://` URL.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        self.base_url = utils::normalize_base_url(base_url)?;
        Ok(self)
    }

    /// Register a production HTML transform. Ignored in development, where
    /// the dev server owns the transform pipeline.
    pub fn with_html_transform(mut self, transform: Arc<dyn HtmlTransform>) -> Self {
        if let RenderMode::Production { html_transforms } = &mut self.mode {
            html_transforms.push(transform);
        }
        self
    }

    pub fn is_production(&self) -> bool {
        matches!(self.mode, RenderMode::Production { .. })
    }
}

// ---------------------------------------------------------------------------
// SsrSettings
// ---------------------------------------------------------------------------

/// Serializable subset of [`SsrConfig`], for settings files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SsrSettings {
    pub root: PathBuf,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_production")]
    pub production: bool,
}

fn default_base_url() -> String {
    "/".into()
}

fn default_production() -> bool {
    true
}

impl SsrSettings {
    /// Build a production config. Development mode needs a live dev server,
    /// which settings files cannot describe.
    pub fn into_production_config(self) -> Result<SsrConfig> {
        SsrConfig::production(self.root).with_base_url(&self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Upper;

    #[async_trait]
    impl HtmlTransform for Upper {
        async fn transform(&self, html: String, _url: &str) -> anyhow::Result<String> {
            Ok(html.to_uppercase())
        }
    }

    struct NoopDevServer;

    #[async_trait]
    impl DevServer for NoopDevServer {
        async fn transform_index_html(&self, _url: &str, html: String) -> anyhow::Result<String> {
            Ok(html)
        }
    }

    #[test]
    fn production_defaults() {
        let config = SsrConfig::production("/project");
        assert!(config.is_production());
        assert_eq!(config.base_url, "/");
        assert_eq!(config.root, PathBuf::from("/project"));
    }

    #[test]
    fn base_url_is_normalized() {
        let config = SsrConfig::production("/project").with_base_url("/app/").unwrap();
        assert_eq!(config.base_url, "/app");
        assert!(SsrConfig::production("/p").with_base_url("app").is_err());
    }

    #[test]
    fn html_transforms_only_register_in_production() {
        let config = SsrConfig::production("/p").with_html_transform(Arc::new(Upper));
        match &config.mode {
            RenderMode::Production { html_transforms } => assert_eq!(html_transforms.len(), 1),
            other => panic!("unexpected mode {:?}", other),
        }

        let dev = SsrConfig::development("/p", Arc::new(NoopDevServer))
            .with_html_transform(Arc::new(Upper));
        assert!(!dev.is_production());
        assert_eq!(format!("{:?}", dev.mode), "Development");
    }

    #[test]
    fn settings_from_json() {
        let settings: SsrSettings =
            serde_json::from_str(r#"{"root":"/project","baseUrl":"/app/"}"#).unwrap();
        assert!(settings.production);
        let config = settings.into_production_config().unwrap();
        assert_eq!(config.base_url, "/app");
    }

    #[test]
    fn settings_reject_unknown_fields() {
        let result = serde_json::from_str::<SsrSettings>(r#"{"root":"/p","mode":"prod"}"#);
        assert!(result.is_err());
    }
}
