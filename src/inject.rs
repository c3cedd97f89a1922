//! Asset injection pipeline.
//!
//! 1. Apply HTML transforms (dev server, or production transforms)
//! 2. Inject the serialized client page context at document end
//! 3. Inject the entry script at document end
//! 4. Inject stylesheet and preload links at document start
//!
//! Steps 2 and 3 both insert right before `</body>`, so the page context
//! script always precedes the entry script.

use tracing::debug;

use crate::assets::{AssetType, PageAsset};
use crate::config::{RenderMode, SsrConfig};
use crate::html::{HtmlInjector, SpliceInjector};
use crate::media_type::PreloadType;
use crate::page_context::PageContext;
use crate::tags::infer_asset_tag;
use crate::{Result, SsrError};

/// Global the client runtime reads the page context from.
pub const PAGE_CONTEXT_GLOBAL: &str = "window.__PAGE_CONTEXT__";

/// Inject assets into the HTML returned by a render hook.
///
/// `page_context` is the raw record the render hook received; it is
/// validated here and every problem is reported as a usage error.
pub async fn inject_assets(
    config: &SsrConfig,
    html: &str,
    page_context: serde_json::Value,
) -> Result<String> {
    if html.is_empty() {
        return Err(SsrError::usage(
            "[html.injectAssets(htmlString, pageContext)]: Argument `htmlString` should be a non-empty string.",
        ));
    }
    let page_context = PageContext::from_json(page_context)?;
    inject_assets_internal(config, &SpliceInjector, html.to_string(), &page_context).await
}

/// Inject assets for an already validated page context.
pub async fn inject_assets_internal(
    config: &SsrConfig,
    injector: &impl HtmlInjector,
    html: String,
    page_context: &PageContext,
) -> Result<String> {
    let mut html = apply_html_transforms(config, html, &page_context.url_normalized).await?;

    // Client page context
    let serialized = page_context.serialize_client()?;
    let state_script = format!("<script>{} = {}</script>", PAGE_CONTEXT_GLOBAL, serialized);
    html = injector.insert_at_document_end(&html, &state_script);

    // Entry script
    let scripts: Vec<&PageAsset> = page_context
        .page_assets
        .iter()
        .filter(|asset| asset.asset_type == AssetType::Script)
        .collect();
    let [script] = scripts.as_slice() else {
        return Err(SsrError::invariant(format!(
            "Page `{}` should have exactly one entry script, found {}.",
            page_context.page_id,
            scripts.len()
        )));
    };
    html = injector.insert_at_document_end(&html, &infer_asset_tag(script, true)?);

    // Stylesheets and preload hints
    let link_tags = page_context
        .page_assets
        .iter()
        .filter(|asset| matches!(asset.asset_type, AssetType::Preload | AssetType::Style))
        .map(|asset| {
            let is_es_module = asset.preload_type == Some(PreloadType::Script);
            infer_asset_tag(asset, is_es_module)
        })
        .collect::<Result<Vec<_>>>()?;
    if !link_tags.is_empty() {
        html = injector.insert_at_document_start(&html, &link_tags.concat());
    }

    debug!(
        page_id = %page_context.page_id,
        links = link_tags.len(),
        "injected page assets"
    );
    Ok(html)
}

async fn apply_html_transforms(config: &SsrConfig, html: String, url: &str) -> Result<String> {
    match &config.mode {
        RenderMode::Development { dev_server } => dev_server
            .transform_index_html(url, html)
            .await
            .map_err(SsrError::Transform),
        RenderMode::Production { html_transforms } => {
            let mut html = html;
            for transform in html_transforms {
                html = transform
                    .transform(html, url)
                    .await
                    .map_err(SsrError::Transform)?;
            }
            Ok(html)
        }
    }
}
