//! HTML tags for page assets.

use crate::assets::{AssetType, PageAsset};
use crate::media_type::PreloadType;
use crate::{Result, SsrError};

/// Render the tag that loads (or preloads) `page_asset`.
///
/// `is_es_module` selects `type="module"` scripts and `modulepreload` hints;
/// it is only meaningful for scripts and script preloads.
pub fn infer_asset_tag(page_asset: &PageAsset, is_es_module: bool) -> Result<String> {
    let PageAsset {
        src,
        asset_type,
        media_type,
        preload_type,
    } = page_asset;

    if is_es_module
        && *asset_type != AssetType::Script
        && *preload_type != Some(PreloadType::Script)
    {
        return Err(SsrError::invariant(format!(
            "Asset `{}` cannot be loaded as an ES module.",
            src
        )));
    }

    let is_javascript = media_type.as_ref().is_some_and(|m| m.is_javascript());

    match asset_type {
        AssetType::Script => {
            if !is_javascript {
                return Err(SsrError::invariant(format!(
                    "Script `{}` should have media type `text/javascript`.",
                    src
                )));
            }
            if is_es_module {
                Ok(format!(r#"<script type="module" src="{}"></script>"#, src))
            } else {
                Ok(format!(r#"<script src="{}"></script>"#, src))
            }
        }
        AssetType::Style => Ok(format!(
            r#"<link rel="stylesheet" type="text/css" href="{}">"#,
            src
        )),
        AssetType::Preload => match preload_type {
            Some(PreloadType::Font) => {
                let media_type = media_type.as_ref().ok_or_else(|| {
                    SsrError::invariant(format!("Font `{}` has no media type.", src))
                })?;
                // Fonts are always fetched in CORS mode, the preload must match
                Ok(format!(
                    r#"<link rel="preload" as="font" crossorigin type="{}" href="{}">"#,
                    media_type, src
                ))
            }
            Some(PreloadType::Script) => {
                if !is_javascript {
                    return Err(SsrError::invariant(format!(
                        "Script preload `{}` should have media type `text/javascript`.",
                        src
                    )));
                }
                let rel = if is_es_module { "modulepreload" } else { "preload" };
                Ok(format!(
                    r#"<link rel="{}" as="script" type="text/javascript" href="{}">"#,
                    rel, src
                ))
            }
            _ => {
                let attribute_as = preload_type
                    .map(|p| format!(r#" as="{}""#, p))
                    .unwrap_or_default();
                let attribute_type = media_type
                    .as_ref()
                    .map(|m| format!(r#" type="{}""#, m))
                    .unwrap_or_default();
                Ok(format!(
                    r#"<link rel="preload" href="{}"{}{}>"#,
                    src, attribute_as, attribute_type
                ))
            }
        },
    }
}
