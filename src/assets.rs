//! Page asset resolution.
//!
//! Turns the modules a page depends on into the list of assets the final
//! document references: stylesheets, preload hints and exactly one entry
//! script, with production URLs taken from the build manifests.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SsrConfig;
use crate::manifest::{LoadedManifests, Manifest, ManifestStore};
use crate::media_type::{infer_media_type, MediaType, PreloadType};
use crate::preload::get_preload_urls;
use crate::utils;
use crate::{Result, SsrError};

/// Build command printed when manifests are missing.
pub const BUILD_COMMAND: &str = "vite build && vite build --ssr";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    Script,
    Style,
    Preload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageAsset {
    /// Final URL: base-prefixed, `/`-separated.
    pub src: String,
    pub asset_type: AssetType,
    pub media_type: Option<MediaType>,
    pub preload_type: Option<PreloadType>,
}

impl PageAsset {
    /// Classify a preload URL. CSS becomes a stylesheet, everything else a
    /// preload hint (typed when the extension is known).
    pub fn from_preload_url(src: impl Into<String>) -> Self {
        let src = src.into();
        let (media_type, preload_type) = match infer_media_type(&src) {
            Some(info) => (Some(info.media_type), Some(info.preload_type)),
            None => (None, None),
        };
        let asset_type = if media_type.as_ref().is_some_and(MediaType::is_css) {
            AssetType::Style
        } else {
            AssetType::Preload
        };
        Self {
            src,
            asset_type,
            media_type,
            preload_type,
        }
    }

    /// The page's entry script.
    pub fn entry_script(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            asset_type: AssetType::Script,
            media_type: Some(MediaType::javascript()),
            preload_type: None,
        }
    }

    /// HTTP push priority: higher loads first.
    pub fn push_priority(&self) -> i32 {
        match (self.asset_type, self.preload_type) {
            // CSS blocks rendering, it comes first
            (AssetType::Style, _) => 0,
            (AssetType::Preload, Some(PreloadType::Style)) => -1,
            // Visual assets
            (AssetType::Preload, Some(PreloadType::Font)) => -2,
            (AssetType::Preload, Some(PreloadType::Image)) => -3,
            // JavaScript last
            (AssetType::Preload, Some(PreloadType::Script)) => -5,
            (AssetType::Script, _) => -6,
            (AssetType::Preload, _) => -4,
        }
    }
}

/// Stable sort, highest push priority first.
pub fn sort_page_assets_for_http_push(page_assets: &mut [PageAsset]) {
    page_assets.sort_by_key(|asset| std::cmp::Reverse(asset.push_priority()));
}

/// Resolve the assets of a page.
///
/// `dependencies` are absolute module paths; `page_client_file_path` is the
/// root-relative path of the page's client entry (`/pages/index.page.client.js`).
/// Manifests are required in production and while pre-rendering.
pub async fn get_page_assets(
    config: &SsrConfig,
    store: &ManifestStore,
    dependencies: &[PathBuf],
    page_client_file_path: &str,
    is_pre_rendering: bool,
) -> Result<Vec<PageAsset>> {
    if let Some(relative) = dependencies.iter().find(|path| !path.is_absolute()) {
        return Err(SsrError::invariant(format!(
            "Dependency path `{}` should be absolute.",
            relative.display()
        )));
    }

    let is_production = config.is_production();
    let manifests = if is_pre_rendering || is_production {
        Some(retrieve_manifests(store, is_pre_rendering).await?)
    } else {
        None
    };
    let (client_manifest, server_manifest) = match &manifests {
        Some((client, server)) => (Some(client.as_ref()), Some(server.as_ref())),
        None => (None, None),
    };

    let script_src = match client_manifest {
        Some(client_manifest) if is_production => {
            resolve_script_src(page_client_file_path, client_manifest)?
        }
        _ => page_client_file_path.to_string(),
    };

    // Another dependency may statically import the entry chunk; it is
    // loaded by the entry script, never preloaded.
    let preload_urls = get_preload_urls(config, dependencies, client_manifest, server_manifest);
    let mut page_assets: Vec<PageAsset> = preload_urls
        .into_iter()
        .filter(|url| *url != script_src)
        .map(PageAsset::from_preload_url)
        .collect();
    page_assets.push(PageAsset::entry_script(script_src));

    for asset in &mut page_assets {
        asset.src = utils::prepend_base_url(&config.base_url, &utils::normalize_path(&asset.src));
    }

    sort_page_assets_for_http_push(&mut page_assets);

    debug!(
        count = page_assets.len(),
        entry = page_client_file_path,
        "resolved page assets"
    );
    Ok(page_assets)
}

/// Load both manifests or explain how to produce them.
async fn retrieve_manifests(
    store: &ManifestStore,
    is_pre_rendering: bool,
) -> Result<(std::sync::Arc<Manifest>, std::sync::Arc<Manifest>)> {
    let LoadedManifests {
        client_manifest,
        server_manifest,
        client_manifest_path,
        server_manifest_path,
    } = store.load().await?;

    match (client_manifest, server_manifest) {
        (Some(client), Some(server)) => Ok((client, server)),
        _ => {
            let user_operation = if is_pre_rendering {
                "running the pre-render step"
            } else {
                "running the server in production mode"
            };
            Err(SsrError::usage(format!(
                "You are {} but you didn't build your app yet: make sure to run `$ {}` before. \
                 (Following build manifest is missing: `{}` and/or `{}`.)",
                user_operation,
                BUILD_COMMAND,
                client_manifest_path.display(),
                server_manifest_path.display()
            )))
        }
    }
}

/// Map the client entry path to its hashed output file.
pub fn resolve_script_src(file_path: &str, client_manifest: &Manifest) -> Result<String> {
    let Some(manifest_key) = file_path.strip_prefix('/') else {
        return Err(SsrError::invariant(format!(
            "Client entry `{}` should be root-relative (start with `/`).",
            file_path
        )));
    };
    let Some(chunk) = client_manifest.get(manifest_key) else {
        return Err(SsrError::invariant(format!(
            "Client entry `{}` is missing in the client build manifest.",
            manifest_key
        )));
    };
    if !chunk.is_entry {
        return Err(SsrError::invariant(format!(
            "Client entry `{}` is not marked `isEntry` in the client build manifest.",
            manifest_key
        )));
    }
    Ok(format!("/{}", chunk.file.trim_start_matches('/')))
}
