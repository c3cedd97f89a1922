//! Preload URL collection.
//!
//! With manifests (production, pre-render) every dependency is looked up in
//! the client manifest, then the server manifest, and its static import graph
//! is walked transitively. Without manifests (development) only the direct
//! imports reported by the dev server are known.

use std::collections::HashSet;
use std::path::PathBuf;

use tracing::debug;

use crate::config::{RenderMode, SsrConfig};
use crate::manifest::Manifest;
use crate::utils;

/// Collect the URLs to preload for a page's dependencies.
///
/// URLs are root-relative, without base URL, deduplicated in first-seen
/// order.
pub fn get_preload_urls(
    config: &SsrConfig,
    dependencies: &[PathBuf],
    client_manifest: Option<&Manifest>,
    server_manifest: Option<&Manifest>,
) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut preload_urls = Vec::new();
    let mut push = |url: String| {
        if seen.insert(url.clone()) {
            preload_urls.push(url);
        }
    };

    if client_manifest.is_none() && server_manifest.is_none() {
        if let RenderMode::Development { dev_server } = &config.mode {
            for dependency in dependencies {
                for import in dev_server.direct_imports(dependency) {
                    push(import);
                }
            }
        }
        return preload_urls;
    }

    for dependency in dependencies {
        let key = utils::manifest_key(&config.root, dependency);
        let urls = if let Some(client) = client_manifest.filter(|m| m.contains_key(&key)) {
            client.collect_preload_urls(&key, true)
        } else if let Some(server) = server_manifest.filter(|m| m.contains_key(&key)) {
            // Server chunk files are never served to the browser.
            server.collect_preload_urls(&key, false)
        } else {
            debug!(key = %key, "dependency not found in build manifests");
            continue;
        };
        for url in urls.iter() {
            push(url.clone());
        }
    }

    preload_urls
}
