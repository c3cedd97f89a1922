//! Build manifest store.
//!
//! The build writes two manifests, one per bundle:
//!
//! - `<root>/dist/client/manifest.json`
//! - `<root>/dist/server/manifest.json`
//!
//! Each maps a module key (root-relative path, no leading slash) to the chunk
//! emitted for it. Manifests are immutable once a production build exists, so
//! the store reads them once and hands out shared references afterwards.

use std::collections::{HashMap, HashSet};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{Result, SsrError};

// ---------------------------------------------------------------------------
// Manifest data
// ---------------------------------------------------------------------------

/// One manifest entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestChunk {
    /// Output file, relative to the bundle's output directory.
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub css: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assets: Vec<String>,
    #[serde(default)]
    pub is_entry: bool,
    #[serde(default)]
    pub is_dynamic_entry: bool,
    /// Keys of statically imported chunks.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,
    /// Keys of dynamically imported chunks. Never preloaded.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dynamic_imports: Vec<String>,
}

/// A parsed build manifest.
#[derive(Debug, Default)]
pub struct Manifest {
    chunks: HashMap<String, ManifestChunk>,
    /// Transitive preload URLs per module key, filled lazily.
    preload_walks: DashMap<String, Arc<Vec<String>>>,
}

impl Manifest {
    pub fn new(chunks: HashMap<String, ManifestChunk>) -> Self {
        Self {
            chunks,
            preload_walks: DashMap::new(),
        }
    }

    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn get(&self, key: &str) -> Option<&ManifestChunk> {
        self.chunks.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.chunks.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Collect every URL that should be preloaded for `key`: its own CSS and
    /// assets, plus, through static imports, each imported chunk's CSS,
    /// assets and (when `include_chunk_files`) output file.
    ///
    /// The result for a key is computed once per manifest.
    pub fn collect_preload_urls(&self, key: &str, include_chunk_files: bool) -> Arc<Vec<String>> {
        let cache_key = format!("{}:{}", include_chunk_files, key);
        if let Some(hit) = self.preload_walks.get(&cache_key) {
            return Arc::clone(hit.value());
        }

        let mut urls = Vec::new();
        let mut seen_urls = HashSet::new();
        let mut visited = HashSet::new();
        self.walk(key, true, include_chunk_files, &mut visited, &mut seen_urls, &mut urls);

        let urls = Arc::new(urls);
        self.preload_walks.insert(cache_key, Arc::clone(&urls));
        urls
    }

    fn walk(
        &self,
        key: &str,
        is_root: bool,
        include_chunk_files: bool,
        visited: &mut HashSet<String>,
        seen_urls: &mut HashSet<String>,
        urls: &mut Vec<String>,
    ) {
        if !visited.insert(key.to_string()) {
            return;
        }
        let Some(chunk) = self.chunks.get(key) else {
            return;
        };

        let mut push = |file: &str| {
            let url = format!("/{}", file.trim_start_matches('/'));
            if seen_urls.insert(url.clone()) {
                urls.push(url);
            }
        };

        // The root chunk is the dependency itself: its script is either the
        // page entry (emitted separately) or a server-only file.
        if !is_root && include_chunk_files {
            push(&chunk.file);
        }
        for css in &chunk.css {
            push(css);
        }
        for asset in &chunk.assets {
            push(asset);
        }

        for import in &chunk.imports {
            self.walk(import, false, include_chunk_files, visited, seen_urls, urls);
        }
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Result of [`ManifestStore::load`].
#[derive(Debug, Clone)]
pub struct LoadedManifests {
    pub client_manifest: Option<Arc<Manifest>>,
    pub server_manifest: Option<Arc<Manifest>>,
    pub client_manifest_path: PathBuf,
    pub server_manifest_path: PathBuf,
}

#[derive(Debug, Default)]
struct Cached {
    client: Option<Arc<Manifest>>,
    server: Option<Arc<Manifest>>,
}

/// Lazily loaded, explicitly replaceable cache of the two build manifests.
///
/// Share it between concurrent renders behind an `Arc`. The first `load`
/// reads from disk; concurrent first loads wait on the same lock, so each
/// manifest file is read at most once until [`ManifestStore::unset`].
#[derive(Debug)]
pub struct ManifestStore {
    client_manifest_path: PathBuf,
    server_manifest_path: PathBuf,
    cached: Mutex<Cached>,
}

impl ManifestStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            client_manifest_path: root.join("dist").join("client").join("manifest.json"),
            server_manifest_path: root.join("dist").join("server").join("manifest.json"),
            cached: Mutex::new(Cached::default()),
        }
    }

    pub fn client_manifest_path(&self) -> &Path {
        &self.client_manifest_path
    }

    pub fn server_manifest_path(&self) -> &Path {
        &self.server_manifest_path
    }

    /// Return both manifests, reading from disk the ones not cached yet.
    ///
    /// A missing file yields `None` and is retried on the next call. Other
    /// I/O errors are returned unchanged; invalid JSON is
    /// [`SsrError::ManifestParse`].
    pub async fn load(&self) -> Result<LoadedManifests> {
        let mut cached = self.cached.lock().await;

        if cached.client.is_none() {
            cached.client = read_manifest(&self.client_manifest_path).await?;
        } else {
            debug!("client manifest served from cache");
        }
        if cached.server.is_none() {
            cached.server = read_manifest(&self.server_manifest_path).await?;
        } else {
            debug!("server manifest served from cache");
        }

        Ok(LoadedManifests {
            client_manifest: cached.client.clone(),
            server_manifest: cached.server.clone(),
            client_manifest_path: self.client_manifest_path.clone(),
            server_manifest_path: self.server_manifest_path.clone(),
        })
    }

    /// Install manifests produced in-process, e.g. by a pre-render step.
    pub async fn set(&self, client_manifest: Manifest, server_manifest: Manifest) {
        let mut cached = self.cached.lock().await;
        cached.client = Some(Arc::new(client_manifest));
        cached.server = Some(Arc::new(server_manifest));
    }

    /// Drop the cached manifests. The next `load` reads from disk again.
    pub async fn unset(&self) {
        let mut cached = self.cached.lock().await;
        *cached = Cached::default();
    }
}

async fn read_manifest(path: &Path) -> Result<Option<Arc<Manifest>>> {
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "build manifest not found");
            return Ok(None);
        }
        Err(err) => return Err(SsrError::Io(err)),
    };

    let manifest = Manifest::from_json_str(&text).map_err(|source| SsrError::ManifestParse {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), entries = manifest.len(), "loaded build manifest");
    Ok(Some(Arc::new(manifest)))
}
