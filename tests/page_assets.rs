mod common;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use common::Project;
use pretty_assertions::assert_eq;
use zenith_ssr::{
    get_page_assets, AssetType, DevServer, ManifestStore, PageAsset, PreloadType, SsrConfig,
    SsrError,
};

const ENTRY: &str = "/pages/index.page.client.js";

fn dependencies(project: &Project) -> Vec<PathBuf> {
    vec![
        project.path("pages/index.page.js"),
        project.path("pages/index.page.client.js"),
    ]
}

fn srcs(assets: &[PageAsset]) -> Vec<&str> {
    assets.iter().map(|asset| asset.src.as_str()).collect()
}

struct ModuleGraph;

#[async_trait]
impl DevServer for ModuleGraph {
    async fn transform_index_html(&self, _url: &str, html: String) -> anyhow::Result<String> {
        Ok(html)
    }

    fn direct_imports(&self, file_path: &Path) -> Vec<String> {
        if file_path.ends_with("index.page.js") {
            vec!["/pages/index.css".into(), "/pages/Counter.jsx".into()]
        } else {
            Vec::new()
        }
    }
}

// ============================================================================
// Production
// ============================================================================

#[tokio::test]
async fn production_resolves_hashed_assets_in_priority_order() {
    let project = Project::built();
    let config = SsrConfig::production(project.root());
    let store = ManifestStore::new(project.root());

    let assets = get_page_assets(&config, &store, &dependencies(&project), ENTRY, false)
        .await
        .unwrap();

    assert_eq!(
        srcs(&assets),
        vec![
            "/assets/index.page.1234.css",
            "/assets/index.page.client.e5f6.css",
            "/assets/inter.7777.woff2",
            "/assets/hero.4321.png",
            "/assets/logo.8888.svg",
            "/assets/vendor.c3d4.js",
            "/assets/shared.9999.js",
            "/assets/index.page.client.a1b2.js",
        ]
    );

    let scripts: Vec<_> = assets
        .iter()
        .filter(|asset| asset.asset_type == AssetType::Script)
        .collect();
    assert_eq!(scripts.len(), 1);
    assert_eq!(scripts[0].src, "/assets/index.page.client.a1b2.js");
    assert_eq!(
        scripts[0].media_type.as_ref().map(|m| m.as_str()),
        Some("text/javascript")
    );
}

#[tokio::test]
async fn production_never_preloads_dynamic_imports_or_server_chunks() {
    let project = Project::built();
    let config = SsrConfig::production(project.root());
    let store = ManifestStore::new(project.root());

    let assets = get_page_assets(&config, &store, &dependencies(&project), ENTRY, false)
        .await
        .unwrap();

    assert!(!assets.iter().any(|a| a.src.contains("lazy")));
    assert!(!assets.iter().any(|a| a.src.contains("react.5555")));
    assert!(!assets.iter().any(|a| a.src == "/pages/index.page.js"));
}

#[tokio::test]
async fn overlapping_dependencies_produce_each_src_once() {
    let project = Project::built();
    let config = SsrConfig::production(project.root());
    let store = ManifestStore::new(project.root());

    let mut deps = dependencies(&project);
    deps.extend(dependencies(&project));

    let assets = get_page_assets(&config, &store, &deps, ENTRY, false)
        .await
        .unwrap();
    let mut all = srcs(&assets);
    let before = all.len();
    all.sort();
    all.dedup();
    assert_eq!(all.len(), before);
}

#[tokio::test]
async fn base_url_prefixes_every_asset() {
    let project = Project::built();
    let config = SsrConfig::production(project.root())
        .with_base_url("/shop/")
        .unwrap();
    let store = ManifestStore::new(project.root());

    let assets = get_page_assets(&config, &store, &dependencies(&project), ENTRY, false)
        .await
        .unwrap();
    assert!(assets.iter().all(|asset| asset.src.starts_with("/shop/assets/")));
}

#[tokio::test]
async fn entry_resolution_matches_manifest_file() {
    let project = Project::new();
    project.write_client_manifest(
        r#"{"pages/index.page.client.js":{"file":"assets/index.a1b2.js","isEntry":true}}"#,
    );
    project.write_server_manifest("{}");
    let config = SsrConfig::production(project.root());
    let store = ManifestStore::new(project.root());

    let assets = get_page_assets(&config, &store, &[], ENTRY, false).await.unwrap();
    assert_eq!(assets, vec![PageAsset::entry_script("/assets/index.a1b2.js")]);
}

#[tokio::test]
async fn entry_chunk_imported_by_another_dependency_is_not_preloaded() {
    let project = Project::new();
    project.write_client_manifest(
        r#"{
            "renderer/_default.page.client.js": {
                "file": "assets/default.d1.js",
                "isEntry": true,
                "imports": ["pages/index.page.client.js"]
            },
            "pages/index.page.client.js": {
                "file": "assets/index.a1.js",
                "isEntry": true,
                "css": ["assets/index.c1.css"]
            }
        }"#,
    );
    project.write_server_manifest("{}");
    let config = SsrConfig::production(project.root());
    let store = ManifestStore::new(project.root());

    let deps = vec![
        project.path("renderer/_default.page.client.js"),
        project.path("pages/index.page.client.js"),
    ];
    let assets = get_page_assets(&config, &store, &deps, ENTRY, false)
        .await
        .unwrap();

    assert_eq!(
        assets,
        vec![
            PageAsset::from_preload_url("/assets/index.c1.css"),
            PageAsset::entry_script("/assets/index.a1.js"),
        ]
    );
}

#[tokio::test]
async fn entry_not_flagged_is_an_invariant_error() {
    let project = Project::new();
    project.write_client_manifest(
        r#"{"pages/index.page.client.js":{"file":"assets/index.a1b2.js"}}"#,
    );
    project.write_server_manifest("{}");
    let config = SsrConfig::production(project.root());
    let store = ManifestStore::new(project.root());

    let err = get_page_assets(&config, &store, &[], ENTRY, false)
        .await
        .unwrap_err();
    assert!(matches!(err, SsrError::Invariant(_)));
}

#[tokio::test]
async fn missing_manifest_in_production_is_a_usage_error() {
    let project = Project::new();
    project.write_client_manifest(common::CLIENT_MANIFEST);
    let config = SsrConfig::production(project.root());
    let store = ManifestStore::new(project.root());

    let err = get_page_assets(&config, &store, &dependencies(&project), ENTRY, false)
        .await
        .unwrap_err();

    assert!(err.is_usage());
    let message = err.to_string();
    assert!(message.contains(&project.client_manifest_path().display().to_string()));
    assert!(message.contains(&project.server_manifest_path().display().to_string()));
    assert!(message.contains("vite build && vite build --ssr"));
    assert!(message.contains("production mode"));
}

#[tokio::test]
async fn relative_dependency_is_an_invariant_error() {
    let project = Project::built();
    let config = SsrConfig::production(project.root());
    let store = ManifestStore::new(project.root());

    let err = get_page_assets(
        &config,
        &store,
        &[PathBuf::from("pages/index.page.js")],
        ENTRY,
        false,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, SsrError::Invariant(_)));
}

// ============================================================================
// Development & pre-render
// ============================================================================

#[tokio::test]
async fn development_uses_raw_entry_and_direct_imports() {
    let project = Project::new();
    let config = SsrConfig::development(project.root(), Arc::new(ModuleGraph));
    let store = ManifestStore::new(project.root());

    let assets = get_page_assets(&config, &store, &dependencies(&project), ENTRY, false)
        .await
        .unwrap();

    assert_eq!(
        assets,
        vec![
            PageAsset {
                src: "/pages/index.css".into(),
                asset_type: AssetType::Style,
                media_type: Some(zenith_ssr::MediaType::new("text/css")),
                preload_type: Some(PreloadType::Style),
            },
            PageAsset {
                src: "/pages/Counter.jsx".into(),
                asset_type: AssetType::Preload,
                media_type: Some(zenith_ssr::MediaType::javascript()),
                preload_type: Some(PreloadType::Script),
            },
            PageAsset::entry_script(ENTRY),
        ]
    );
}

#[tokio::test]
async fn pre_render_requires_manifests_even_in_development() {
    let project = Project::new();
    let config = SsrConfig::development(project.root(), Arc::new(ModuleGraph));
    let store = ManifestStore::new(project.root());

    let err = get_page_assets(&config, &store, &dependencies(&project), ENTRY, true)
        .await
        .unwrap_err();
    assert!(err.is_usage());
    assert!(err.to_string().contains("pre-render"));
}

#[tokio::test]
async fn pre_render_in_development_keeps_raw_entry() {
    let project = Project::built();
    let config = SsrConfig::development(project.root(), Arc::new(ModuleGraph));
    let store = ManifestStore::new(project.root());

    let assets = get_page_assets(&config, &store, &dependencies(&project), ENTRY, true)
        .await
        .unwrap();
    assert_eq!(assets.last().unwrap(), &PageAsset::entry_script(ENTRY));
    assert!(assets.iter().any(|a| a.src == "/assets/index.page.1234.css"));
}
