use std::path::PathBuf;
use std::process;

use anyhow::{bail, Context};
use clap::Parser;
use serde::Deserialize;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::info;
use tracing_subscriber::EnvFilter;

use zenith_ssr::page_context::page_client_file_path;
use zenith_ssr::{get_page_assets, inject_assets, ManifestStore, SsrConfig, SsrSettings};

/// Assemble the final HTML document of a server-rendered page.
///
/// Reads `{"html": ..., "pageContext": {...}, "dependencies": [...]}` from
/// stdin and writes the document to stdout. Assets are resolved through the
/// production build manifests under `<root>/dist/`.
#[derive(Debug, Parser)]
#[command(name = "zenith-ssr", version)]
struct Cli {
    /// Project root containing `dist/client` and `dist/server`.
    #[arg(long, conflicts_with = "settings")]
    root: Option<PathBuf>,

    /// Base URL prepended to every asset URL.
    #[arg(long, default_value = "/", conflicts_with = "settings")]
    base_url: String,

    /// JSON settings file (`{"root": ..., "baseUrl": ...}`).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Render as part of the pre-render step.
    #[arg(long)]
    prerender: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RenderInput {
    html: String,
    page_context: serde_json::Value,
    #[serde(default)]
    dependencies: Vec<PathBuf>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("ZENITH_SSR_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(Cli::parse()).await {
        eprintln!("[zenith-ssr] {:#}", err);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli).await?;

    let mut stdin_payload = String::new();
    tokio::io::stdin()
        .read_to_string(&mut stdin_payload)
        .await
        .context("failed to read stdin")?;
    if stdin_payload.trim().is_empty() {
        bail!("stdin payload is empty");
    }

    let RenderInput {
        html,
        mut page_context,
        dependencies,
    } = serde_json::from_str(&stdin_payload).context("invalid input JSON")?;

    let page_client_file_path = page_client_file_path(&page_context)?.to_string();

    let store = ManifestStore::new(&config.root);
    let page_assets = get_page_assets(
        &config,
        &store,
        &dependencies,
        &page_client_file_path,
        cli.prerender,
    )
    .await?;

    let Some(record) = page_context.as_object_mut() else {
        bail!("input.pageContext must be an object");
    };
    record.insert("_pageAssets".into(), serde_json::to_value(&page_assets)?);

    let document = inject_assets(&config, &html, page_context).await?;
    info!(bytes = document.len(), "page assembled");

    let mut stdout = tokio::io::stdout();
    stdout.write_all(document.as_bytes()).await?;
    stdout.flush().await?;
    Ok(())
}

async fn load_config(cli: &Cli) -> anyhow::Result<SsrConfig> {
    let settings = match (&cli.settings, &cli.root) {
        (Some(path), _) => {
            let text = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read settings '{}'", path.display()))?;
            serde_json::from_str::<SsrSettings>(&text)
                .with_context(|| format!("invalid settings '{}'", path.display()))?
        }
        (None, Some(root)) => SsrSettings {
            root: root.clone(),
            base_url: cli.base_url.clone(),
            production: true,
        },
        (None, None) => bail!("required flag missing: --root <dir> or --settings <file>"),
    };
    if !settings.production {
        bail!("development rendering needs a running dev server; use the library API");
    }
    Ok(settings.into_production_config()?)
}
