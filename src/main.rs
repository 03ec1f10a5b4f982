mod config;
mod script;
mod services;
mod session;
mod store;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use designer::DesignerError;
use designer::doc::Layout;
use designer::export;
use serde_json::{Value, json};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::config::Config;
use crate::script::{ScriptError, parse_script};
use crate::services::persistence::Synchronizer;
use crate::session::Session;
use crate::store::{HttpStore, LayoutStore, MemoryStore, StoreError};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("cannot read {}: {source}", path.display())]
    Read { path: PathBuf, source: std::io::Error },
    #[error("cannot write {}: {source}", path.display())]
    Write { path: PathBuf, source: std::io::Error },
    #[error("no layout to edit; pass --layout or configure a store and layout id")]
    MissingLayout,
    #[error("a store URL needs a layout id; pass --layout-id or set SEATPLAN_LAYOUT_ID")]
    MissingLayoutId,
    #[error(transparent)]
    Designer(#[from] DesignerError),
    #[error(transparent)]
    Script(#[from] ScriptError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "seatplan", about = "Seating chart layout designer")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a scripted editing session against a layout.
    Replay(ReplayArgs),
    /// Render a layout file as SVG.
    Export(ExportArgs),
}

#[derive(Args, Debug)]
struct ReplayArgs {
    /// Layout JSON to start from. Fetched from the store when omitted.
    #[arg(long)]
    layout: Option<PathBuf>,

    /// JSON-lines input events.
    #[arg(long)]
    script: PathBuf,

    /// Write the resulting layout as JSON.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Write the resulting layout as SVG.
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Persist into an in-memory store instead of the configured one.
    #[arg(long)]
    offline: bool,

    #[arg(long, env = "SEATPLAN_STORE_URL")]
    store_url: Option<String>,

    #[arg(long, env = "SEATPLAN_LAYOUT_ID")]
    layout_id: Option<Uuid>,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[arg(long)]
    layout: PathBuf,

    #[arg(long)]
    svg: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();
    match cli.command {
        Command::Replay(args) => run_replay(&config, args).await,
        Command::Export(args) => run_export(&args).await,
    }
}

async fn run_replay(config: &Config, args: ReplayArgs) -> Result<(), CliError> {
    let file_layout = match &args.layout {
        Some(path) => Some(read_layout(path).await?),
        None => None,
    };
    let store_url = args.store_url.or_else(|| config.store_url.clone());
    let layout_id = args.layout_id.or(config.layout_id);

    let mut offline_store = None;
    let (layout, sync) = if args.offline {
        let layout = file_layout.ok_or(CliError::MissingLayout)?;
        let id = layout_id.unwrap_or_else(Uuid::new_v4);
        info!(layout_id = %id, "offline session with in-memory store");
        let store = Arc::new(MemoryStore::with_layout(id, layout.clone()));
        offline_store = Some((store.clone(), id));
        (layout, Synchronizer::new(store, id))
    } else if let Some(url) = store_url {
        let id = layout_id.ok_or(CliError::MissingLayoutId)?;
        let store = Arc::new(HttpStore::new(&url, config.request_timeout_secs)?);
        let layout = match file_layout {
            Some(layout) => layout,
            None => store.fetch_layout(id).await?,
        };
        info!(store_url = %url, layout_id = %id, "autosave enabled");
        (layout, Synchronizer::new(store, id))
    } else {
        let layout = file_layout.ok_or(CliError::MissingLayout)?;
        (layout, Synchronizer::local_only())
    };
    if sync.is_local_only() {
        info!("no store configured; autosave disabled");
    }

    let events = parse_script(&read_text(&args.script).await?)?;
    info!(events = events.len(), sections = layout.sections.len(), seats = layout.seat_count(), "replay starting");

    let mut session = Session::new(layout, config.draw_settings(), sync);
    for event in &events {
        session.handle(event)?;
        session.pump();
    }
    session.settle().await;

    if let Some((store, id)) = offline_store {
        if store.snapshot(id).await.as_ref() != Some(session.layout()) {
            warn!(layout_id = %id, "stored copy diverged from the local layout");
        }
    }

    if let Some(path) = &args.out {
        write_text(path, &export::to_json(session.layout())?).await?;
    }
    if let Some(path) = &args.svg {
        write_text(path, &export::to_svg(session.layout())).await?;
    }

    let layout = session.layout();
    let notices: Vec<Value> =
        session.notices().iter().map(|n| json!({ "kind": format!("{:?}", n.kind), "message": n.message })).collect();
    print_json(&json!({
        "events": events.len(),
        "sections": layout.sections.len(),
        "rows": layout.row_count(),
        "seats": layout.seat_count(),
        "configured_sections": session.configure_requests().len(),
        "notices": notices,
    }))
}

async fn run_export(args: &ExportArgs) -> Result<(), CliError> {
    let layout = read_layout(&args.layout).await?;
    write_text(&args.svg, &export::to_svg(&layout)).await?;
    info!(path = %args.svg.display(), sections = layout.sections.len(), "svg written");
    Ok(())
}

async fn read_text(path: &Path) -> Result<String, CliError> {
    tokio::fs::read_to_string(path).await.map_err(|source| CliError::Read { path: path.to_path_buf(), source })
}

async fn write_text(path: &Path, text: &str) -> Result<(), CliError> {
    tokio::fs::write(path, text).await.map_err(|source| CliError::Write { path: path.to_path_buf(), source })
}

async fn read_layout(path: &Path) -> Result<Layout, CliError> {
    Ok(export::from_json(&read_text(path).await?)?)
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
