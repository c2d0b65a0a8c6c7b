//! vcp-sel - Cascading voice selection driver
//!
//! Loads the catalog sources from the data folder as they become available,
//! replays a script of selection actions and prints the resulting selection
//! view as JSON for the rendering layer.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use vcp_common::config::{LoggingConfig, TomlConfig};
use vcp_sel::loader::spawn_source_readers;
use vcp_sel::selector::CandidateView;
use vcp_sel::{Action, CascadingSelector, CatalogOptions, CatalogStore, ScopeFilter};

/// Command-line arguments for vcp-sel
#[derive(Parser, Debug)]
#[command(name = "vcp-sel")]
#[command(about = "Cascading voice selection over the voice model catalog")]
#[command(version)]
struct Args {
    /// Configuration file (overrides VCP_CONFIG and the user config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Folder holding categories.json, items.json and closure.json
    #[arg(short, long, env = "VCP_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Initial scope ("all" or a language tag)
    #[arg(short, long)]
    scope: Option<String>,

    /// Initially selected voice model
    #[arg(long)]
    selected_item: Option<String>,

    /// Action to apply, repeatable, in order
    /// (select:<level>:<token>, clear:<level>, scope:<value>, item:<token>, goto:<token>)
    #[arg(short, long = "action")]
    actions: Vec<String>,

    /// Print the categories voice models may be assigned to instead
    #[arg(long)]
    assignable: bool,

    /// Include restricted categories in --assignable output
    #[arg(long)]
    moderator: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("vcp_sel={0},vcp_common={0}", logging.level)));

    // Stdout carries the JSON output, logs go to stderr or the log file
    match &logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(&config.logging)?;

    // Log build identification immediately after tracing init
    info!(
        "Starting vcp-sel v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let data_dir = args.data_dir.clone().unwrap_or_else(|| config.data_dir.clone());
    info!("Data folder: {}", data_dir.display());

    let scope = ScopeFilter::parse(args.scope.as_deref().unwrap_or(&config.selector.default_scope));
    let actions = args
        .actions
        .iter()
        .map(|a| a.parse::<Action>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("Failed to parse actions")?;

    let mut store = CatalogStore::new(CatalogOptions::from(&config));
    let mut selector = CascadingSelector::with_selected_item(
        store.snapshot(),
        scope,
        args.selected_item.as_deref().map(Into::into),
    );

    // Sources arrive in whatever order their reads complete
    let mut updates = spawn_source_readers(&data_dir);
    while let Some(update) = updates.recv().await {
        let update = update.context("Failed to load catalog source")?;
        let snapshot = store.apply(update);
        selector.replace_catalog(snapshot);
    }

    let readiness = store.snapshot().readiness();
    if !readiness.is_complete() {
        warn!("Catalog incomplete: {:?}", readiness);
    }

    let output = if args.assignable {
        let categories: Vec<CandidateView> = store
            .snapshot()
            .assignable_categories(args.moderator)
            .iter()
            .map(CandidateView::from)
            .collect();
        serde_json::to_value(categories)?
    } else {
        for action in actions {
            selector.dispatch(action);
        }
        serde_json::to_value(selector.view())?
    };

    let rendered = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{}", rendered);

    Ok(())
}
