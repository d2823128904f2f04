use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::Services;
use crate::app::App;
use crate::config::{AppConfig, KeyResolver};
use crate::route::Route;
use crate::store::{Catalog, MemoryStore};

mod api;
mod app;
mod cli;
mod commands;
mod config;
mod core;
mod modals;
mod model;
mod pages;
mod route;
mod search;
mod store;
mod theme;
mod tui;
mod ui;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let _guard = initialize_logging()?;
    info!("Starting watchlog");

    let args = cli::Args::parse();

    let mut config = match &args.config {
        Some(path) => config::loader::load_from(path)?,
        None => config::load()?,
    };
    if let Some(data_file) = args.data_file.clone() {
        config.storage.data_file = Some(data_file);
    }
    let start = start_route(&args, &config);
    let config = Arc::new(config);
    let resolver = Arc::new(KeyResolver::new(Arc::new(config.keybindings.clone())));

    let store = match config.storage.resolve_data_file() {
        Some(path) => {
            info!("Using library snapshot {}", path.display());
            MemoryStore::open(path).await?
        }
        None => {
            warn!("No data directory available, library will not be saved");
            MemoryStore::in_memory(Catalog::default())
        }
    };
    if args.demo && store.seed_if_empty().await? {
        info!("Seeded empty library with demo data");
    }

    let services = Services::from_backend(Arc::new(store));
    let mut app = App::new(services, config, resolver, start);
    app.run().await?;

    info!("Exiting watchlog");
    Ok(())
}

/// `--page` wins over the configured start page.
fn start_route(args: &cli::Args, config: &AppConfig) -> Route {
    if let Some(route) = args.page {
        return route;
    }
    match config.start_page.as_deref().map(str::parse::<Route>) {
        Some(Ok(route)) => route,
        Some(Err(error)) => {
            warn!("Ignoring start_page from config: {error}");
            Route::default()
        }
        None => Route::default(),
    }
}

fn initialize_logging() -> Result<WorkerGuard> {
    let directory = dirs::data_local_dir().map_or_else(
        || PathBuf::from("logs"),
        |path| path.join("watchlog").join("logs"),
    );
    std::fs::create_dir_all(&directory)?;

    let file_appender = tracing_appender::rolling::daily(&directory, "watchlog.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true),
        )
        .init();

    Ok(guard)
}
