mod api;
mod config;
mod directions;
mod dto;
mod state;

use crate::{config::Config, directions::DirectionsClient, state::AppState};
use axum::routing::{get, post};
use clap::Parser;
use dutyroute::{catalog::RouteCatalog, dispatch::Service, navigation, schedule::ScheduleStore};
use std::{path::PathBuf, sync::Arc, time::Instant};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "dutyroute-server", about = "Route, duty schedule and navigation service for bus drivers")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Route catalog JSON, overrides `catalog_path`
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Listen port, overrides `listen_port`
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting server...");
    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => Config::from_path(path).unwrap_or_else(|err| {
            error!("Failed to read config {}: {err}", path.display());
            std::process::exit(1);
        }),
        None => Config::default(),
    };
    if let Some(catalog) = args.catalog {
        config.catalog_path = catalog;
    }
    if let Some(port) = args.port {
        config.listen_port = port;
    }
    let time_zone = config.time_zone().unwrap_or_else(|err| {
        error!("{err}");
        std::process::exit(1);
    });

    info!("Loading catalog...");
    let now = Instant::now();
    let catalog = RouteCatalog::from_path(&config.catalog_path).unwrap_or_else(|err| {
        error!("Failed to load catalog {}: {err}", config.catalog_path.display());
        std::process::exit(1);
    });
    info!("Loading catalog took {:?} ({} routes)", now.elapsed(), catalog.len());

    let service = Service::new(catalog, ScheduleStore::new())
        .with_time_zone(time_zone)
        .with_navigation(navigation::Config {
            map_link_base: config.map_link_base.clone(),
        });
    let directions = DirectionsClient::from_config(&config.directions);
    if let Some(url) = &config.directions.url {
        info!("Directions provider at {url}");
    }
    let state = Arc::new(AppState {
        catalog_path: config.catalog_path.clone(),
        service,
        directions,
    });

    let app = axum::Router::new()
        .route("/routes", get(api::routes))
        .route("/routes/{id}", get(api::route))
        .route("/navigate", get(api::navigate))
        .route(
            "/drivers/{driver}/schedule",
            get(api::schedule).post(api::upload_csv),
        )
        .route("/drivers/{driver}/plan", post(api::upload_plan))
        .route("/catalog/reload", post(api::reload_catalog))
        .with_state(state);

    let port = config.listen_port;
    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("Failed to bind port {port}: {err}");
            std::process::exit(1);
        }
    };
    info!("Listening to port {port}");
    if let Err(err) = axum::serve(listener, app).await {
        error!("Server stopped: {err}");
        std::process::exit(1);
    }
}
