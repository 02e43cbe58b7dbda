use crate::{api::ApiError, state::AppState};
use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use dutyroute::{catalog::RouteCatalog, dispatch};
use serde::Serialize;
use std::{sync::Arc, time::Instant};
use tracing::{error, info};

#[derive(Serialize)]
struct ReloadDto {
    routes: usize,
}

/// `POST /catalog/reload`: re-reads the catalog file and swaps it in. The old
/// catalog stays active when the file cannot be loaded.
pub async fn reload_catalog(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    info!("Reloading catalog from {}...", state.catalog_path.display());
    let now = Instant::now();
    let path = state.catalog_path.clone();
    let catalog = tokio::task::spawn_blocking(move || RouteCatalog::from_path(path))
        .await
        .map_err(|err| {
            error!("Catalog reload task failed: {err}");
            ApiError::internal()
        })?
        .map_err(dispatch::Error::from)?;
    let routes = catalog.len();
    state.service.reload_catalog(catalog);
    info!("Reloading catalog took {:?}", now.elapsed());
    Ok(Json(ReloadDto { routes }).into_response())
}
