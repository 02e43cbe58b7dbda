use crate::{
    api::{ApiError, unexpected},
    dto::RouteDto,
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use dutyroute::dispatch::{self, Request};
use std::sync::Arc;

pub async fn routes(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    match state.service.handle(Request::Routes)? {
        dispatch::Response::Routes(routes) => Ok(Json(routes).into_response()),
        other => Err(unexpected(other)),
    }
}

pub async fn route(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    match state.service.handle(Request::Route { id })? {
        dispatch::Response::Route(route) => Ok(Json(RouteDto::from(&route)).into_response()),
        other => Err(unexpected(other)),
    }
}
