use crate::{
    api::{ApiError, unexpected},
    dto::ItineraryDto,
    state::AppState,
};
use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use dutyroute::dispatch::{self, Request};
use std::{collections::HashMap, sync::Arc};

/// `GET /navigate?line=31&from=Hauptbahnhof&to=Bismarckplatz[&format=text]`
pub async fn navigate(
    Query(params): Query<HashMap<String, String>>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let request = Request::Navigate {
        line: required(&params, "line")?,
        from: required(&params, "from")?,
        to: required(&params, "to")?,
    };
    let mut itinerary = match state.service.handle(request)? {
        dispatch::Response::Navigate(itinerary) => itinerary,
        other => return Err(unexpected(other)),
    };
    if let Some(directions) = &state.directions {
        directions.enrich(&mut itinerary).await;
    }

    if params.get("format").map(String::as_str) == Some("text") {
        return Ok(itinerary.to_string().into_response());
    }
    let overview = itinerary.overview_link(state.service.navigation());
    Ok(Json(ItineraryDto::from(&itinerary, overview)).into_response())
}

fn required(params: &HashMap<String, String>, key: &str) -> Result<String, ApiError> {
    match params.get(key).map(|value| value.trim()) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(ApiError::bad_request(format!("missing query parameter `{key}`"))),
    }
}
