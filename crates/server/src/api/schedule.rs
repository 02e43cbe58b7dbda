use crate::{
    api::{ApiError, unexpected},
    dto::ScheduleDto,
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use dutyroute::{
    dispatch::{self, Request, UploadFormat},
    ingest::DATE_FORMAT,
    schedule::DriverId,
};
use std::{collections::HashMap, sync::Arc};
use tracing::error;

/// `GET /drivers/{driver}/schedule[?date=YYYY-MM-DD]`, today when no date is given.
pub async fn schedule(
    Path(driver): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let driver = driver_id(&driver)?;
    let date = match params.get("date") {
        Some(value) => Some(
            NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
                .map_err(|_| ApiError::bad_request(format!("invalid date `{value}`, expected YYYY-MM-DD")))?,
        ),
        None => None,
    };
    match state.service.handle(Request::Schedule { driver, date })? {
        dispatch::Response::Schedule(view) => Ok(Json(ScheduleDto::from(view)).into_response()),
        other => Err(unexpected(other)),
    }
}

/// `POST /drivers/{driver}/schedule` with CSV rows as the body.
pub async fn upload_csv(
    Path(driver): Path<String>,
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Response, ApiError> {
    upload(state, &driver, UploadFormat::Csv, body).await
}

/// `POST /drivers/{driver}/plan` with a `Date:`/`Umlauf:` plan text as the body.
pub async fn upload_plan(
    Path(driver): Path<String>,
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Response, ApiError> {
    upload(state, &driver, UploadFormat::PlanText, body).await
}

async fn upload(
    state: Arc<AppState>,
    driver: &str,
    format: UploadFormat,
    body: String,
) -> Result<Response, ApiError> {
    let request = Request::Upload {
        driver: driver_id(driver)?,
        format,
        body,
    };
    let response = tokio::task::spawn_blocking(move || state.service.handle(request))
        .await
        .map_err(|err| {
            error!("Upload task failed: {err}");
            ApiError::internal()
        })??;
    match response {
        dispatch::Response::Upload(result) => Ok(Json(result).into_response()),
        other => Err(unexpected(other)),
    }
}

fn driver_id(raw: &str) -> Result<DriverId, ApiError> {
    let driver = DriverId::from(raw);
    if driver.as_str().is_empty() {
        return Err(ApiError::bad_request("driver id must not be empty"));
    }
    Ok(driver)
}
