mod catalog;
mod navigation;
mod routes;
mod schedule;

pub use catalog::*;
pub use navigation::*;
pub use routes::*;
pub use schedule::*;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use dutyroute::{catalog as route_catalog, dispatch, ingest, navigation as nav};
use serde::Serialize;
use tracing::{debug, error};

/// Error answer of every endpoint, rendered as `{"error": "...", "suggestions": [...]}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    suggestions: Vec<String>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    suggestions: Vec<String>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            suggestions: vec![],
        }
    }

    pub fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "internal error".into(),
            suggestions: vec![],
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            suggestions: self.suggestions,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<dispatch::Error> for ApiError {
    fn from(err: dispatch::Error) -> Self {
        use dispatch::Error::*;
        let status = match &err {
            Catalog(
                route_catalog::Error::RouteNotFound(_)
                | route_catalog::Error::StationNotFound { .. },
            ) => StatusCode::NOT_FOUND,
            Catalog(route_catalog::Error::Io(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Catalog(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Navigation(nav::Error::SameStation(_)) => StatusCode::BAD_REQUEST,
            Navigation(_) => StatusCode::NOT_FOUND,
            Ingest(ingest::Error::Csv(_)) => StatusCode::BAD_REQUEST,
            Ingest(ingest::Error::Storage(_)) | Schedule(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("Request failed: {err}");
        } else {
            debug!("Request rejected: {err}");
        }
        let suggestions = match &err {
            Navigation(nav::Error::StationNotFound { suggestions, .. }) => suggestions.clone(),
            _ => vec![],
        };
        Self {
            status,
            message: err.to_string(),
            suggestions,
        }
    }
}

/// For a dispatch answer of the wrong kind, which only a wiring bug produces.
fn unexpected(response: dispatch::Response) -> ApiError {
    error!("Unexpected dispatch response: {response:?}");
    ApiError::internal()
}
