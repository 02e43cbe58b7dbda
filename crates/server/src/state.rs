use crate::directions::DirectionsClient;
use dutyroute::dispatch::Service;
use std::path::PathBuf;

pub struct AppState {
    /// Catalog document re-read on `POST /catalog/reload`.
    pub catalog_path: PathBuf,
    pub service: Service,
    pub directions: Option<DirectionsClient>,
}
