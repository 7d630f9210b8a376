//! Health and catalog reload endpoints.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use leafcure_core::{LoadReport, ServiceStatus};

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub service: ServiceStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReloadError {
    pub error: String,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: state.service.status(),
    })
}

/// Reload the catalog file. On failure the previous catalog stays active.
pub async fn reload(
    State(state): State<AppState>,
) -> Result<Json<LoadReport>, (StatusCode, Json<ReloadError>)> {
    let service = state.service.clone();
    let result = tokio::task::spawn_blocking(move || service.reload())
        .await
        .map_err(|e| failure(format!("Reload task failed: {}", e)))?;

    match result {
        Some(Ok(report)) => {
            info!(records = report.records, skipped = report.skipped, "Catalog reloaded via API");
            Ok(Json(report))
        }
        Some(Err(e)) => Err(failure(format!("Reload failed: {}", e))),
        None => Err(failure("Catalog was not loaded from a file".to_string())),
    }
}

fn failure(message: String) -> (StatusCode, Json<ReloadError>) {
    error!("{}", message);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ReloadError { error: message }),
    )
}
