use crate::error::HealthResponse;
use crate::routes;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};

/// GET /health handler - Health check endpoint
///
/// Reports how many surveys and responses the store currently holds.
#[utoipa::path(
    get,
    path = routes::HEALTH,
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (surveys, responses) = state.store.counts().await;
    tracing::debug!("Health check passed ({} surveys, {} responses)", surveys, responses);

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            surveys,
            responses,
        }),
    )
}
