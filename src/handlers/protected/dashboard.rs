// handlers/protected/dashboard.rs - GET /api/v1/dashboard

use axum::{extract::State, Json};

use crate::auth::VerifiedIdentity;
use crate::error::ApiError;
use crate::server::AppState;
use crate::types::DashboardResponse;

/// GET /api/v1/dashboard - dashboard for the calling user.
///
/// A user who has not onboarded yet gets the defaulted dashboard, not an error.
pub async fn dashboard_get(
    State(state): State<AppState>,
    identity: VerifiedIdentity,
) -> Result<Json<DashboardResponse>, ApiError> {
    let dashboard = state.profiles.dashboard(&identity).await?;
    Ok(Json(dashboard))
}
