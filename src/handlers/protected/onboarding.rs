// handlers/protected/onboarding.rs - POST /api/v1/onboarding

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::{json, Value};

use crate::auth::VerifiedIdentity;
use crate::error::ApiError;
use crate::server::AppState;
use crate::types::OnboardingData;

/// POST /api/v1/onboarding - store the calling user's onboarding answers.
///
/// Expected Output:
/// ```json
/// { "message": "Profile updated successfully" }
/// ```
pub async fn onboarding_post(
    State(state): State<AppState>,
    identity: VerifiedIdentity,
    payload: Result<Json<OnboardingData>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(data) = payload?;

    state.profiles.complete_onboarding(&identity, data).await?;

    Ok(Json(json!({ "message": "Profile updated successfully" })))
}
