use axum::response::Json;
use serde_json::{json, Value};

/// GET / - service banner
pub async fn root() -> Json<Value> {
    Json(json!({
        "name": "Lyceum API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "dashboard": "GET /api/v1/dashboard (protected)",
            "onboarding": "POST /api/v1/onboarding (protected)",
            "health": "GET /health (public)"
        }
    }))
}
