use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::IdentityVerifier;
use crate::config::ApiConfig;
use crate::database::repository::ProfileStore;
use crate::handlers;
use crate::middleware::require_identity;
use crate::services::ProfileService;

/// Shared, read-only dependencies handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<IdentityVerifier>,
    pub profiles: ProfileService,
}

impl AppState {
    pub fn new(verifier: IdentityVerifier, store: Arc<dyn ProfileStore>) -> Self {
        Self {
            verifier: Arc::new(verifier),
            profiles: ProfileService::new(store),
        }
    }
}

pub fn app(state: AppState, api: &ApiConfig) -> Router {
    Router::new()
        // Public
        .route("/", get(handlers::public::root))
        .route("/health", get(handlers::public::health))
        // Protected
        .merge(protected_routes(&state))
        // Global middleware
        .layer(DefaultBodyLimit::max(api.max_request_size_bytes))
        .layer(cors_layer(&api.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn protected_routes(state: &AppState) -> Router<AppState> {
    use handlers::protected;

    Router::new()
        .route("/api/v1/dashboard", get(protected::dashboard_get))
        .route("/api/v1/onboarding", post(protected::onboarding_post))
        // route_layer: unknown paths still 404 instead of 401
        .route_layer(from_fn_with_state(state.verifier.clone(), require_identity))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let patterns = origins.to_vec();

    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _| {
            origin
                .to_str()
                .map(|origin| patterns.iter().any(|p| origin_matches(p, origin)))
                .unwrap_or(false)
        }))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ACCEPT,
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::HeaderName::from_static("x-csrf-token"),
        ])
        .expose_headers([header::LINK])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(300))
}

/// `https://*.vercel.app` matches any single-or-deeper subdomain of vercel.app
fn origin_matches(pattern: &str, origin: &str) -> bool {
    match pattern.split_once("://*.") {
        Some((scheme, suffix)) => origin
            .strip_prefix(scheme)
            .and_then(|rest| rest.strip_prefix("://"))
            .and_then(|host| host.strip_suffix(suffix))
            .map(|sub| sub.len() > 1 && sub.ends_with('.'))
            .unwrap_or(false),
        None => pattern == origin,
    }
}
