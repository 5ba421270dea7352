#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use tokio::task::JoinHandle;

use lyceum_api::auth::{IdentityVerifier, TokenRequest};
use lyceum_api::config::{ApiConfig, AuthConfig};
use lyceum_api::database::MemoryProfileStore;
use lyceum_api::server::{app, AppState};

pub const JWT_SECRET: &str = "integration-test-secret";
pub const SERVICE_KEY: &str = "svc-key";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub store: Arc<MemoryProfileStore>,
    verifier: IdentityVerifier,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Serve the real router on a free port, backed by an in-memory store
    pub async fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let auth = AuthConfig::with_secret(JWT_SECRET).service_key(SERVICE_KEY);
        let store = Arc::new(MemoryProfileStore::new());
        let state = AppState::new(IdentityVerifier::new(auth.clone()), store.clone());
        let router = app(state, &ApiConfig::default());

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        let server = Self {
            port,
            base_url,
            store,
            verifier: IdentityVerifier::new(auth),
            handle,
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `Authorization` header value carrying a fresh token for `subject`
    pub fn bearer(&self, subject: &str) -> String {
        let token = self
            .verifier
            .issue(&TokenRequest::new(subject))
            .expect("failed to mint test token");
        format!("Bearer {}", token)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub fn onboarding_body(display_name: &str, major: &str) -> serde_json::Value {
    serde_json::json!({
        "displayName": display_name,
        "userRole": "student",
        "preferred_website_language": "en",
        "preferred_course_explanation_language": "en",
        "preferred_course_material_language": "en",
        "major": major,
        "major_level": "Undergraduate",
        "studied_subjects": ["Calculus", "Mechanics"],
        "interested_majors": ["Mathematics"],
        "hobbies": ["chess"],
        "subscribed_to_newsletter": true,
        "receive_quotes": false,
        "bio": "Counting machines",
        "github_url": "https://github.com/ada"
    })
}
