use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::auth::VerifiedIdentity;
use crate::database::manager::DatabaseError;
use crate::database::models::ProfileUpdate;
use crate::database::repository::ProfileStore;
use crate::services::dashboard;
use crate::types::{DashboardResponse, OnboardingData};

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("identity has no profile")]
    NoProfile,

    #[error("storage error: {0}")]
    Storage(#[from] DatabaseError),
}

/// Reads and writes the single profile row owned by a verified identity
#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn ProfileStore>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    /// Record an onboarding submission for `identity`.
    ///
    /// Validation runs before storage is touched. The write is a single
    /// upsert, so a first-time user gets a row instead of a silent no-op.
    pub async fn complete_onboarding(
        &self,
        identity: &VerifiedIdentity,
        data: OnboardingData,
    ) -> Result<(), ProfileError> {
        if data.display_name.trim().is_empty() {
            return Err(ProfileError::MissingField("displayName"));
        }

        let id = profile_key(identity).ok_or(ProfileError::NoProfile)?;
        let update = ProfileUpdate::from_onboarding(data, Utc::now());

        let written = self.store.upsert(id, &update).await.map_err(|e| {
            error!(subject = %identity.subject, error = %e, "Failed to update profile");
            ProfileError::Storage(e)
        })?;

        if written != 1 {
            error!(subject = %identity.subject, rows = written, "Profile upsert wrote an unexpected row count");
            return Err(ProfileError::Storage(DatabaseError::QueryError(format!(
                "expected 1 row written, got {}",
                written
            ))));
        }

        info!(subject = %identity.subject, "Profile onboarding completed");
        Ok(())
    }

    /// Dashboard for `identity`; a missing row is a normal, defaulted state
    pub async fn dashboard(
        &self,
        identity: &VerifiedIdentity,
    ) -> Result<DashboardResponse, ProfileError> {
        let Some(id) = profile_key(identity) else {
            debug!(subject = %identity.subject, "Identity has no profile key; serving defaults");
            return Ok(dashboard::project(None));
        };

        let record = self.store.fetch(id).await.map_err(|e| {
            error!(subject = %identity.subject, error = %e, "Failed to load profile");
            ProfileError::Storage(e)
        })?;

        if record.is_none() {
            debug!(subject = %identity.subject, "No profile row; serving defaults");
        }

        Ok(dashboard::project(record.as_ref()))
    }

    pub async fn health_check(&self) -> Result<(), ProfileError> {
        self.store.ping().await.map_err(ProfileError::from)
    }
}

/// Row key for an identity. Service callers and non-UUID subjects own no row.
pub fn profile_key(identity: &VerifiedIdentity) -> Option<Uuid> {
    if identity.is_service() {
        return None;
    }
    Uuid::parse_str(&identity.subject).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::IdentitySource;
    use crate::database::memory::MemoryProfileStore;
    use crate::database::models::ProfileRecord;

    fn user(id: Uuid) -> VerifiedIdentity {
        VerifiedIdentity {
            subject: id.to_string(),
            source: IdentitySource::Token,
            role: None,
            email: None,
        }
    }

    fn payload() -> OnboardingData {
        OnboardingData {
            display_name: "Ada".to_string(),
            user_role: "student".to_string(),
            major: "Physics".to_string(),
            major_level: "Undergraduate".to_string(),
            studied_subjects: vec!["Calculus".to_string()],
            subscribed_to_newsletter: true,
            ..Default::default()
        }
    }

    fn service(store: &Arc<MemoryProfileStore>) -> ProfileService {
        ProfileService::new(store.clone())
    }

    #[tokio::test]
    async fn empty_display_name_never_reaches_storage() {
        let store = Arc::new(MemoryProfileStore::new());
        let svc = service(&store);

        for name in ["", "   "] {
            let mut data = payload();
            data.display_name = name.to_string();
            let err = svc.complete_onboarding(&user(Uuid::new_v4()), data).await.unwrap_err();
            assert!(matches!(err, ProfileError::MissingField("displayName")));
        }
        assert_eq!(store.statements(), 0);
    }

    #[tokio::test]
    async fn valid_submission_writes_exactly_one_row() {
        let store = Arc::new(MemoryProfileStore::new());
        let svc = service(&store);
        let id = Uuid::new_v4();

        let before = Utc::now();
        svc.complete_onboarding(&user(id), payload()).await.unwrap();
        let after = Utc::now();

        assert_eq!(store.writes(), 1);
        assert_eq!(store.len().await, 1);
        let row = store.get(id).await.unwrap();
        assert_eq!(row.has_completed_onboarding, Some(true));
        let stamped = row.updated_at.unwrap();
        assert!(stamped >= before && stamped <= after);
        assert_eq!(row.studied_subjects, Some(vec!["Calculus".to_string()]));
    }

    #[tokio::test]
    async fn existing_row_is_updated_in_place() {
        let store = Arc::new(MemoryProfileStore::new());
        let id = Uuid::new_v4();
        store
            .insert(ProfileRecord {
                credits: Some(7),
                ..ProfileRecord::empty(id)
            })
            .await;

        service(&store).complete_onboarding(&user(id), payload()).await.unwrap();

        assert_eq!(store.len().await, 1);
        let row = store.get(id).await.unwrap();
        assert_eq!(row.display_name.as_deref(), Some("Ada"));
        assert_eq!(row.credits, Some(7));
    }

    #[tokio::test]
    async fn service_identity_cannot_onboard() {
        let store = Arc::new(MemoryProfileStore::new());
        let err = service(&store)
            .complete_onboarding(&VerifiedIdentity::service(), payload())
            .await
            .unwrap_err();
        assert!(matches!(err, ProfileError::NoProfile));
        assert_eq!(store.statements(), 0);
    }

    #[tokio::test]
    async fn dashboard_for_unknown_user_is_defaulted() {
        let store = Arc::new(MemoryProfileStore::new());
        let dashboard = service(&store).dashboard(&user(Uuid::new_v4())).await.unwrap();
        assert_eq!(dashboard.welcome_message, "Welcome, Scholar!");
        assert_eq!(dashboard.test_gen.subject, "Undeclared");
        assert_eq!(store.reads(), 1);
    }

    #[tokio::test]
    async fn dashboard_for_non_uuid_subject_skips_storage() {
        let store = Arc::new(MemoryProfileStore::new());
        let identity = VerifiedIdentity {
            subject: "user-123".to_string(),
            source: IdentitySource::Token,
            role: None,
            email: None,
        };
        let dashboard = service(&store).dashboard(&identity).await.unwrap();
        assert_eq!(dashboard.welcome_message, "Welcome, Scholar!");
        assert_eq!(store.statements(), 0);
    }

    #[tokio::test]
    async fn write_then_read_round_trips_major() {
        let store = Arc::new(MemoryProfileStore::new());
        let svc = service(&store);
        let id = Uuid::new_v4();

        let before = svc.dashboard(&user(id)).await.unwrap();
        svc.complete_onboarding(&user(id), payload()).await.unwrap();
        let after = svc.dashboard(&user(id)).await.unwrap();

        assert_eq!(after.test_gen.subject, "Physics");
        assert_eq!(after.welcome_message, "Welcome, Ada!");
        assert_eq!(before.quote, after.quote);
        assert_eq!(before.courses, after.courses);
    }

    #[tokio::test]
    async fn storage_failure_surfaces_as_storage_error() {
        let store = Arc::new(MemoryProfileStore::new());
        store.set_unavailable(true);
        let svc = service(&store);

        let err = svc.dashboard(&user(Uuid::new_v4())).await.unwrap_err();
        assert!(matches!(err, ProfileError::Storage(_)));

        let err = svc.complete_onboarding(&user(Uuid::new_v4()), payload()).await.unwrap_err();
        assert!(matches!(err, ProfileError::Storage(_)));
    }

    #[test]
    fn profile_key_requires_a_uuid_token_subject() {
        let id = Uuid::new_v4();
        assert_eq!(profile_key(&user(id)), Some(id));
        assert_eq!(profile_key(&VerifiedIdentity::service()), None);
    }
}
