use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{ProfileRecord, ProfileUpdate};

/// Storage for profile rows, one statement per call.
///
/// Implementations never treat a missing row as an error on read.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Load the row keyed by `id`, if any
    async fn fetch(&self, id: Uuid) -> Result<Option<ProfileRecord>, DatabaseError>;

    /// Insert or update the row keyed by `id`, marking onboarding complete.
    /// Returns the number of rows written.
    async fn upsert(&self, id: Uuid, update: &ProfileUpdate) -> Result<u64, DatabaseError>;

    /// Check the backing store is reachable
    async fn ping(&self) -> Result<(), DatabaseError>;
}

const SELECT_PROFILE: &str = r#"
    SELECT
        id, display_name, user_role, preferred_website_language,
        preferred_course_explanation_language, preferred_course_material_language,
        major, major_level, studied_subjects, interested_majors, hobbies,
        subscribed_to_newsletter, receive_quotes, bio, github_url,
        profile_picture_url, profile_banner_url, credits,
        has_completed_onboarding, updated_at
    FROM public.profiles
    WHERE id = $1
"#;

const UPSERT_PROFILE: &str = r#"
    INSERT INTO public.profiles (
        id, display_name, user_role, preferred_website_language,
        preferred_course_explanation_language, preferred_course_material_language,
        major, major_level, studied_subjects, interested_majors, hobbies,
        subscribed_to_newsletter, receive_quotes, bio, github_url,
        profile_picture_url, profile_banner_url,
        has_completed_onboarding, updated_at
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, TRUE, $18)
    ON CONFLICT (id) DO UPDATE SET
        display_name = EXCLUDED.display_name,
        user_role = EXCLUDED.user_role,
        preferred_website_language = EXCLUDED.preferred_website_language,
        preferred_course_explanation_language = EXCLUDED.preferred_course_explanation_language,
        preferred_course_material_language = EXCLUDED.preferred_course_material_language,
        major = EXCLUDED.major,
        major_level = EXCLUDED.major_level,
        studied_subjects = EXCLUDED.studied_subjects,
        interested_majors = EXCLUDED.interested_majors,
        hobbies = EXCLUDED.hobbies,
        subscribed_to_newsletter = EXCLUDED.subscribed_to_newsletter,
        receive_quotes = EXCLUDED.receive_quotes,
        bio = EXCLUDED.bio,
        github_url = EXCLUDED.github_url,
        profile_picture_url = COALESCE(EXCLUDED.profile_picture_url, profiles.profile_picture_url),
        profile_banner_url = COALESCE(EXCLUDED.profile_banner_url, profiles.profile_banner_url),
        has_completed_onboarding = TRUE,
        updated_at = EXCLUDED.updated_at
"#;

/// Postgres-backed profile store over a borrowed pool
#[derive(Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn fetch(&self, id: Uuid) -> Result<Option<ProfileRecord>, DatabaseError> {
        let record = sqlx::query_as::<_, ProfileRecord>(SELECT_PROFILE)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    async fn upsert(&self, id: Uuid, update: &ProfileUpdate) -> Result<u64, DatabaseError> {
        let result = sqlx::query(UPSERT_PROFILE)
            .bind(id)
            .bind(&update.display_name)
            .bind(&update.user_role)
            .bind(&update.preferred_website_language)
            .bind(&update.preferred_course_explanation_language)
            .bind(&update.preferred_course_material_language)
            .bind(&update.major)
            .bind(&update.major_level)
            .bind(&update.studied_subjects)
            .bind(&update.interested_majors)
            .bind(&update.hobbies)
            .bind(update.subscribed_to_newsletter)
            .bind(update.receive_quotes)
            .bind(&update.bio)
            .bind(&update.github_url)
            .bind(&update.profile_picture_url)
            .bind(&update.profile_banner_url)
            .bind(update.updated_at)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
