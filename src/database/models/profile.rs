use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::OnboardingData;

/// A row of `public.profiles` exactly as stored.
///
/// Every attribute is optional: a row created by the auth provider before
/// onboarding carries NULL in all of them. `None` means no value was ever
/// stored, which is distinct from an empty string or empty list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ProfileRecord {
    pub id: Uuid,
    pub display_name: Option<String>,
    pub user_role: Option<String>,
    pub preferred_website_language: Option<String>,
    pub preferred_course_explanation_language: Option<String>,
    pub preferred_course_material_language: Option<String>,
    pub major: Option<String>,
    pub major_level: Option<String>,
    pub studied_subjects: Option<Vec<String>>,
    pub interested_majors: Option<Vec<String>>,
    pub hobbies: Option<Vec<String>>,
    pub subscribed_to_newsletter: Option<bool>,
    pub receive_quotes: Option<bool>,
    pub bio: Option<String>,
    pub github_url: Option<String>,
    pub profile_picture_url: Option<String>,
    pub profile_banner_url: Option<String>,
    pub credits: Option<i32>,
    pub has_completed_onboarding: Option<bool>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProfileRecord {
    /// A row that exists but has never been onboarded
    pub fn empty(id: Uuid) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
}

/// Values written by one onboarding submission.
///
/// Picture and banner URLs are optional in the request; `None` keeps
/// whatever the row already holds.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUpdate {
    pub display_name: String,
    pub user_role: String,
    pub preferred_website_language: String,
    pub preferred_course_explanation_language: String,
    pub preferred_course_material_language: String,
    pub major: String,
    pub major_level: String,
    pub studied_subjects: Vec<String>,
    pub interested_majors: Vec<String>,
    pub hobbies: Vec<String>,
    pub subscribed_to_newsletter: bool,
    pub receive_quotes: bool,
    pub bio: String,
    pub github_url: String,
    pub profile_picture_url: Option<String>,
    pub profile_banner_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl ProfileUpdate {
    pub fn from_onboarding(data: OnboardingData, updated_at: DateTime<Utc>) -> Self {
        Self {
            display_name: data.display_name,
            user_role: data.user_role,
            preferred_website_language: data.preferred_website_language,
            preferred_course_explanation_language: data.preferred_course_explanation_language,
            preferred_course_material_language: data.preferred_course_material_language,
            major: data.major,
            major_level: data.major_level,
            studied_subjects: distinct(data.studied_subjects),
            interested_majors: distinct(data.interested_majors),
            hobbies: distinct(data.hobbies),
            subscribed_to_newsletter: data.subscribed_to_newsletter,
            receive_quotes: data.receive_quotes,
            bio: data.bio,
            github_url: data.github_url,
            profile_picture_url: data.profile_picture_url,
            profile_banner_url: data.profile_banner_url,
            updated_at,
        }
    }

    /// Apply this update to `record` the same way the upsert statement does
    pub fn apply_to(&self, record: &mut ProfileRecord) {
        record.display_name = Some(self.display_name.clone());
        record.user_role = Some(self.user_role.clone());
        record.preferred_website_language = Some(self.preferred_website_language.clone());
        record.preferred_course_explanation_language =
            Some(self.preferred_course_explanation_language.clone());
        record.preferred_course_material_language =
            Some(self.preferred_course_material_language.clone());
        record.major = Some(self.major.clone());
        record.major_level = Some(self.major_level.clone());
        record.studied_subjects = Some(self.studied_subjects.clone());
        record.interested_majors = Some(self.interested_majors.clone());
        record.hobbies = Some(self.hobbies.clone());
        record.subscribed_to_newsletter = Some(self.subscribed_to_newsletter);
        record.receive_quotes = Some(self.receive_quotes);
        record.bio = Some(self.bio.clone());
        record.github_url = Some(self.github_url.clone());
        if let Some(url) = &self.profile_picture_url {
            record.profile_picture_url = Some(url.clone());
        }
        if let Some(url) = &self.profile_banner_url {
            record.profile_banner_url = Some(url.clone());
        }
        record.has_completed_onboarding = Some(true);
        record.updated_at = Some(self.updated_at);
    }
}

// Collections are sets; drop repeats but keep first-seen order
fn distinct(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        if !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn onboarding() -> OnboardingData {
        OnboardingData {
            display_name: "Ada".to_string(),
            major: "Physics".to_string(),
            hobbies: vec!["chess".into(), "rowing".into(), "chess".into()],
            ..Default::default()
        }
    }

    #[test]
    fn update_drops_repeated_collection_entries() {
        let update = ProfileUpdate::from_onboarding(onboarding(), Utc::now());
        assert_eq!(update.hobbies, vec!["chess", "rowing"]);
    }

    #[test]
    fn apply_marks_completion_and_keeps_unsent_urls() {
        let id = Uuid::new_v4();
        let mut record = ProfileRecord::empty(id);
        record.profile_banner_url = Some("https://cdn.example/banner.png".to_string());
        record.credits = Some(12);

        let at = Utc::now();
        let mut data = onboarding();
        data.profile_picture_url = Some("https://cdn.example/ada.png".to_string());
        ProfileUpdate::from_onboarding(data, at).apply_to(&mut record);

        assert_eq!(record.id, id);
        assert_eq!(record.display_name.as_deref(), Some("Ada"));
        assert_eq!(record.bio.as_deref(), Some(""));
        assert_eq!(record.profile_picture_url.as_deref(), Some("https://cdn.example/ada.png"));
        assert_eq!(record.profile_banner_url.as_deref(), Some("https://cdn.example/banner.png"));
        assert_eq!(record.credits, Some(12));
        assert_eq!(record.has_completed_onboarding, Some(true));
        assert_eq!(record.updated_at, Some(at));
    }
}
