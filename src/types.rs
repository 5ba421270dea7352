use serde::{Deserialize, Deserializer, Serialize};

/// Onboarding submission body.
///
/// Omitted or `null` fields decode to their empty value; only `displayName`
/// is checked for content before anything is written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OnboardingData {
    #[serde(rename = "displayName", deserialize_with = "null_as_default")]
    pub display_name: String,
    #[serde(rename = "userRole", deserialize_with = "null_as_default")]
    pub user_role: String,
    #[serde(deserialize_with = "null_as_default")]
    pub preferred_website_language: String,
    #[serde(deserialize_with = "null_as_default")]
    pub preferred_course_explanation_language: String,
    #[serde(deserialize_with = "null_as_default")]
    pub preferred_course_material_language: String,
    #[serde(deserialize_with = "null_as_default")]
    pub major: String,
    #[serde(deserialize_with = "null_as_default")]
    pub major_level: String,
    #[serde(deserialize_with = "null_as_default")]
    pub studied_subjects: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub interested_majors: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub hobbies: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub subscribed_to_newsletter: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub receive_quotes: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub bio: String,
    #[serde(deserialize_with = "null_as_default")]
    pub github_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_banner_url: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub welcome_message: String,
    pub credits: String,
    pub profile_picture_url: String,
    pub profile_banner_url: String,
    pub test_gen: TestGenCard,
    pub courses: CoursesCard,
    pub quote: QuoteCard,
    pub news: NewsCard,
    pub quick_links: QuickLinksCard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestGenCard {
    pub title: String,
    pub subject: String,
    pub chapters: String,
    pub last_exam: String,
    pub pending_exams: String,
    pub button_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursesCard {
    pub title: String,
    pub enrollment_status: String,
    pub todays_focus: String,
    pub button_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteCard {
    pub title: String,
    pub quote: String,
    pub author: String,
    pub button_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub text: String,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsCard {
    pub title: String,
    pub items: Vec<NewsItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickLinkItem {
    pub text: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickLinksCard {
    pub title: String,
    pub links: Vec<QuickLinkItem>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn onboarding_accepts_mixed_case_field_names() {
        let data: OnboardingData = serde_json::from_value(json!({
            "displayName": "Ada",
            "userRole": "student",
            "major": "Physics",
            "studied_subjects": ["Calculus"],
            "subscribed_to_newsletter": true,
            "profile_picture_url": "https://cdn.example/ada.png"
        }))
        .unwrap();

        assert_eq!(data.display_name, "Ada");
        assert_eq!(data.user_role, "student");
        assert_eq!(data.studied_subjects, vec!["Calculus"]);
        assert!(data.subscribed_to_newsletter);
        assert!(!data.receive_quotes);
        assert_eq!(data.bio, "");
        assert_eq!(data.profile_picture_url.as_deref(), Some("https://cdn.example/ada.png"));
        assert!(data.profile_banner_url.is_none());
    }

    #[test]
    fn onboarding_treats_null_as_empty() {
        let data: OnboardingData = serde_json::from_value(json!({
            "displayName": "Ada",
            "userRole": null,
            "major": null,
            "studied_subjects": null,
            "subscribed_to_newsletter": null,
            "bio": null,
            "profile_banner_url": null
        }))
        .unwrap();

        assert_eq!(data.display_name, "Ada");
        assert_eq!(data.user_role, "");
        assert_eq!(data.major, "");
        assert!(data.studied_subjects.is_empty());
        assert!(!data.subscribed_to_newsletter);
        assert_eq!(data.bio, "");
        assert!(data.profile_banner_url.is_none());
    }

    #[test]
    fn null_display_name_decodes_as_empty() {
        let data: OnboardingData =
            serde_json::from_value(json!({ "displayName": null })).unwrap();
        assert_eq!(data.display_name, "");
    }
}
