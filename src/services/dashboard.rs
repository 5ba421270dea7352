//! Read-time projection from a possibly partial profile row to the dashboard
//! payload. Defaults for absent attributes are applied here and nowhere else.

use crate::database::models::ProfileRecord;
use crate::types::{
    CoursesCard, DashboardResponse, NewsCard, NewsItem, QuickLinkItem, QuickLinksCard, QuoteCard,
    TestGenCard,
};

pub const DEFAULT_DISPLAY_NAME: &str = "Scholar";
pub const DEFAULT_MAJOR: &str = "Undeclared";
pub const DEFAULT_CREDITS: i32 = 0;

/// Build the dashboard for `record`, or for a user with no row at all.
///
/// Only `None` is replaced; a stored empty string is shown as stored.
pub fn project(record: Option<&ProfileRecord>) -> DashboardResponse {
    let display_name = record
        .and_then(|r| r.display_name.as_deref())
        .unwrap_or(DEFAULT_DISPLAY_NAME);
    let major = record
        .and_then(|r| r.major.as_deref())
        .unwrap_or(DEFAULT_MAJOR);
    let credits = record.and_then(|r| r.credits).unwrap_or(DEFAULT_CREDITS);
    let picture = record
        .and_then(|r| r.profile_picture_url.as_deref())
        .unwrap_or_default();
    let banner = record
        .and_then(|r| r.profile_banner_url.as_deref())
        .unwrap_or_default();

    DashboardResponse {
        welcome_message: format!("Welcome, {}!", display_name),
        credits: format!("Scholar's Credits: {}", credits),
        profile_picture_url: picture.to_string(),
        profile_banner_url: banner.to_string(),
        test_gen: test_gen_card(major),
        courses: courses_card(),
        quote: quote_card(),
        news: news_card(),
        quick_links: quick_links_card(),
    }
}

fn test_gen_card(subject: &str) -> TestGenCard {
    TestGenCard {
        title: "TestGen Snapshot".to_string(),
        subject: subject.to_string(),
        chapters: "0/15 Chapters Mastered".to_string(),
        last_exam: "Last Exam: N/A".to_string(),
        pending_exams: "0 Pending PDF Exams".to_string(),
        button_text: "Go to TestGen Dashboard".to_string(),
    }
}

// Static sections below carry no profile data.

fn courses_card() -> CoursesCard {
    CoursesCard {
        title: "Courses Snapshot".to_string(),
        enrollment_status: "3 Courses Enrolled".to_string(),
        todays_focus: "Focus: Complete Chapter 3 of Quantum Mechanics".to_string(),
        button_text: "Go to My Courses".to_string(),
    }
}

fn quote_card() -> QuoteCard {
    QuoteCard {
        title: "Quote of the Day".to_string(),
        quote: "The only true wisdom is in knowing you know nothing.".to_string(),
        author: "– Socrates".to_string(),
        button_text: "Refresh".to_string(),
    }
}

fn news_card() -> NewsCard {
    NewsCard {
        title: "Lyceum News".to_string(),
        items: vec![
            NewsItem {
                text: "New Course Released: Advanced Calculus".to_string(),
                time: "2 hours ago".to_string(),
            },
            NewsItem {
                text: "Community Event: Study Group this Friday".to_string(),
                time: "1 day ago".to_string(),
            },
        ],
    }
}

fn quick_links_card() -> QuickLinksCard {
    QuickLinksCard {
        title: "Quick Links".to_string(),
        links: vec![
            QuickLinkItem {
                text: "Generate Test".to_string(),
                icon: "/assets/icons/icon-test.svg".to_string(),
            },
            QuickLinkItem {
                text: "Browse Courses".to_string(),
                icon: "/assets/icons/icon-courses.svg".to_string(),
            },
        ],
    }
}
