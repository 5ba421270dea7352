// handlers/protected/mod.rs - Handlers behind middleware::require_identity
//
// Every handler here takes a `VerifiedIdentity` argument and only ever
// touches the profile row keyed by that identity.
pub mod dashboard;
pub mod onboarding;

pub use dashboard::dashboard_get;
pub use onboarding::onboarding_post;
