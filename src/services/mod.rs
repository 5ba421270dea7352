pub mod dashboard;
pub mod profile_service;

pub use profile_service::{profile_key, ProfileError, ProfileService};
