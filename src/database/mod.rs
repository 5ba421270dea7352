pub mod manager;
pub mod memory;
pub mod models;
pub mod repository;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryProfileStore;
pub use models::{ProfileRecord, ProfileUpdate};
pub use repository::{PgProfileStore, ProfileStore};
