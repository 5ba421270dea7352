// handlers/public/mod.rs - Handlers reachable without credentials
pub mod health;
pub mod root;

pub use health::health;
pub use root::root;
