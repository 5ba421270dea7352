// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (identity verified by middleware::require_identity)
pub mod protected; // /api/v1/*
pub mod public;    // /, /health
