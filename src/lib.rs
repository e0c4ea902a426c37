// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod analytics;
pub mod app_dirs;
pub mod config;
pub mod error;
pub mod normalize;
pub mod quiz;
pub mod starter;
pub mod store;
