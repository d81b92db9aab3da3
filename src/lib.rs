// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app;
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod diff;
pub mod engine;
pub mod error;
pub mod history;
pub mod language;
pub mod logging;
pub mod passage;
pub mod runtime;
pub mod score;
pub mod session;
pub mod ui;
