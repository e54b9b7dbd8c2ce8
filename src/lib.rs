// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod celebration;
pub mod config;
pub mod game;
pub mod history;
pub mod motion;
pub mod runtime;
pub mod stats;
pub mod words;
