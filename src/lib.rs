//! Study companion: document summaries, an assistant chat, and per-user
//! usage statistics kept in sync with a remote document store.

pub mod app;
pub mod assistant;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod session_gate;
pub mod stats;
pub mod structured_logger;
pub mod study_paths;
