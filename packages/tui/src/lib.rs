//! Telcome TUI - Terminal dashboard for the Telcome helpdesk
//!
//! This library provides a terminal-based client for the Telcome helpdesk
//! service: authentication, ticket/bill/user views, and a support chat
//! with a local fallback responder, built with ratatui.

pub mod app;
pub mod chat;
pub mod config;
pub mod events;
pub mod forms;
pub mod state;
pub mod ui;

pub use app::App;
pub use config::Config;
pub use state::AppState;
