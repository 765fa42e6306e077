//! HTTP client for the remote Telcome REST API.
//!
//! The dashboard is a thin presentation layer: tickets, bills, users and
//! bot messages all live behind this boundary. The client exposes one
//! typed method per endpoint and maps the server's `{message}` error
//! payloads into [`ApiError`].

pub mod client;
pub mod error;
pub mod types;

pub use client::TelcomeClient;
pub use error::{ApiError, ApiResult};
pub use types::{
    AuthResponse, Bill, BotMessage, CannedReply, Credentials, NetworkDetails, NetworkInfo,
    Registration, Ticket, UnknownMessage,
};
