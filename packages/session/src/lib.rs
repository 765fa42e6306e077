//! Session state management for the Telcome dashboard client.
//!
//! The [`SessionStore`] is the single source of truth for "who is signed
//! in". It restores a persisted `(user, token)` pair at startup, persists
//! new credentials on sign-in, and publishes every change through a watch
//! channel so the UI can re-derive which screens are reachable.

pub mod error;
pub mod storage;
pub mod store;
pub mod types;

pub use error::{SessionError, SessionResult};
pub use storage::{FileStorage, MemoryStorage, SessionStorage, KEY_TOKEN, KEY_USER};
pub use store::SessionStore;
pub use types::{Role, Session, User};
