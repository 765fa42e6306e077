//! Wire types for the Telcome REST API.
//!
//! Field names follow the server's JSON exactly, camelCase and Mongo-style
//! `_id` included. List endpoints are not uniform: `/tickets` wraps in
//! `{tickets}`, `/bills` wraps in `{data}`, `/users` returns a bare array.

use serde::{Deserialize, Serialize};
use telcome_session::{Role, User};

/// Body for `POST /users/login`.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Body for `POST /users/register`.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Successful response from the authentication endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

/// Error payload the server attaches to non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorPayload {
    pub message: Option<String>,
    pub error: Option<String>,
}

impl ErrorPayload {
    pub fn into_message(self, fallback: &str) -> String {
        self.message
            .or(self.error)
            .unwrap_or_else(|| fallback.to_string())
    }
}

/// A support ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "ticketId", skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<String>,
    /// Id of the user the ticket belongs to.
    pub user: String,
    pub description: String,
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TicketsResponse {
    #[serde(default)]
    pub tickets: Vec<Ticket>,
}

/// A billing record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "billingAddress")]
    pub billing_address: String,
    pub description: String,
    pub amount: String,
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BillsResponse {
    #[serde(default)]
    pub data: Vec<Bill>,
}

/// Body for `POST /bot/message`.
#[derive(Debug, Clone, Serialize)]
pub struct BotMessage {
    pub message: String,
    #[serde(rename = "userId")]
    pub user_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotResponse {
    pub response: String,
}

/// An utterance the remote bot could not answer, queued for admin review.
#[derive(Debug, Clone, Deserialize)]
pub struct UnknownMessage {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnknownMessagesResponse {
    #[serde(rename = "unknownMessages", default)]
    pub unknown_messages: Vec<UnknownMessage>,
}

/// Body for `POST /bot/add` — teaches the bot a canned reply.
#[derive(Debug, Clone, Serialize)]
pub struct CannedReply {
    pub message: String,
    pub response: String,
}

/// Body for `POST /bot/network-info`, recorded at sign-in.
#[derive(Debug, Clone, Serialize)]
pub struct NetworkInfo {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub network: Option<NetworkDetails>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NetworkDetails {
    #[serde(rename = "type")]
    pub kind: String,
    pub strength: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_round_trips_server_field_names() {
        let json = r#"{"_id":"abc","ticketId":"T-1","user":"u1","description":"d","status":"open"}"#;
        let ticket: Ticket = serde_json::from_str(json).unwrap();
        assert_eq!(ticket.id.as_deref(), Some("abc"));
        assert_eq!(ticket.ticket_id.as_deref(), Some("T-1"));

        let back = serde_json::to_string(&ticket).unwrap();
        assert!(back.contains("\"ticketId\":\"T-1\""));
    }

    #[test]
    fn test_bills_unwrap_data_envelope() {
        let json = r#"{"data":[{"_id":"b1","userId":"u1","billingAddress":"a","description":"d","amount":"10","status":"unpaid"}]}"#;
        let bills: BillsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(bills.data.len(), 1);
        assert_eq!(bills.data[0].user_id, "u1");
    }

    #[test]
    fn test_error_payload_prefers_message() {
        let payload: ErrorPayload =
            serde_json::from_str(r#"{"message":"Login failed"}"#).unwrap();
        assert_eq!(payload.into_message("fallback"), "Login failed");

        let payload: ErrorPayload = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(payload.into_message("fallback"), "fallback");
    }
}
