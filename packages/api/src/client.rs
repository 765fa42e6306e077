use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use telcome_session::User;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::types::{
    AuthResponse, Bill, BillsResponse, BotMessage, BotResponse, CannedReply, Credentials,
    ErrorPayload, NetworkInfo, Registration, Ticket, TicketsResponse, UnknownMessage,
    UnknownMessagesResponse,
};

/// Client for the remote Telcome REST API.
///
/// Everything persistent lives behind this boundary; the client owns the
/// base URL, a pooled HTTP client with a fixed timeout, and the bearer
/// token once a user has signed in.
#[derive(Clone)]
pub struct TelcomeClient {
    http_client: Client,
    base_url: String,
    access_token: Option<String>,
}

impl TelcomeClient {
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: None,
        })
    }

    /// Set the access token after authentication
    pub fn set_access_token(&mut self, token: impl Into<String>) {
        self.access_token = Some(token.into());
    }

    /// Drop the access token on sign-out
    pub fn clear_access_token(&mut self) {
        self.access_token = None;
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.access_token {
            Some(token) => builder.header("Authorization", format!("Bearer {token}")),
            None => builder,
        }
    }

    /// Turn a non-2xx response into an [`ApiError`], reading the server's
    /// `{message}` payload when there is one.
    async fn error_from(response: Response, fallback: &str) -> ApiError {
        let status = response.status();
        let message = match response.json::<ErrorPayload>().await {
            Ok(payload) => payload.into_message(fallback),
            Err(_) => fallback.to_string(),
        };
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            ApiError::Authentication(message)
        } else {
            ApiError::Status {
                status: status.as_u16(),
                message,
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, fallback: &str) -> ApiResult<T> {
        let response = self.request(self.http_client.get(self.url(path))).send().await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response, fallback).await);
        }
        Self::decode(response).await
    }

    /// Decode a 2xx body. A body that does not parse is a server bug, not a
    /// transport failure, and is reported as such.
    async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
        body: &B,
        fallback: &str,
    ) -> ApiResult<T> {
        let response = self.request(builder).json(body).send().await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response, fallback).await);
        }
        Self::decode(response).await
    }

    // ---- authentication -------------------------------------------------

    /// `POST /users/login`. Any non-2xx surfaces as an authentication
    /// error carrying the server's message.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<AuthResponse> {
        let body = Credentials {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self
            .http_client
            .post(self.url("/users/login"))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let message = match response.json::<ErrorPayload>().await {
                Ok(payload) => payload.into_message("Login failed"),
                Err(_) => "Login failed".to_string(),
            };
            return Err(ApiError::auth(message));
        }
        Self::decode(response).await
    }

    /// `POST /users/register`.
    pub async fn register(&self, registration: &Registration) -> ApiResult<()> {
        let response = self
            .http_client
            .post(self.url("/users/register"))
            .json(registration)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response, "Registration failed").await);
        }
        Ok(())
    }

    // ---- users ----------------------------------------------------------

    /// `GET /users` — the server returns a bare array.
    pub async fn list_users(&self) -> ApiResult<Vec<User>> {
        self.get_json("/users", "Failed to fetch users").await
    }

    /// `PUT /users/{id}`.
    pub async fn update_user(&self, id: &str, user: &User) -> ApiResult<()> {
        let response = self
            .request(self.http_client.put(self.url(&format!("/users/{id}"))))
            .json(user)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response, "Failed to update user").await);
        }
        Ok(())
    }

    /// `DELETE /users/{id}`.
    pub async fn delete_user(&self, id: &str) -> ApiResult<()> {
        self.delete(&format!("/users/{id}"), "Failed to delete user")
            .await
    }

    // ---- tickets --------------------------------------------------------

    /// List tickets scoped by role: admins see every ticket, clients only
    /// their own.
    pub async fn list_tickets(&self, user: &User) -> ApiResult<Vec<Ticket>> {
        let path = if user.role.is_admin() {
            "/tickets".to_string()
        } else {
            format!("/tickets/{}", user.id)
        };
        let response: TicketsResponse = self.get_json(&path, "Failed to fetch tickets").await?;
        Ok(response.tickets)
    }

    /// `POST /tickets`.
    pub async fn create_ticket(&self, ticket: &Ticket) -> ApiResult<Ticket> {
        self.send_json(
            self.http_client.post(self.url("/tickets")),
            ticket,
            "Failed to create ticket",
        )
        .await
    }

    /// `PUT /tickets/{id}`.
    pub async fn update_ticket(&self, id: &str, ticket: &Ticket) -> ApiResult<Ticket> {
        self.send_json(
            self.http_client.put(self.url(&format!("/tickets/{id}"))),
            ticket,
            "Failed to update ticket",
        )
        .await
    }

    /// `DELETE /tickets/{ticket_id}` — deletion keys on the public ticket
    /// id, not the record id.
    pub async fn delete_ticket(&self, ticket_id: &str) -> ApiResult<()> {
        self.delete(&format!("/tickets/{ticket_id}"), "Failed to delete ticket")
            .await
    }

    // ---- bills ----------------------------------------------------------

    /// List bills scoped by role, unwrapping the `{data}` envelope.
    pub async fn list_bills(&self, user: &User) -> ApiResult<Vec<Bill>> {
        let path = if user.role.is_admin() {
            "/bills".to_string()
        } else {
            format!("/bills/{}", user.id)
        };
        let response: BillsResponse = self.get_json(&path, "Failed to fetch bills").await?;
        Ok(response.data)
    }

    /// `POST /bills`.
    pub async fn create_bill(&self, bill: &Bill) -> ApiResult<Bill> {
        self.send_json(
            self.http_client.post(self.url("/bills")),
            bill,
            "Failed to create bill",
        )
        .await
    }

    /// `PUT /bills/{id}`.
    pub async fn update_bill(&self, id: &str, bill: &Bill) -> ApiResult<Bill> {
        self.send_json(
            self.http_client.put(self.url(&format!("/bills/{id}"))),
            bill,
            "Failed to update bill",
        )
        .await
    }

    /// `DELETE /bills/{id}`.
    pub async fn delete_bill(&self, id: &str) -> ApiResult<()> {
        self.delete(&format!("/bills/{id}"), "Failed to delete bill")
            .await
    }

    // ---- bot ------------------------------------------------------------

    /// `POST /bot/message`. A transport failure here is what hands the
    /// conversation to the local fallback engine.
    pub async fn bot_message(&self, message: &str, user_id: &str) -> ApiResult<String> {
        let body = BotMessage {
            message: message.to_string(),
            user_id: user_id.to_string(),
        };
        let response: BotResponse = self
            .send_json(
                self.http_client.post(self.url("/bot/message")),
                &body,
                "Bot request failed",
            )
            .await?;
        Ok(response.response)
    }

    /// `GET /bot/unknown` — the admin review queue.
    pub async fn bot_unknown_messages(&self) -> ApiResult<Vec<UnknownMessage>> {
        let response: UnknownMessagesResponse = self
            .get_json("/bot/unknown", "Failed to fetch unknown messages")
            .await?;
        Ok(response.unknown_messages)
    }

    /// `POST /bot/add` — teach the bot a canned reply for a reviewed
    /// utterance.
    pub async fn bot_add_reply(&self, reply: &CannedReply) -> ApiResult<()> {
        let response = self
            .request(self.http_client.post(self.url("/bot/add")))
            .json(reply)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response, "Failed to save response").await);
        }
        Ok(())
    }

    /// `POST /bot/network-info` — connection telemetry recorded at
    /// sign-in. Callers treat failures as ignorable.
    pub async fn report_network_info(&self, info: &NetworkInfo) -> ApiResult<()> {
        let response = self
            .request(self.http_client.post(self.url("/bot/network-info")))
            .json(info)
            .send()
            .await?;
        if !response.status().is_success() {
            debug!("network-info report rejected: {}", response.status());
            return Err(Self::error_from(response, "Error saving network info").await);
        }
        Ok(())
    }

    async fn delete(&self, path: &str, fallback: &str) -> ApiResult<()> {
        let response = self
            .request(self.http_client.delete(self.url(path)))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response, fallback).await);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = TelcomeClient::new("http://localhost:4000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:4000");
        assert_eq!(client.url("/tickets"), "http://localhost:4000/tickets");
    }
}
