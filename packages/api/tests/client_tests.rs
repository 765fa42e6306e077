//! Integration tests driving the client against a one-shot HTTP stub on a
//! local TCP listener.

use telcome_api::{ApiError, TelcomeClient, Ticket};
use telcome_session::{MemoryStorage, Role, SessionStore, User};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// Serve exactly one HTTP request with a fixed response, reporting the
/// request line of what arrived.
async fn stub_one(status: &str, body: &str) -> (String, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    let status = status.to_string();
    let body = body.to_string();
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut buffer = [0u8; 4096];
        let n = stream.read(&mut buffer).await.unwrap();
        let request = String::from_utf8_lossy(&buffer[..n]).to_string();
        let request_line = request.lines().next().unwrap_or("").to_string();
        let _ = tx.send(request_line);

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.ok();
    });

    (format!("http://{addr}"), rx)
}

fn client_user() -> User {
    User {
        id: "1".to_string(),
        username: "a".to_string(),
        email: "a@b.c".to_string(),
        role: Role::Client,
    }
}

#[tokio::test]
async fn login_success_populates_the_session_store() {
    let body = r#"{"user":{"_id":"1","username":"a","email":"a@b.c","role":"client"},"token":"t"}"#;
    let (base_url, _rx) = stub_one("200 OK", body).await;

    let client = TelcomeClient::new(base_url).unwrap();
    let auth = client.login("a@b.c", "secret1").await.unwrap();
    assert_eq!(auth.token, "t");
    assert_eq!(auth.user.role, Role::Client);

    let store = SessionStore::new(MemoryStorage::new());
    store.sign_in(auth.user.clone(), auth.token).await.unwrap();

    let session = store.read();
    assert_eq!(session.user(), Some(&auth.user));
    assert_eq!(session.token(), Some("t"));
}

#[tokio::test]
async fn login_failure_surfaces_the_server_message() {
    let (base_url, _rx) = stub_one("401 Unauthorized", r#"{"message":"Invalid credentials"}"#).await;

    let client = TelcomeClient::new(base_url).unwrap();
    let err = client.login("a@b.c", "wrong-1").await.unwrap_err();
    assert!(err.is_auth_error());
    assert_eq!(err.user_message(), "Invalid credentials");
}

#[tokio::test]
async fn bot_message_failure_is_a_network_error() {
    // Bind then drop a listener so the port is closed.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = TelcomeClient::new(format!("http://{addr}")).unwrap();
    let err = client.bot_message("I need help with my bill", "1").await.unwrap_err();
    assert!(err.is_network_error(), "got: {err:?}");
}

#[tokio::test]
async fn ticket_listing_is_scoped_for_clients() {
    let (base_url, mut rx) = stub_one("200 OK", r#"{"tickets":[]}"#).await;

    let client = TelcomeClient::new(base_url).unwrap();
    let tickets = client.list_tickets(&client_user()).await.unwrap();
    assert!(tickets.is_empty());

    let request_line = rx.recv().await.unwrap();
    assert!(
        request_line.starts_with("GET /tickets/1 "),
        "client role must hit the per-user route, got: {request_line}"
    );
}

#[tokio::test]
async fn ticket_listing_is_unscoped_for_admins() {
    let (base_url, mut rx) = stub_one("200 OK", r#"{"tickets":[]}"#).await;

    let admin = User {
        role: Role::Admin,
        ..client_user()
    };
    let client = TelcomeClient::new(base_url).unwrap();
    client.list_tickets(&admin).await.unwrap();

    let request_line = rx.recv().await.unwrap();
    assert!(
        request_line.starts_with("GET /tickets "),
        "admin role must hit the unscoped route, got: {request_line}"
    );
}

#[tokio::test]
async fn bill_listing_unwraps_the_data_envelope() {
    let body = r#"{"data":[{"_id":"b1","userId":"1","billingAddress":"12 Elm","description":"fibre","amount":"42","status":"unpaid"}]}"#;
    let (base_url, _rx) = stub_one("200 OK", body).await;

    let client = TelcomeClient::new(base_url).unwrap();
    let bills = client.list_bills(&client_user()).await.unwrap();
    assert_eq!(bills.len(), 1);
    assert_eq!(bills[0].amount, "42");
}

#[tokio::test]
async fn unknown_message_queue_parses() {
    let body = r#"{"unknownMessages":[{"_id":"m1","message":"can you lower my bill"}]}"#;
    let (base_url, _rx) = stub_one("200 OK", body).await;

    let client = TelcomeClient::new(base_url).unwrap();
    let queue = client.bot_unknown_messages().await.unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].message, "can you lower my bill");
}

#[tokio::test]
async fn ticket_creation_posts_and_parses_the_created_record() {
    let body = r#"{"_id":"abc","ticketId":"T-9","user":"1","description":"router is down","status":"open"}"#;
    let (base_url, mut rx) = stub_one("200 OK", body).await;

    let ticket = Ticket {
        id: None,
        ticket_id: None,
        user: "1".to_string(),
        description: "router is down".to_string(),
        status: "open".to_string(),
    };
    let client = TelcomeClient::new(base_url).unwrap();
    let created = client.create_ticket(&ticket).await.unwrap();
    assert_eq!(created.ticket_id.as_deref(), Some("T-9"));

    let request_line = rx.recv().await.unwrap();
    assert!(request_line.starts_with("POST /tickets "), "got: {request_line}");
}

#[tokio::test]
async fn ticket_deletion_keys_on_the_public_id() {
    let (base_url, mut rx) = stub_one("200 OK", "{}").await;

    let client = TelcomeClient::new(base_url).unwrap();
    client.delete_ticket("T-9").await.unwrap();

    let request_line = rx.recv().await.unwrap();
    assert!(
        request_line.starts_with("DELETE /tickets/T-9 "),
        "got: {request_line}"
    );
}

#[tokio::test]
async fn user_update_puts_to_the_user_route() {
    let (base_url, mut rx) = stub_one("200 OK", "{}").await;

    let client = TelcomeClient::new(base_url).unwrap();
    client.update_user("1", &client_user()).await.unwrap();

    let request_line = rx.recv().await.unwrap();
    assert!(request_line.starts_with("PUT /users/1 "), "got: {request_line}");
}

#[tokio::test]
async fn bill_deletion_hits_the_bill_route() {
    let (base_url, mut rx) = stub_one("200 OK", "{}").await;

    let client = TelcomeClient::new(base_url).unwrap();
    client.delete_bill("b1").await.unwrap();

    let request_line = rx.recv().await.unwrap();
    assert!(
        request_line.starts_with("DELETE /bills/b1 "),
        "got: {request_line}"
    );
}

#[tokio::test]
async fn malformed_success_body_is_an_invalid_response() {
    let (base_url, _rx) = stub_one("200 OK", "not json at all").await;

    let client = TelcomeClient::new(base_url).unwrap();
    let err = client.list_users().await.unwrap_err();
    assert!(
        matches!(err, ApiError::InvalidResponse(_)),
        "a bad 2xx body must not read as a network failure, got: {err:?}"
    );
}

#[tokio::test]
async fn non_auth_failures_carry_the_status() {
    let (base_url, _rx) = stub_one("500 Internal Server Error", r#"{"message":"boom"}"#).await;

    let client = TelcomeClient::new(base_url).unwrap();
    let err = client.list_users().await.unwrap_err();
    match err {
        ApiError::Status { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "boom");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}
