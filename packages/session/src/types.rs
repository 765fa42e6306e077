use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account role recognized by the Telcome API.
///
/// The canonical set is `client` and `admin`. Records written by older
/// front ends sometimes carry `"user"` for the non-admin role; it
/// deserializes as [`Role::Client`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[serde(alias = "user")]
    Client,
    Admin,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "client" | "user" => Ok(Role::Client),
            "admin" => Ok(Role::Admin),
            other => Err(format!("Unknown role: {other}")),
        }
    }
}

/// A signed-in account as returned by the authentication endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(alias = "_id")]
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
}

/// The current authentication state.
///
/// `user` and `token` are set and cleared together: both `Some` after a
/// successful sign-in or restore, both `None` otherwise. The constructors
/// are the only way to build one, which keeps that pairing intact.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    user: Option<User>,
    token: Option<String>,
}

impl Session {
    /// A signed-out session.
    pub fn anonymous() -> Self {
        Self {
            user: None,
            token: None,
        }
    }

    /// A signed-in session holding both halves of the credential pair.
    pub fn authenticated(user: User, token: impl Into<String>) -> Self {
        Self {
            user: Some(user),
            token: Some(token.into()),
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Role of the signed-in user, if any.
    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.role)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::anonymous()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_accepts_legacy_user_spelling() {
        let role: Role = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(role, Role::Client);
        assert_eq!("user".parse::<Role>().unwrap(), Role::Client);
    }

    #[test]
    fn test_role_serializes_canonically() {
        assert_eq!(serde_json::to_string(&Role::Client).unwrap(), "\"client\"");
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
    }

    #[test]
    fn test_user_accepts_mongo_id_field() {
        let user: User = serde_json::from_str(
            r#"{"_id":"1","username":"a","email":"a@b.c","role":"client"}"#,
        )
        .unwrap();
        assert_eq!(user.id, "1");
    }

    #[test]
    fn test_session_pairing() {
        let anon = Session::anonymous();
        assert!(!anon.is_authenticated());
        assert!(anon.token().is_none());

        let user = User {
            id: "1".to_string(),
            username: "a".to_string(),
            email: "a@b.c".to_string(),
            role: Role::Client,
        };
        let session = Session::authenticated(user, "t");
        assert!(session.is_authenticated());
        assert_eq!(session.token(), Some("t"));
        assert_eq!(session.role(), Some(Role::Client));
    }
}
