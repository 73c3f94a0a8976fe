//! Authentication Models
//! Mission: Define identity records, token payloads, and auth request bodies

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Registered account (the Identity record). Built only from store rows,
/// so it is serialize-only.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash - never serialize
    pub avatar: String,
    pub date: DateTime<Utc>,
}

/// Public slice of a user embedded in profile responses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSummary {
    pub id: String,
    pub name: Option<String>,
    pub avatar: Option<String>,
}

impl UserSummary {
    pub fn new(id: &str, user: Option<&User>) -> Self {
        Self {
            id: id.to_string(),
            name: user.map(|u| u.name.clone()),
            avatar: user.map(|u| u.avatar.clone()),
        }
    }
}

/// JWT Claims payload: `{"user": {"id": ...}, "iat": ..., "exp": ...}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub user: TokenSubject,
    pub iat: i64, // issued-at, unix seconds
    pub exp: i64, // absolute expiry, unix seconds
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenSubject {
    pub id: String,
}

/// Registration body - POST /api/users
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Login body - POST /api/auth
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}
