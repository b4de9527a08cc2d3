//! Login, registration and session restore.
//!
//! The server's auth payload is decoded once, here, into a [`UserRecord`].
//! Nothing else in the crate looks at the raw payload.

use crate::api::{ApiError, GameApi, LoginRequest, RegisterRequest};
use crate::storage::{SessionStore, StoreError};
use crate::validation::{self, ValidationError};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

pub const TOKEN_KEY: &str = "jwt_token";
pub const USER_KEY: &str = "user";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("not logged in, run `login` first")]
    NotLoggedIn,
    #[error("server did not return a token")]
    MissingToken,
    #[error("server returned an unusable user record: {0}")]
    MalformedUser(String),
    #[error("this command needs the {required} role")]
    Forbidden { required: Role },
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[default]
    Player,
    Admin,
}

impl Role {
    /// Parse a role name as the server spells it (`PLAYER`, `ADMIN`, optionally `ROLE_`-prefixed).
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_uppercase();
        match name.strip_prefix("ROLE_").unwrap_or(&name) {
            "PLAYER" => Some(Self::Player),
            "ADMIN" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => write!(f, "PLAYER"),
            Self::Admin => write!(f, "ADMIN"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

/// Token plus the user it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub token: String,
    pub user: UserRecord,
}

impl AuthSession {
    pub fn require(&self, role: Role) -> Result<(), AuthError> {
        if self.user.role == role {
            Ok(())
        } else {
            Err(AuthError::Forbidden { required: role })
        }
    }
}

/// What the caller already knows, used when the payload leaves gaps.
#[derive(Debug, Clone, Copy)]
pub struct Submitted<'a> {
    pub username: &'a str,
    pub role: Option<Role>,
}

/// Turn an auth payload into a [`UserRecord`].
///
/// Accepted shapes, in order:
/// 1. flat `{token, userId, username, role?}`
/// 2. nested `{token, user: {id, username, role}}`
/// 3. anything else carrying an `id`/`userId`
///
/// Role resolution: payload `role`, then the role the caller submitted, then
/// the `role` claim inside the token, then `PLAYER`. Username falls back to the
/// submitted one. The id has no fallback; every player endpoint needs it.
pub fn decode_user(payload: &Value, submitted: Submitted<'_>) -> Result<UserRecord, AuthError> {
    let Value::Object(map) = payload else {
        return Err(AuthError::MalformedUser(format!("expected an object, got {payload}")));
    };
    let token = map.get("token").and_then(Value::as_str);

    let flat = map.contains_key("userId") && map.contains_key("username");
    let source: &Map<String, Value> = match map.get("user") {
        Some(Value::Object(inner)) if !flat => inner,
        _ => map,
    };

    let id = ["userId", "id"]
        .iter()
        .find_map(|key| source.get(*key).and_then(id_value))
        .ok_or_else(|| AuthError::MalformedUser("no user id in response".to_string()))?;

    let username = source
        .get("username")
        .and_then(Value::as_str)
        .or_else(|| map.get("user").and_then(Value::as_str))
        .filter(|name| !name.is_empty())
        .unwrap_or(submitted.username)
        .to_string();

    let role = source
        .get("role")
        .and_then(Value::as_str)
        .and_then(Role::parse)
        .or(submitted.role)
        .or_else(|| token.and_then(role_from_token))
        .unwrap_or_default();

    Ok(UserRecord { id, username, role })
}

fn id_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Read the `role` claim from a JWT without verifying it.
#[must_use]
pub fn role_from_token(token: &str) -> Option<Role> {
    let claims = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(claims.trim_end_matches('=')).ok()?;
    let claims: Value = serde_json::from_slice(&bytes).ok()?;
    claims.get("role").and_then(Value::as_str).and_then(Role::parse)
}

fn token_from(payload: &Value) -> Result<String, AuthError> {
    payload
        .get("token")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or(AuthError::MissingToken)
}

fn persist<S: SessionStore>(store: &mut S, session: &AuthSession) -> Result<(), AuthError> {
    let user = serde_json::to_string(&session.user).map_err(StoreError::from)?;
    store.set(TOKEN_KEY, &session.token)?;
    store.set(USER_KEY, &user)?;
    Ok(())
}

pub fn login<A: GameApi, S: SessionStore>(
    api: &A,
    store: &mut S,
    username: &str,
    password: &str,
) -> Result<AuthSession, AuthError> {
    if username.trim().is_empty() || password.is_empty() {
        return Err(ValidationError::MissingCredentials.into());
    }
    let payload = api.login(&LoginRequest { username, password })?;
    let token = token_from(&payload)?;
    let user = decode_user(&payload, Submitted { username, role: None })?;
    let session = AuthSession { token, user };
    persist(store, &session)?;
    log::info!("logged in as {} ({})", session.user.username, session.user.role);
    Ok(session)
}

pub fn register<A: GameApi, S: SessionStore>(
    api: &A,
    store: &mut S,
    username: &str,
    password: &str,
    role: Role,
) -> Result<AuthSession, AuthError> {
    validation::validate_username(username)?;
    validation::validate_password(password)?;
    let payload = api.register(&RegisterRequest { username, password, role })?;
    let token = token_from(&payload)?;
    let user = decode_user(&payload, Submitted { username, role: Some(role) })?;
    let session = AuthSession { token, user };
    persist(store, &session)?;
    log::info!("registered {} ({})", session.user.username, session.user.role);
    Ok(session)
}

/// Load the stored session. An unreadable user entry wipes the store.
pub fn restore<S: SessionStore>(store: &mut S) -> Result<Option<AuthSession>, AuthError> {
    let (Some(token), Some(user)) = (store.get(TOKEN_KEY)?, store.get(USER_KEY)?) else {
        log::debug!("no stored session");
        return Ok(None);
    };
    match serde_json::from_str::<UserRecord>(&user) {
        Ok(user) => Ok(Some(AuthSession { token, user })),
        Err(e) => {
            log::warn!("stored user record is corrupt ({e}), clearing session");
            store.clear()?;
            Ok(None)
        }
    }
}

/// Like [`restore`] but fails when nobody is logged in.
pub fn require_session<S: SessionStore>(store: &mut S) -> Result<AuthSession, AuthError> {
    restore(store)?.ok_or(AuthError::NotLoggedIn)
}

pub fn logout<S: SessionStore>(store: &mut S) -> Result<(), AuthError> {
    store.remove(TOKEN_KEY)?;
    store.remove(USER_KEY)?;
    Ok(())
}

/// Forget the stored session if `error` says the server no longer accepts it.
pub fn expire_on_unauthorized<S: SessionStore>(store: &mut S, error: &ApiError) {
    if matches!(error, ApiError::Unauthorized) {
        log::info!("server rejected the stored token, clearing session");
        if let Err(e) = logout(store) {
            log::warn!("could not clear session: {e}");
        }
    }
}
