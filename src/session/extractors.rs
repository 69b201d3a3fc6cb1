use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use tracing::warn;

use super::jwt::{JwtKeys, SessionClaims};
use super::registry::SharedSession;
use super::user::is_banned;
use crate::{error::AppError, state::AppState};

pub const SESSION_COOKIE: &str = "sid";
pub const CLEAR_SESSION_COOKIE: &str = "sid=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0";

pub fn session_cookie(token: &str, max_age_secs: u64) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}")
}

/// Session token from the `sid` cookie, or a `Bearer` header as fallback.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value);
    if from_cookie.is_some() {
        return from_cookie;
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| {
            auth.strip_prefix("Bearer ")
                .or_else(|| auth.strip_prefix("bearer "))
        })
}

fn verified_claims(parts: &Parts, state: &AppState) -> Option<SessionClaims> {
    let token = session_token(&parts.headers)?;
    let keys = JwtKeys::from_ref(state);
    match keys.verify(token) {
        Ok(claims) => Some(claims),
        Err(e) => {
            warn!(error = %e, "invalid or expired session token");
            None
        }
    }
}

/// A session whose identity passed the banned and authentication checks.
/// Profile completeness is left to the handler.
pub struct CurrentSession {
    pub sid: String,
    pub session: SharedSession,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let claims = verified_claims(parts, state).ok_or(AppError::NotAuthenticated)?;

        if is_banned(&claims.sub) {
            warn!(sid = %claims.sid, "banned identity presented a session token");
            state.sessions.end(&claims.sid).await?;
            return Err(AppError::UserBanned);
        }

        let session = state
            .sessions
            .open(&claims.sid)
            .await?
            .ok_or(AppError::NotAuthenticated)?;

        let banned = session
            .lock()
            .await
            .user()
            .is_some_and(|user| user.is_banned());
        if banned {
            state.sessions.end(&claims.sid).await?;
            return Err(AppError::UserBanned);
        }

        Ok(CurrentSession {
            sid: claims.sid,
            session,
        })
    }
}

/// Whatever session the request carries, banned identities included. Used by
/// the access gate, which must see a banned identity to block it.
pub struct MaybeSession {
    pub sid: Option<String>,
    pub claimed_username: Option<String>,
    pub session: Option<SharedSession>,
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(claims) = verified_claims(parts, state) else {
            return Ok(MaybeSession {
                sid: None,
                claimed_username: None,
                session: None,
            });
        };
        let session = state.sessions.open(&claims.sid).await?;
        Ok(MaybeSession {
            sid: Some(claims.sid),
            claimed_username: Some(claims.sub),
            session,
        })
    }
}
