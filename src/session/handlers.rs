use axum::{
    extract::{FromRef, Query, State},
    http::{header::SET_COOKIE, HeaderMap, HeaderValue},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::{info, instrument};

use super::{
    dto::{IdentityResponse, LoginResponse, ProfileResponse, SuccessResponse, UsernameRequest},
    extractors::{session_cookie, CurrentSession, MaybeSession, CLEAR_SESSION_COOKIE},
    jwt::JwtKeys,
    user::{is_banned, ProfileUpdate},
};
use crate::{
    error::AppError,
    gate::{self, Access},
    state::AppState,
};

pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route("/profile", get(get_profile).patch(update_profile))
        .route("/view", get(view))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<UsernameRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.sessions.register(&payload.username).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// Logs in on this device. A session the caller already holds is replaced.
#[instrument(skip(state, previous, payload))]
pub async fn login(
    State(state): State<AppState>,
    previous: MaybeSession,
    Json(payload): Json<UsernameRequest>,
) -> Result<(HeaderMap, Json<LoginResponse>), AppError> {
    let (sid, session) = state
        .sessions
        .start(&payload.username, previous.sid.as_deref())
        .await?;
    let user = session.lock().await.current_identity()?.clone();

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(&user.username, &sid)?;

    let mut headers = HeaderMap::new();
    let cookie = HeaderValue::from_str(&session_cookie(&token, keys.ttl.as_secs()))
        .map_err(anyhow::Error::from)?;
    headers.insert(SET_COOKIE, cookie);

    info!(username = %user.username, %sid, "user logged in");
    Ok((
        headers,
        Json(LoginResponse {
            success: true,
            token,
            user,
        }),
    ))
}

#[instrument(skip(state, current))]
pub async fn logout(
    State(state): State<AppState>,
    current: CurrentSession,
) -> Result<(HeaderMap, Json<SuccessResponse>), AppError> {
    state.sessions.end(&current.sid).await?;
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, HeaderValue::from_static(CLEAR_SESSION_COOKIE));
    Ok((headers, Json(SuccessResponse::ok())))
}

#[instrument(skip(current))]
pub async fn me(current: CurrentSession) -> Result<Json<IdentityResponse>, AppError> {
    let ctx = current.session.lock().await;
    let user = ctx.current_identity()?;
    Ok(Json(IdentityResponse {
        username: user.username.clone(),
    }))
}

#[instrument(skip(current))]
pub async fn get_profile(current: CurrentSession) -> Result<Json<ProfileResponse>, AppError> {
    let ctx = current.session.lock().await;
    Ok(Json(ctx.current_identity()?.clone().into()))
}

#[instrument(skip(current, update))]
pub async fn update_profile(
    current: CurrentSession,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<ProfileResponse>, AppError> {
    let mut ctx = current.session.lock().await;
    let user = ctx.update_profile(update).await?.clone();
    Ok(Json(user.into()))
}

#[derive(Debug, Deserialize)]
pub struct ViewQuery {
    pub page: Option<String>,
}

/// Gate decision for the caller. Never fails on missing or banned identities;
/// those are states, not errors, here.
#[instrument(skip(maybe))]
pub async fn view(maybe: MaybeSession, Query(q): Query<ViewQuery>) -> Json<Access> {
    let selector = q.page.as_deref();
    let access = match maybe.session {
        Some(session) => session.lock().await.access(selector),
        None if maybe.claimed_username.as_deref().is_some_and(is_banned) => Access::Blocked,
        None => gate::evaluate(None, selector),
    };
    Json(access)
}
