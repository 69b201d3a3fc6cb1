use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{LogActivityRequest, LogMealRequest, LoggedResponse, TargetsResponse, TrackingSummary},
    goals::{estimate_macros, targets},
    tracking::{LoggedActivity, LoggedMeal, Progress},
};
use crate::{
    catalog::query::{find_activity, find_meal},
    error::AppError,
    notify::Notification,
    session::extractors::CurrentSession,
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/targets", get(get_targets))
        .route("/tracking", get(get_tracking))
        .route("/notification", get(get_notification))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/tracking/meals", post(log_meal))
        .route("/tracking/activities", post(log_activity))
}

#[instrument(skip(current))]
pub async fn get_targets(current: CurrentSession) -> Result<Json<TargetsResponse>, AppError> {
    let ctx = current.session.lock().await;
    let goal = ctx.authenticated()?.goal;
    let fixed = targets(goal);
    Ok(Json(TargetsResponse {
        goal,
        targets: fixed,
        estimated: estimate_macros(fixed.calories),
    }))
}

#[instrument(skip(current))]
pub async fn get_tracking(current: CurrentSession) -> Result<Json<TrackingSummary>, AppError> {
    let ctx = current.session.lock().await;
    let goal_targets = ctx.targets()?;
    let totals = ctx.totals();
    Ok(Json(TrackingSummary {
        meals: ctx.meals().iter().rev().cloned().collect(),
        activities: ctx.activities().iter().rev().cloned().collect(),
        progress: Progress::against(&totals, &goal_targets),
        totals,
        targets: goal_targets,
    }))
}

#[instrument(skip(state, current))]
pub async fn log_meal(
    State(state): State<AppState>,
    current: CurrentSession,
    Json(req): Json<LogMealRequest>,
) -> Result<(StatusCode, Json<LoggedResponse<LoggedMeal>>), AppError> {
    let Some(meal) = find_meal(state.catalog.meal_plans(), &req.meal_id) else {
        warn!(meal_id = %req.meal_id, "unknown meal");
        return Err(AppError::NotFound("Meal"));
    };

    let mut ctx = current.session.lock().await;
    let logged = ctx.log_meal(meal)?.clone();
    info!(username = %logged.username, meal_id = %logged.meal.id, "meal logged");
    Ok((
        StatusCode::CREATED,
        Json(LoggedResponse {
            logged,
            totals: ctx.totals(),
            notification: ctx.notification(),
        }),
    ))
}

#[instrument(skip(state, current))]
pub async fn log_activity(
    State(state): State<AppState>,
    current: CurrentSession,
    Json(req): Json<LogActivityRequest>,
) -> Result<(StatusCode, Json<LoggedResponse<LoggedActivity>>), AppError> {
    let Some(activity) = find_activity(state.catalog.activity_tips(), &req.title) else {
        warn!(title = %req.title, "unknown activity");
        return Err(AppError::NotFound("Activity"));
    };

    let mut ctx = current.session.lock().await;
    let logged = ctx.log_activity(activity)?.clone();
    info!(username = %logged.username, title = %logged.activity.title, "activity logged");
    Ok((
        StatusCode::CREATED,
        Json(LoggedResponse {
            logged,
            totals: ctx.totals(),
            notification: ctx.notification(),
        }),
    ))
}

#[instrument(skip(current))]
pub async fn get_notification(
    current: CurrentSession,
) -> Result<Json<Option<Notification>>, AppError> {
    let ctx = current.session.lock().await;
    ctx.current_identity()?;
    Ok(Json(ctx.notification()))
}
