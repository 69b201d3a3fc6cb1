use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{
    model::{ActivityTip, Dietician, Meal, MealPlan},
    query::{dieticians_for, plans_for_goal, search_meals, specializations, ALL_SPECIALIZATIONS},
};
use crate::{
    error::AppError, nutrition::goals::Goal, session::extractors::CurrentSession, state::AppState,
};

pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/catalog/plans", get(list_plans))
        .route("/catalog/plans/:id/save", post(toggle_saved_plan))
        .route("/catalog/meals", get(search))
        .route("/catalog/dieticians", get(list_dieticians))
        .route("/catalog/specializations", get(list_specializations))
        .route("/catalog/activities", get(list_activities))
}

#[derive(Debug, Deserialize)]
pub struct PlansQuery {
    pub goal: Option<Goal>,
}

#[derive(Debug, Serialize)]
pub struct PlanItem {
    #[serde(flatten)]
    pub plan: MealPlan,
    pub saved: bool,
}

/// Plans for the requested goal, defaulting to the caller's own goal.
#[instrument(skip(state, current))]
pub async fn list_plans(
    State(state): State<AppState>,
    current: CurrentSession,
    Query(q): Query<PlansQuery>,
) -> Result<Json<Vec<PlanItem>>, AppError> {
    let ctx = current.session.lock().await;
    let goal = q.goal.unwrap_or(ctx.authenticated()?.goal);

    let items = plans_for_goal(state.catalog.meal_plans(), goal)
        .into_iter()
        .map(|plan| PlanItem {
            saved: ctx.saved_plans().contains(&plan.id),
            plan: plan.clone(),
        })
        .collect();
    Ok(Json(items))
}

#[derive(Debug, Serialize)]
pub struct SavedResponse {
    pub id: String,
    pub saved: bool,
}

#[instrument(skip(state, current))]
pub async fn toggle_saved_plan(
    State(state): State<AppState>,
    current: CurrentSession,
    Path(id): Path<String>,
) -> Result<Json<SavedResponse>, AppError> {
    if !state.catalog.meal_plans().iter().any(|p| p.id == id) {
        return Err(AppError::NotFound("Meal plan"));
    }
    let saved = current.session.lock().await.toggle_saved_plan(&id)?;
    Ok(Json(SavedResponse { id, saved }))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[instrument(skip(state, current))]
pub async fn search(
    State(state): State<AppState>,
    current: CurrentSession,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Meal>>, AppError> {
    current.session.lock().await.authenticated()?;
    let meals = search_meals(state.catalog.meal_plans(), &query.q)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(meals))
}

fn default_specialization() -> String {
    ALL_SPECIALIZATIONS.to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct DieticianQuery {
    #[serde(default = "default_specialization")]
    pub specialization: String,
    #[serde(default = "default_true")]
    pub filter_by_allergies: bool,
}

/// Filtered dieticians. An empty list is a normal answer; the client offers a
/// reset.
#[instrument(skip(state, current))]
pub async fn list_dieticians(
    State(state): State<AppState>,
    current: CurrentSession,
    Query(q): Query<DieticianQuery>,
) -> Result<Json<Vec<Dietician>>, AppError> {
    let ctx = current.session.lock().await;
    let user = ctx.authenticated()?;
    let found = dieticians_for(
        state.catalog.dieticians(),
        &q.specialization,
        q.filter_by_allergies,
        &user.allergies,
    )
    .into_iter()
    .cloned()
    .collect();
    Ok(Json(found))
}

#[instrument(skip(state))]
pub async fn list_specializations(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(
        specializations(state.catalog.dieticians())
            .into_iter()
            .map(str::to_string)
            .collect(),
    )
}

#[instrument(skip(state))]
pub async fn list_activities(State(state): State<AppState>) -> Json<Vec<ActivityTip>> {
    Json(state.catalog.activity_tips().to_vec())
}
