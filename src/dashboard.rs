use axum::{extract::State, routing::get, Json, Router};
use rand::seq::SliceRandom;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::instrument;

use crate::{
    catalog::{
        model::{ActivityTip, Quote},
        provider::CatalogProvider,
        query::tips_for_goal,
    },
    error::AppError,
    nutrition::goals::{estimate_macros, recommended_calories, Goal, MacroTargets},
    session::{extractors::CurrentSession, user::User},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard", get(get_dashboard))
}

pub fn greeting(hour: u8) -> &'static str {
    match hour {
        0..=11 => "Good morning",
        12..=17 => "Good afternoon",
        _ => "Good evening",
    }
}

fn local_hour() -> u8 {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .hour()
}

#[derive(Debug, Serialize)]
pub struct Stats {
    pub height: f64,
    pub weight: f64,
    pub bmi: Option<f64>,
    pub goal: Goal,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub greeting: &'static str,
    pub username: String,
    pub recommended_calories: u32,
    pub macros: MacroTargets,
    pub quote: Option<Quote>,
    pub tip: Option<ActivityTip>,
    pub stats: Stats,
}

impl DashboardResponse {
    fn build(user: &User, catalog: &dyn CatalogProvider, hour: u8) -> Self {
        let calories = recommended_calories(Some(user));
        let mut rng = rand::thread_rng();
        let quote = catalog.quotes().choose(&mut rng).cloned();
        let tip = tips_for_goal(catalog.activity_tips(), user.goal)
            .choose(&mut rng)
            .map(|tip| (*tip).clone());

        Self {
            greeting: greeting(hour),
            username: user.username.clone(),
            recommended_calories: calories,
            macros: estimate_macros(calories),
            quote,
            tip,
            stats: Stats {
                height: user.height,
                weight: user.weight,
                bmi: user.bmi(),
                goal: user.goal,
            },
        }
    }
}

#[instrument(skip(state, current))]
pub async fn get_dashboard(
    State(state): State<AppState>,
    current: CurrentSession,
) -> Result<Json<DashboardResponse>, AppError> {
    let ctx = current.session.lock().await;
    let user = ctx.authenticated()?;
    Ok(Json(DashboardResponse::build(
        user,
        state.catalog.as_ref(),
        local_hour(),
    )))
}
