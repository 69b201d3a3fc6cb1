use serde::{Deserialize, Serialize};

use super::goals::{Goal, MacroTargets};
use super::tracking::{LoggedActivity, LoggedMeal, Progress, Totals};
use crate::notify::Notification;

#[derive(Debug, Serialize)]
pub struct TargetsResponse {
    pub goal: Goal,
    /// Fixed per-goal table.
    pub targets: MacroTargets,
    /// 30/40/30 estimate from the same calorie budget.
    pub estimated: MacroTargets,
}

#[derive(Debug, Serialize)]
pub struct TrackingSummary {
    /// Most recent first.
    pub meals: Vec<LoggedMeal>,
    /// Most recent first.
    pub activities: Vec<LoggedActivity>,
    pub totals: Totals,
    pub targets: MacroTargets,
    pub progress: Progress,
}

#[derive(Debug, Deserialize)]
pub struct LogMealRequest {
    pub meal_id: String,
}

#[derive(Debug, Deserialize)]
pub struct LogActivityRequest {
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct LoggedResponse<T> {
    pub logged: T,
    pub totals: Totals,
    pub notification: Option<Notification>,
}
