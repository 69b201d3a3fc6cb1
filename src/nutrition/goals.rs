use serde::{Deserialize, Serialize};

use crate::session::user::User;

/// Shown on the dashboard before a profile exists.
pub const DEFAULT_RECOMMENDED_CALORIES: u32 = 2000;

/// Wellness goal chosen on the profile form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Goal {
    BurnFat,
    #[default]
    StayHealthy,
    Slim,
}

impl Goal {
    pub const ALL: [Goal; 3] = [Goal::BurnFat, Goal::StayHealthy, Goal::Slim];

    pub fn as_str(&self) -> &'static str {
        match self {
            Goal::BurnFat => "burn-fat",
            Goal::StayHealthy => "stay-healthy",
            Goal::Slim => "slim",
        }
    }
}

/// Daily calorie and macro gram targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MacroTargets {
    pub calories: u32,
    pub protein_g: u32,
    pub carbs_g: u32,
    pub fat_g: u32,
}

/// Fixed per-goal table. This is what tracking progress is measured against.
pub fn targets(goal: Goal) -> MacroTargets {
    let (calories, protein_g, carbs_g, fat_g) = match goal {
        Goal::BurnFat => (1800, 150, 100, 70),
        Goal::StayHealthy => (2200, 120, 250, 70),
        Goal::Slim => (1600, 120, 130, 55),
    };
    MacroTargets {
        calories,
        protein_g,
        carbs_g,
        fat_g,
    }
}

/// Generic 30/40/30 split of a calorie budget (4 kcal/g protein and carbs,
/// 9 kcal/g fat). Differs from [`targets`] for every goal.
pub fn estimate_macros(calories: u32) -> MacroTargets {
    let kcal = f64::from(calories);
    MacroTargets {
        calories,
        protein_g: (kcal * 0.30 / 4.0).round() as u32,
        carbs_g: (kcal * 0.40 / 4.0).round() as u32,
        fat_g: (kcal * 0.30 / 9.0).round() as u32,
    }
}

pub fn recommended_calories(user: Option<&User>) -> u32 {
    user.map(|u| targets(u.goal).calories)
        .unwrap_or(DEFAULT_RECOMMENDED_CALORIES)
}
