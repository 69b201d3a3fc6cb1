//! Filters over the reference dataset. None of these fail: an empty result is
//! a valid answer.

use tracing::warn;

use super::model::{ActivityTip, Dietician, Intensity, Meal, MealPlan};
use crate::nutrition::goals::Goal;

/// Specialization selector that disables the specialization filter.
pub const ALL_SPECIALIZATIONS: &str = "all";

/// Meals from every plan whose name contains `term`, ignoring case.
/// An empty term matches nothing so results only appear once the user types.
pub fn search_meals<'a>(plans: &'a [MealPlan], term: &str) -> Vec<&'a Meal> {
    if term.is_empty() {
        return Vec::new();
    }
    let needle = term.to_lowercase();
    plans
        .iter()
        .flat_map(|plan| plan.meals.iter())
        .filter(|meal| meal.name.to_lowercase().contains(&needle))
        .collect()
}

pub fn find_meal<'a>(plans: &'a [MealPlan], meal_id: &str) -> Option<&'a Meal> {
    plans
        .iter()
        .flat_map(|plan| plan.meals.iter())
        .find(|meal| meal.id == meal_id)
}

/// Plans suitable for `goal`. Falls back to the whole catalog when nothing
/// matches.
pub fn plans_for_goal(plans: &[MealPlan], goal: Goal) -> Vec<&MealPlan> {
    let matching: Vec<&MealPlan> = plans
        .iter()
        .filter(|plan| plan.suitable_for.contains(&goal))
        .collect();
    if matching.is_empty() {
        warn!(goal = goal.as_str(), "no meal plan matches goal; returning full catalog");
        return plans.iter().collect();
    }
    matching
}

/// Dieticians narrowed by specialization (unless `"all"`) and, when
/// `filter_by_allergies` is set and the user has allergies, by expertise
/// mentioning any of them.
pub fn dieticians_for<'a>(
    dieticians: &'a [Dietician],
    specialization: &str,
    filter_by_allergies: bool,
    allergies: &[String],
) -> Vec<&'a Dietician> {
    let allergies: Vec<String> = allergies.iter().map(|a| a.to_lowercase()).collect();
    let apply_allergies = filter_by_allergies && !allergies.is_empty();

    dieticians
        .iter()
        .filter(|d| specialization == ALL_SPECIALIZATIONS || d.specialization == specialization)
        .filter(|d| {
            !apply_allergies
                || d.expertise.iter().any(|exp| {
                    let exp = exp.to_lowercase();
                    allergies.iter().any(|allergy| exp.contains(allergy.as_str()))
                })
        })
        .collect()
}

/// `"all"` followed by each distinct specialization in catalog order.
pub fn specializations(dieticians: &[Dietician]) -> Vec<&str> {
    let mut out = vec![ALL_SPECIALIZATIONS];
    for d in dieticians {
        if !out.contains(&d.specialization.as_str()) {
            out.push(d.specialization.as_str());
        }
    }
    out
}

/// Activity tips worth suggesting for a goal on the dashboard.
pub fn tips_for_goal(tips: &[ActivityTip], goal: Goal) -> Vec<&ActivityTip> {
    tips.iter()
        .filter(|tip| match goal {
            Goal::BurnFat => matches!(tip.intensity, Intensity::Medium | Intensity::High),
            Goal::Slim => tip.intensity != Intensity::Low,
            Goal::StayHealthy => true,
        })
        .collect()
}

pub fn find_activity<'a>(tips: &'a [ActivityTip], title: &str) -> Option<&'a ActivityTip> {
    tips.iter().find(|tip| tip.title == title)
}
