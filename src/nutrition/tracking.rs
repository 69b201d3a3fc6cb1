use serde::Serialize;
use time::OffsetDateTime;

use super::goals::MacroTargets;
use crate::catalog::model::{ActivityTip, Meal};

/// A catalog meal the user ate, snapshotted at log time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoggedMeal {
    #[serde(flatten)]
    pub meal: Meal,
    #[serde(with = "time::serde::rfc3339")]
    pub logged_at: OffsetDateTime,
    pub username: String,
}

impl LoggedMeal {
    pub fn new(meal: &Meal, username: &str) -> Self {
        Self {
            meal: meal.clone(),
            logged_at: OffsetDateTime::now_utc(),
            username: username.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoggedActivity {
    #[serde(flatten)]
    pub activity: ActivityTip,
    #[serde(with = "time::serde::rfc3339")]
    pub logged_at: OffsetDateTime,
    pub username: String,
}

impl LoggedActivity {
    pub fn new(activity: &ActivityTip, username: &str) -> Self {
        Self {
            activity: activity.clone(),
            logged_at: OffsetDateTime::now_utc(),
            username: username.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub calories: u32,
    pub protein: u32,
    pub carbs: u32,
    pub fat: u32,
    pub burned_calories: u32,
    pub net_calories: i64, // may go negative
}

/// Sums logged intake and burn. Empty input gives all zeros.
pub fn aggregate(meals: &[LoggedMeal], activities: &[LoggedActivity]) -> Totals {
    let mut totals = meals.iter().fold(Totals::default(), |mut acc, logged| {
        acc.calories += logged.meal.calories;
        acc.protein += logged.meal.protein;
        acc.carbs += logged.meal.carbs;
        acc.fat += logged.meal.fat;
        acc
    });
    totals.burned_calories = activities
        .iter()
        .map(|logged| logged.activity.calories_burned)
        .sum();
    totals.net_calories = i64::from(totals.calories) - i64::from(totals.burned_calories);
    totals
}

/// Progress bar fill, clamped to 100. A zero target counts as reached.
pub fn percentage(current: u32, target: u32) -> u32 {
    if target == 0 {
        return 100;
    }
    let pct = (f64::from(current) / f64::from(target) * 100.0).round();
    (pct as u32).min(100)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub calories: u32,
    pub protein: u32,
    pub carbs: u32,
    pub fat: u32,
}

impl Progress {
    pub fn against(totals: &Totals, targets: &MacroTargets) -> Self {
        Self {
            calories: percentage(totals.calories, targets.calories),
            protein: percentage(totals.protein, targets.protein_g),
            carbs: percentage(totals.carbs, targets.carbs_g),
            fat: percentage(totals.fat, targets.fat_g),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::model::Intensity;
    use crate::nutrition::goals::{targets, Goal};

    fn meal(id: &str, calories: u32, protein: u32, carbs: u32, fat: u32) -> Meal {
        Meal {
            id: id.into(),
            name: format!("meal {id}"),
            calories,
            protein,
            carbs,
            fat,
            time: None,
            image_url: None,
            instructions: None,
        }
    }

    fn activity(burned: u32) -> ActivityTip {
        ActivityTip {
            title: "Walk".into(),
            description: "walk".into(),
            image_url: String::new(),
            calories_burned: burned,
            duration_minutes: 30,
            intensity: Intensity::Medium,
        }
    }

    #[test]
    fn empty_logs_aggregate_to_zero() {
        assert_eq!(aggregate(&[], &[]), Totals::default());
    }

    #[test]
    fn sums_meals_and_activities() {
        let meals = vec![
            LoggedMeal::new(&meal("a", 450, 35, 30, 20), "ana"),
            LoggedMeal::new(&meal("b", 550, 45, 25, 25), "ana"),
        ];
        let activities = vec![
            LoggedActivity::new(&activity(200), "ana"),
            LoggedActivity::new(&activity(150), "ana"),
        ];
        let totals = aggregate(&meals, &activities);
        assert_eq!(
            totals,
            Totals {
                calories: 1000,
                protein: 80,
                carbs: 55,
                fat: 45,
                burned_calories: 350,
                net_calories: 650,
            }
        );
    }

    #[test]
    fn net_calories_can_be_negative() {
        let meals = vec![LoggedMeal::new(&meal("a", 100, 1, 1, 1), "ana")];
        let activities = vec![LoggedActivity::new(&activity(200), "ana")];
        assert_eq!(aggregate(&meals, &activities).net_calories, -100);
    }

    #[test]
    fn meal_order_does_not_matter() {
        let a = LoggedMeal::new(&meal("a", 300, 20, 30, 10), "ana");
        let b = LoggedMeal::new(&meal("b", 650, 55, 40, 20), "ana");
        let c = LoggedMeal::new(&meal("c", 250, 10, 30, 10), "ana");
        let forward = aggregate(&[a.clone(), b.clone(), c.clone()], &[]);
        let backward = aggregate(&[c, a, b], &[]);
        assert_eq!(forward, backward);
    }

    #[test]
    fn percentage_rounds_and_clamps() {
        assert_eq!(percentage(50, 100), 50);
        assert_eq!(percentage(150, 100), 100);
        assert_eq!(percentage(0, 100), 0);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(10, 0), 100);
    }

    #[test]
    fn progress_uses_goal_table() {
        let totals = Totals {
            calories: 900,
            protein: 75,
            carbs: 200,
            fat: 70,
            burned_calories: 0,
            net_calories: 900,
        };
        let progress = Progress::against(&totals, &targets(Goal::BurnFat));
        assert_eq!(
            progress,
            Progress { calories: 50, protein: 50, carbs: 100, fat: 100 }
        );
    }

    #[test]
    fn logged_meal_serializes_flat() {
        let logged = LoggedMeal::new(&meal("m2", 550, 45, 25, 25), "ana");
        let json = serde_json::to_value(&logged).unwrap();
        assert_eq!(json["id"], "m2");
        assert_eq!(json["calories"], 550);
        assert_eq!(json["username"], "ana");
        assert!(json["logged_at"].is_string());
    }
}
