//! Decides which top-level screen a session may see. Recomputed from the
//! current identity on every call; there is no stored gate state.

use serde::Serialize;

use crate::session::user::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum View {
    Dashboard,
    MealPlans,
    TrackMeals,
    ContactDietician,
}

impl View {
    pub const ALL: [View; 4] = [
        View::Dashboard,
        View::MealPlans,
        View::TrackMeals,
        View::ContactDietician,
    ];

    /// Unknown or missing selectors land on the dashboard.
    pub fn select(selector: Option<&str>) -> View {
        match selector {
            Some("mealPlans") => View::MealPlans,
            Some("trackMeals") => View::TrackMeals,
            Some("contactDietician") => View::ContactDietician,
            _ => View::Dashboard,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::MealPlans => "Meal Plans",
            View::TrackMeals => "Track Meals",
            View::ContactDietician => "Contact Dietician",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "access", content = "view", rename_all = "snake_case")]
pub enum Access {
    Blocked,
    Unauthenticated,
    ProfileIncomplete,
    Authenticated(View),
}

/// Banned identity wins over everything, including a missing profile, so a
/// stale stored session for that name can never get through.
pub fn evaluate(identity: Option<&User>, selector: Option<&str>) -> Access {
    match identity {
        Some(user) if user.is_banned() => Access::Blocked,
        None => Access::Unauthenticated,
        Some(user) if !user.is_profile_complete() => Access::ProfileIncomplete,
        Some(_) => Access::Authenticated(View::select(selector)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::goals::Goal;

    fn user(name: &str, height: f64, weight: f64) -> User {
        let mut u = User::new(name, "s".into());
        u.height = height;
        u.weight = weight;
        u
    }

    #[test]
    fn banned_is_blocked_regardless_of_profile() {
        assert_eq!(evaluate(Some(&user("dog", 0.0, 0.0)), None), Access::Blocked);
        assert_eq!(
            evaluate(Some(&user("dog", 180.0, 80.0)), Some("trackMeals")),
            Access::Blocked
        );
    }

    #[test]
    fn no_identity_is_unauthenticated() {
        assert_eq!(evaluate(None, Some("mealPlans")), Access::Unauthenticated);
    }

    #[test]
    fn missing_measurement_needs_profile() {
        assert_eq!(
            evaluate(Some(&user("ana", 0.0, 70.0)), None),
            Access::ProfileIncomplete
        );
        assert_eq!(
            evaluate(Some(&user("ana", 170.0, 0.0)), None),
            Access::ProfileIncomplete
        );
    }

    #[test]
    fn complete_profile_reaches_selected_view() {
        let mut u = user("ana", 170.0, 65.0);
        u.goal = Goal::Slim;
        assert_eq!(evaluate(Some(&u), None), Access::Authenticated(View::Dashboard));
        assert_eq!(
            evaluate(Some(&u), Some("contactDietician")),
            Access::Authenticated(View::ContactDietician)
        );
        assert_eq!(
            evaluate(Some(&u), Some("settings")),
            Access::Authenticated(View::Dashboard)
        );
    }

    #[test]
    fn evaluation_is_idempotent() {
        let u = user("ana", 170.0, 65.0);
        assert_eq!(evaluate(Some(&u), Some("mealPlans")), evaluate(Some(&u), Some("mealPlans")));
    }

    #[test]
    fn access_serializes_with_view() {
        let json = serde_json::to_value(Access::Authenticated(View::TrackMeals)).unwrap();
        assert_eq!(json["access"], "authenticated");
        assert_eq!(json["view"], "trackMeals");
        let json = serde_json::to_value(Access::ProfileIncomplete).unwrap();
        assert_eq!(json["access"], "profile_incomplete");
    }
}
