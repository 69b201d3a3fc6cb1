use std::sync::Arc;

use tracing::{info, warn};

use super::store::ProfileStore;
use super::user::{generate_session_id, is_banned, ProfileUpdate, User};
use crate::catalog::model::{ActivityTip, Meal};
use crate::error::AppError;
use crate::gate::{self, Access};
use crate::notify::{Notification, Notifier};
use crate::nutrition::goals::{self, MacroTargets};
use crate::nutrition::tracking::{aggregate, LoggedActivity, LoggedMeal, Totals};

pub const MEAL_LOGGED: &str = "Meal logged successfully!";
pub const ACTIVITY_ADDED: &str = "Activity added successfully!";

/// Everything one device's session owns: the identity, what was logged, and
/// the notification banner. Created at login (or restored from the profile
/// store), destroyed at logout.
pub struct SessionContext {
    device: String,
    store: Arc<dyn ProfileStore>,
    user: Option<User>,
    meals: Vec<LoggedMeal>,
    activities: Vec<LoggedActivity>,
    saved_plans: Vec<String>,
    notifier: Notifier,
}

impl SessionContext {
    pub fn new(device: impl Into<String>, store: Arc<dyn ProfileStore>, notifier: Notifier) -> Self {
        Self {
            device: device.into(),
            store,
            user: None,
            meals: Vec::new(),
            activities: Vec::new(),
            saved_plans: Vec::new(),
            notifier,
        }
    }

    /// Loads the persisted identity for `device`, if any. Logged meals and
    /// activities are not persisted and start empty.
    pub async fn restore(
        device: impl Into<String>,
        store: Arc<dyn ProfileStore>,
        notifier: Notifier,
    ) -> anyhow::Result<Self> {
        let mut ctx = Self::new(device, store, notifier);
        ctx.user = ctx.store.load(&ctx.device).await?;
        Ok(ctx)
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    /// Identity as stored, banned or not. Use [`Self::current_identity`] for
    /// anything past the gate.
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub async fn login(&mut self, username: &str) -> Result<&User, AppError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AppError::InvalidUsername);
        }
        if is_banned(username) {
            warn!(username, "banned user attempted login");
            return Err(AppError::UserBanned);
        }

        self.clear_logs();
        let user = User::new(username, generate_session_id());
        self.store.save(&self.device, &user).await?;
        info!(username, device = %self.device, "session started");
        Ok(&*self.user.insert(user))
    }

    pub async fn logout(&mut self) -> anyhow::Result<()> {
        if let Some(user) = self.user.take() {
            info!(username = %user.username, device = %self.device, "session ended");
        }
        self.clear_logs();
        self.notifier.dismiss();
        self.store.remove(&self.device).await
    }

    pub fn current_identity(&self) -> Result<&User, AppError> {
        match &self.user {
            None => Err(AppError::NotAuthenticated),
            Some(user) if user.is_banned() => Err(AppError::UserBanned),
            Some(user) => Ok(user),
        }
    }

    /// Identity that has passed every gate check.
    pub fn authenticated(&self) -> Result<&User, AppError> {
        let user = self.current_identity()?;
        if !user.is_profile_complete() {
            return Err(AppError::ProfileIncomplete);
        }
        Ok(user)
    }

    pub async fn update_profile(&mut self, update: ProfileUpdate) -> Result<&User, AppError> {
        let Some(current) = self.user.as_ref() else {
            return Err(AppError::NoActiveSession);
        };
        if current.is_banned() {
            return Err(AppError::UserBanned);
        }

        let mut updated = current.clone();
        update.apply_to(&mut updated)?;
        self.store.save(&self.device, &updated).await?;
        info!(
            username = %updated.username,
            complete = updated.is_profile_complete(),
            "profile updated"
        );
        Ok(&*self.user.insert(updated))
    }

    pub fn access(&self, selector: Option<&str>) -> Access {
        gate::evaluate(self.user.as_ref(), selector)
    }

    pub fn targets(&self) -> Result<MacroTargets, AppError> {
        Ok(goals::targets(self.authenticated()?.goal))
    }

    pub fn log_meal(&mut self, meal: &Meal) -> Result<&LoggedMeal, AppError> {
        let username = self.authenticated()?.username.clone();
        self.notifier.notify(MEAL_LOGGED);
        self.meals.push(LoggedMeal::new(meal, &username));
        let logged = &self.meals[self.meals.len() - 1];
        Ok(logged)
    }

    pub fn log_activity(&mut self, activity: &ActivityTip) -> Result<&LoggedActivity, AppError> {
        let username = self.authenticated()?.username.clone();
        self.notifier.notify(ACTIVITY_ADDED);
        self.activities.push(LoggedActivity::new(activity, &username));
        let logged = &self.activities[self.activities.len() - 1];
        Ok(logged)
    }

    /// Logged meals, oldest first.
    pub fn meals(&self) -> &[LoggedMeal] {
        &self.meals
    }

    /// Logged activities, oldest first.
    pub fn activities(&self) -> &[LoggedActivity] {
        &self.activities
    }

    pub fn totals(&self) -> Totals {
        aggregate(&self.meals, &self.activities)
    }

    /// Bookmarks or un-bookmarks a plan; returns whether it is now saved.
    pub fn toggle_saved_plan(&mut self, plan_id: &str) -> Result<bool, AppError> {
        self.authenticated()?;
        if let Some(pos) = self.saved_plans.iter().position(|id| id == plan_id) {
            self.saved_plans.remove(pos);
            return Ok(false);
        }
        self.saved_plans.push(plan_id.to_string());
        Ok(true)
    }

    pub fn saved_plans(&self) -> &[String] {
        &self.saved_plans
    }

    pub fn notification(&self) -> Option<Notification> {
        self.notifier.current()
    }

    fn clear_logs(&mut self) {
        self.meals.clear();
        self.activities.clear();
        self.saved_plans.clear();
    }
}
