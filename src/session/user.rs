use lazy_static::lazy_static;
use rand::{distributions::Alphanumeric, Rng};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::nutrition::goals::Goal;

/// The one username that may never reach the application.
pub const BANNED_USERNAME: &str = "dog";

const SESSION_ID_LEN: usize = 13;

/// Identity and profile of the person using this session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub height: f64, // cm, 0 until the profile is completed
    pub weight: f64, // kg, 0 until the profile is completed
    pub goal: Goal,
    #[serde(default)]
    pub allergies: Vec<String>,
    pub session_id: String,
}

impl User {
    /// Fresh identity as created at login: no measurements, default goal.
    pub fn new(username: &str, session_id: String) -> Self {
        Self {
            username: username.to_string(),
            height: 0.0,
            weight: 0.0,
            goal: Goal::default(),
            allergies: Vec::new(),
            session_id,
        }
    }

    pub fn is_banned(&self) -> bool {
        is_banned(&self.username)
    }

    pub fn is_profile_complete(&self) -> bool {
        is_profile_complete(self)
    }

    /// Body mass index to one decimal, once height and weight are known.
    pub fn bmi(&self) -> Option<f64> {
        if !self.is_profile_complete() {
            return None;
        }
        let meters = self.height / 100.0;
        Some((self.weight / (meters * meters) * 10.0).round() / 10.0)
    }
}

pub fn is_banned(username: &str) -> bool {
    username == BANNED_USERNAME
}

pub fn is_profile_complete(user: &User) -> bool {
    user.height > 0.0 && user.weight > 0.0
}

/// Opaque token stamped on a new identity.
pub fn generate_session_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_ID_LEN)
        .map(char::from)
        .collect()
}

/// Numeric profile field as submitted: a JSON number or the raw form text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumberInput {
    Number(f64),
    Text(String),
}

impl NumberInput {
    /// Accepts finite values above zero.
    pub fn positive(&self, field: &'static str) -> Result<f64, AppError> {
        let value = match self {
            NumberInput::Number(n) => *n,
            NumberInput::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| AppError::InvalidProfileValue { field })?,
        };
        if !value.is_finite() || value <= 0.0 {
            return Err(AppError::InvalidProfileValue { field });
        }
        Ok(value)
    }
}

/// Allergies as a list or as the comma separated form field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AllergyInput {
    List(Vec<String>),
    Text(String),
}

impl AllergyInput {
    pub fn into_list(self) -> Vec<String> {
        match self {
            AllergyInput::List(items) => items
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            AllergyInput::Text(text) => parse_allergies(&text),
        }
    }
}

pub fn parse_allergies(text: &str) -> Vec<String> {
    lazy_static! {
        static ref SEPARATOR_RE: Regex = Regex::new(r"\s*,\s*").unwrap();
    }
    SEPARATOR_RE
        .split(text.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Partial profile update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub height: Option<NumberInput>,
    pub weight: Option<NumberInput>,
    pub goal: Option<Goal>,
    pub allergies: Option<AllergyInput>,
}

impl ProfileUpdate {
    /// Validates every supplied field before touching `user`, so a rejected
    /// update leaves the profile unchanged.
    pub fn apply_to(self, user: &mut User) -> Result<(), AppError> {
        let height = self.height.map(|h| h.positive("height")).transpose()?;
        let weight = self.weight.map(|w| w.positive("weight")).transpose()?;

        if let Some(height) = height {
            user.height = height;
        }
        if let Some(weight) = weight {
            user.weight = weight;
        }
        if let Some(goal) = self.goal {
            user.goal = goal;
        }
        if let Some(allergies) = self.allergies {
            user.allergies = allergies.into_list();
        }
        Ok(())
    }
}
