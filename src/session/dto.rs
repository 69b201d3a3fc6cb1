use serde::{Deserialize, Serialize};

use super::user::User;

/// Request body for register and login: the username is the whole credential.
#[derive(Debug, Deserialize)]
pub struct UsernameRequest {
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct IdentityResponse {
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: User,
    pub profile_complete: bool,
    pub bmi: Option<f64>,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            profile_complete: user.is_profile_complete(),
            bmi: user.bmi(),
            user,
        }
    }
}
