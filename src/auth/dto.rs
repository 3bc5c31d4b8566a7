use serde::{Deserialize, Serialize};

use crate::flash::Flash;

/// Form body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Form body for login.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Payload backing the register and login pages.
#[derive(Debug, Serialize)]
pub struct AuthPage {
    pub flash: Option<Flash>,
}
