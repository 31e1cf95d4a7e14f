//! Demo authentication.
//!
//! Credentials are checked against configured values (one admin, one demo
//! user); signup validates the form and mints an unverified profile. There
//! is no account database: this gates the admin pages and the user
//! dashboard, nothing more.

pub mod session;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::types::{HubError, Role};

pub use session::{Session, SessionManager};

pub const MIN_PASSWORD_LEN: usize = 8;

/// Password length in UTF-16 code units, the unit browsers count in.
fn password_len(password: &str) -> usize {
    password.encode_utf16().count()
}

// ---------------------------------------------------------------------------
// Forms and profiles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminLoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    #[serde(default)]
    pub accept_terms: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub registration_date: DateTime<Utc>,
    pub is_verified: bool,
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

pub struct Credentials {
    admin_username: String,
    admin_password: SecretString,
    demo_email: String,
    demo_password: SecretString,
}

impl Credentials {
    pub fn new(
        admin_username: impl Into<String>,
        admin_password: SecretString,
        demo_email: impl Into<String>,
        demo_password: SecretString,
    ) -> Self {
        Self {
            admin_username: admin_username.into(),
            admin_password,
            demo_email: demo_email.into(),
            demo_password,
        }
    }

    pub fn from_config(cfg: &AuthConfig) -> Self {
        Self::new(
            cfg.admin_username.clone(),
            cfg.admin_password(),
            cfg.demo_user_email.clone(),
            cfg.demo_user_password(),
        )
    }

    pub fn login_user(&self, form: &LoginForm) -> Result<UserProfile, HubError> {
        if form.email.is_empty() || form.password.is_empty() {
            return Err(HubError::Validation("Please fill in all fields".into()));
        }
        if form.email != self.demo_email || form.password != *self.demo_password.expose_secret() {
            warn!(email = %form.email, "User login rejected");
            return Err(HubError::Unauthorized("Invalid email or password".into()));
        }
        info!(email = %form.email, "User logged in");
        Ok(UserProfile {
            id: Uuid::new_v4(),
            email: form.email.clone(),
            name: "John Doe".into(),
            role: Role::User,
            registration_date: Utc::now(),
            is_verified: true,
        })
    }

    pub fn login_admin(&self, form: &AdminLoginForm) -> Result<UserProfile, HubError> {
        if form.username != self.admin_username
            || form.password != *self.admin_password.expose_secret()
        {
            warn!(username = %form.username, "Admin login rejected");
            return Err(HubError::Unauthorized("Invalid username or password".into()));
        }
        info!(username = %form.username, "Admin logged in");
        Ok(UserProfile {
            id: Uuid::new_v4(),
            email: String::new(),
            name: self.admin_username.clone(),
            role: Role::Admin,
            registration_date: Utc::now(),
            is_verified: true,
        })
    }
}

// ---------------------------------------------------------------------------
// Signup
// ---------------------------------------------------------------------------

/// First failing rule wins.
pub fn validate_signup(form: &SignupForm) -> Result<(), HubError> {
    let fields = [
        &form.first_name,
        &form.last_name,
        &form.email,
        &form.password,
        &form.confirm_password,
    ];
    if fields.iter().any(|f| f.is_empty()) {
        return Err(HubError::Validation("Please fill in all fields".into()));
    }
    if password_len(&form.password) < MIN_PASSWORD_LEN {
        return Err(HubError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }
    if form.password != form.confirm_password {
        return Err(HubError::Validation("Passwords do not match".into()));
    }
    if !form.accept_terms {
        return Err(HubError::Validation("Please accept the Terms of Service".into()));
    }
    Ok(())
}

pub fn register(form: &SignupForm) -> Result<UserProfile, HubError> {
    validate_signup(form)?;
    let profile = UserProfile {
        id: Uuid::new_v4(),
        email: form.email.clone(),
        name: format!("{} {}", form.first_name, form.last_name),
        role: Role::User,
        registration_date: Utc::now(),
        is_verified: false,
    };
    info!(email = %profile.email, "Account created");
    Ok(profile)
}

// ---------------------------------------------------------------------------
// Password strength meter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PasswordStrength {
    pub score: u8,
    pub label: &'static str,
}

pub fn password_strength(password: &str) -> PasswordStrength {
    let len = password_len(password);
    let (score, label) = if len == 0 {
        (0, "")
    } else if len < 6 {
        (1, "Weak")
    } else if len < MIN_PASSWORD_LEN {
        (2, "Fair")
    } else if password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
    {
        (4, "Strong")
    } else {
        (3, "Good")
    };
    PasswordStrength { score, label }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
