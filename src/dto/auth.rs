use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

pub const MIN_PASSWORD_LENGTH: u64 = 8;

#[derive(Deserialize, Debug, Validate, ToSchema)]
pub struct SignupRequest {
    #[validate(
        length(min = 1, max = 150, message = "Username must be 1 to 150 characters"),
        custom(function = "validate_username")
    )]
    pub username: String,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub password1: String,
    #[validate(must_match(other = "password1", message = "The two password fields didn't match"))]
    pub password2: String,
}

impl SignupRequest {
    /// The email is optional; a blank one means none was given.
    pub fn normalized(self) -> Self {
        let email = self
            .email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());
        Self { email, ..self }
    }
}

/// Describes the sign-up form for clients that render it.
#[derive(Debug, Serialize, ToSchema)]
pub struct SignupForm {
    pub fields: Vec<&'static str>,
    pub required: Vec<&'static str>,
    pub min_password_length: u64,
}

impl Default for SignupForm {
    fn default() -> Self {
        Self {
            fields: vec!["username", "email", "password1", "password2"],
            required: vec!["username", "password1", "password2"],
            min_password_length: MIN_PASSWORD_LENGTH,
        }
    }
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    /// Server-side session backing this token.
    pub sid: String,
    pub exp: usize,
}

/// Letters, digits and `@ . + - _` only.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let valid = username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'));
    if valid {
        return Ok(());
    }
    let mut err = ValidationError::new("invalid_username");
    err.message = Some("Username may contain only letters, numbers, and @/./+/-/_ characters".into());
    Err(err)
}
