/*
 * Responsibility
 * - Login / register request and response DTOs
 * - validate() does shape checks only; credential checks belong to the authenticator
 */
use serde::{Deserialize, Serialize};

use crate::services::auth::claims::Token;
use crate::services::auth::{Credentials, Registration};

// Missing fields deserialize as blank so they get the same 400 as empty strings.
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        validate_email_password(&self.email, &self.password)
    }
}

impl From<RegisterRequest> for Registration {
    fn from(req: RegisterRequest) -> Self {
        Registration {
            firstname: req.firstname,
            lastname: req.lastname,
            email: req.email.trim().to_string(),
            password: req.password,
        }
    }
}

#[derive(Deserialize)]
pub struct AuthenticateRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl AuthenticateRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        validate_email_password(&self.email, &self.password)
    }
}

impl From<AuthenticateRequest> for Credentials {
    fn from(req: AuthenticateRequest) -> Self {
        Credentials {
            email: req.email.trim().to_string(),
            password: req.password,
        }
    }
}

fn validate_email_password(email: &str, password: &str) -> Result<(), &'static str> {
    if email.trim().is_empty() {
        return Err("email is required");
    }
    if password.is_empty() {
        return Err("password is required");
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct AuthenticationResponse {
    pub token: Token,
}
