use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::ApiError;
use crate::models::{Role, User};
use crate::settings::Settings;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id (ObjectId hex).
    pub sub: String,
    pub email: String,
    pub role: Role,
    pub exp: i64,
}

pub fn hash_password(plain: &str) -> Result<String, ApiError> {
    bcrypt::hash(plain, bcrypt::DEFAULT_COST).map_err(|err| {
        error!("Password hashing failed: {err}");
        ApiError::Internal("Failed to process password".into())
    })
}

pub fn verify_password(plain: &str, hash: &str) -> bool {
    bcrypt::verify(plain, hash).unwrap_or(false)
}

pub fn issue_token(settings: &Settings, user: &User) -> Result<String, ApiError> {
    let exp = (Utc::now() + Duration::hours(settings.token_ttl_hours)).timestamp();
    let claims = Claims {
        sub: user.id.clone(),
        email: user.email.clone(),
        role: user.role,
        exp,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.jwt_secret.as_bytes()),
    )
    .map_err(|err| {
        error!("Token issuance failed: {err}");
        ApiError::Internal("Failed to issue token".into())
    })
}

pub fn verify_token(
    settings: &Settings,
    auth: Option<Authorization<Bearer>>,
) -> Result<Claims, ApiError> {
    let Some(auth) = auth else {
        return Err(ApiError::Unauthorized("Missing bearer token".into()));
    };
    let data = decode::<Claims>(
        auth.token(),
        &DecodingKey::from_secret(settings.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| ApiError::Unauthorized("Invalid authentication token".into()))?;
    Ok(data.claims)
}

pub fn require_role(claims: &Claims, role: Role) -> Result<(), ApiError> {
    if claims.role == role {
        Ok(())
    } else {
        Err(ApiError::Forbidden(format!("{role} access required")))
    }
}
