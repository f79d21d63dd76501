use crate::auth::config::SessionJwtConfig;
use crate::models::common::UserRole;
use crate::models::user::UserProfile;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, thiserror::Error)]
pub enum SessionJwtError {
    #[error("signing error: {0}")]
    Sign(String),
    #[error("verification error: {0}")]
    Verify(String),
}

#[derive(Serialize, Deserialize)]
struct SessionClaims {
    iss: String,
    aud: String,
    sub: String, // external identity id
    role: String,
    email: String,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    phone: Option<String>,
    iat: u64,
    exp: u64,
}

fn now_secs() -> Result<u64, SessionJwtError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| SessionJwtError::Sign(e.to_string()))
}

pub fn issue_session_jwt(
    profile: &UserProfile,
    cfg: &SessionJwtConfig,
) -> Result<String, SessionJwtError> {
    let now = now_secs()?;
    let claims = SessionClaims {
        iss: cfg.issuer.clone(),
        aud: cfg.audience.clone(),
        sub: profile.external_id.clone(),
        role: profile.role.as_str().to_string(),
        email: profile.email.clone(),
        name: profile.name.clone(),
        phone: profile.phone.clone(),
        iat: now,
        exp: now + cfg.expiry_secs,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(cfg.secret.as_bytes()),
    )
    .map_err(|e| SessionJwtError::Sign(e.to_string()))
}

/// Checks signature, issuer, audience and expiry, and returns the profile
/// carried by the token.
pub fn verify_session_jwt(
    token: &str,
    cfg: &SessionJwtConfig,
) -> Result<UserProfile, SessionJwtError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[cfg.issuer.as_str()]);
    validation.set_audience(&[cfg.audience.as_str()]);
    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(cfg.secret.as_bytes()),
        &validation,
    )
    .map_err(|e| SessionJwtError::Verify(e.to_string()))?;

    let claims = data.claims;
    let role = UserRole::get_enum_from_str(&claims.role)
        .ok_or_else(|| SessionJwtError::Verify(format!("unknown role: {}", claims.role)))?;
    Ok(UserProfile {
        external_id: claims.sub,
        name: claims.name,
        email: claims.email,
        phone: claims.phone,
        role,
    })
}
