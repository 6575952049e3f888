use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use uuid::Uuid;

use crate::config::AuthSettings;
use crate::db::repository;
use crate::error::AppError;
use crate::models::User;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Local user id.
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

pub fn issue_token(settings: &AuthSettings, user_id: i64) -> Result<String, AppError> {
    let now = Utc::now().timestamp();
    let ttl =
        i64::try_from(settings.token_ttl.as_secs()).map_err(|_| AppError::InternalServerError)?;
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now,
        exp: now + ttl,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.jwt_secret.as_bytes()),
    )
    .map_err(|e| {
        error!("failed to sign token: {}", e);
        AppError::InternalServerError
    })
}

/// Checks signature and expiry, returning the user id the token was issued to.
pub fn verify_token(settings: &AuthSettings, token: &str) -> Result<i64, AppError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        warn!("rejected token: {}", e);
        AppError::Unauthorized("Could not validate credentials".to_string())
    })?;

    data.claims
        .sub
        .parse()
        .map_err(|_| AppError::Unauthorized("Could not validate credentials".to_string()))
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes()).map_err(|e| {
        error!("failed to build password salt: {}", e);
        AppError::InternalServerError
    })?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!("failed to hash password: {}", e);
            AppError::InternalServerError
        })
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    PasswordHash::new(password_hash)
        .map(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
        .unwrap_or(false)
}

fn parse_authorization_bearer(value: &str) -> Option<&str> {
    let (prefix, rest) = value.trim().split_once(' ')?;
    if !prefix.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = rest.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

/// The user a request's bearer token belongs to.
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_authorization_bearer)
            .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

        let user_id = verify_token(&state.auth, token)?;

        let user = repository::find_user_by_id(&state.db, user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

        if !user.is_active {
            return Err(AppError::Unauthorized("Inactive user".to_string()));
        }

        Ok(CurrentUser(user))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn settings() -> AuthSettings {
        AuthSettings {
            jwt_secret: "test-secret".to_string(),
            token_ttl: Duration::from_secs(60),
        }
    }

    #[test]
    fn token_round_trips_to_user_id() {
        let token = issue_token(&settings(), 7).unwrap();
        assert_eq!(verify_token(&settings(), &token).unwrap(), 7);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = issue_token(&settings(), 7).unwrap();
        let other = AuthSettings {
            jwt_secret: "another-secret".to_string(),
            ..settings()
        };
        assert!(matches!(verify_token(&other, &token), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "7".to_string(),
            iat: now - 7200,
            exp: now - 3600,
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert!(verify_token(&settings(), &token).is_err());
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("hunter2").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
        assert!(!verify_password("hunter2", "not-a-hash"));
    }

    #[test]
    fn parses_bearer_header() {
        assert_eq!(parse_authorization_bearer("Bearer abc"), Some("abc"));
        assert_eq!(parse_authorization_bearer("bearer   abc "), Some("abc"));
        assert_eq!(parse_authorization_bearer("Basic abc"), None);
        assert_eq!(parse_authorization_bearer("Bearer "), None);
    }
}
