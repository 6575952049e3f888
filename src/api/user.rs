use axum::Json;
use axum::extract::State;
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use super::DataResponse;
use super::auth::{CurrentUser, hash_password, issue_token, verify_password};
use crate::db::repository;
use crate::error::AppError;
use crate::models::{
    CasBindRequest, ChangePasswordRequest, LoginRequest, NewUserRequest, TokenResponse,
    UpdateUserRequest, UserProfile,
};
use crate::state::AppState;
use crate::ucloud::CasCredentials;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<NewUserRequest>,
) -> Result<Json<DataResponse<UserProfile>>, AppError> {
    let username = req.username.trim();
    if username.is_empty() || req.password.is_empty() {
        return Err(AppError::BadRequest("Username and password are required".to_string()));
    }
    if repository::find_user_by_username(&state.db, username).await?.is_some() {
        return Err(AppError::Conflict("Username already registered".to_string()));
    }

    let password_hash = hash_password(&req.password)?;
    let user = repository::insert_user(
        &state.db,
        username,
        req.email.as_deref().filter(|e| !e.trim().is_empty()),
        req.full_name.as_deref(),
        &password_hash,
    )
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict("Username or email already registered".to_string())
        }
        other => AppError::Database(other),
    })?;

    info!("Registered user {}", user.username);
    Ok(Json(DataResponse::new(user.into())))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let user = repository::find_user_by_username(&state.db, req.username.trim())
        .await?
        .filter(|user| verify_password(&req.password, &user.password_hash))
        .ok_or_else(|| AppError::Unauthorized("Incorrect username or password".to_string()))?;

    if !user.is_active {
        return Err(AppError::BadRequest("Inactive user".to_string()));
    }

    let access_token = issue_token(&state.auth, user.id)?;
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
    }))
}

pub async fn me(CurrentUser(user): CurrentUser) -> Json<DataResponse<UserProfile>> {
    Json(DataResponse::new(user.into()))
}

/// Serves both PUT and PATCH. A blank email clears it.
pub async fn update_me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<DataResponse<UserProfile>>, AppError> {
    let email = match req.email.as_deref().map(str::trim) {
        None => user.email.clone(),
        Some("") => None,
        Some(email) => {
            if let Some(other) = repository::find_user_by_email(&state.db, email).await? {
                if other.id != user.id {
                    return Err(AppError::Conflict(
                        "Email already registered by another user".to_string(),
                    ));
                }
            }
            Some(email.to_string())
        }
    };
    let full_name = match req.full_name {
        Some(name) => Some(name).filter(|n| !n.trim().is_empty()),
        None => user.full_name.clone(),
    };
    let password_hash = match req.password.as_deref() {
        Some(password) => {
            check_password_len(password)?;
            hash_password(password)?
        }
        None => user.password_hash.clone(),
    };

    repository::update_user(
        &state.db,
        user.id,
        email.as_deref(),
        full_name.as_deref(),
        &password_hash,
    )
    .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("Email already registered by another user".to_string())
            }
            other => AppError::Database(other),
        })?;
    info!("Updated profile of user {}", user.username);

    let user = repository::find_user_by_id(&state.db, user.id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(DataResponse::new(user.into())))
}

pub async fn change_password(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    if req.current_password.is_empty() || req.new_password.is_empty() {
        return Err(AppError::BadRequest(
            "Current password and new password are required".to_string(),
        ));
    }
    check_password_len(&req.new_password)?;
    if !verify_password(&req.current_password, &user.password_hash) {
        return Err(AppError::Unauthorized("Current password is incorrect".to_string()));
    }

    let password_hash = hash_password(&req.new_password)?;
    repository::update_user(
        &state.db,
        user.id,
        user.email.as_deref(),
        user.full_name.as_deref(),
        &password_hash,
    )
    .await?;
    info!("User {} changed password", user.username);

    Ok(Json(MessageResponse {
        message: "Password changed successfully".to_string(),
    }))
}

fn check_password_len(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "New password must be at least {} characters long",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

pub async fn delete_me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<MessageResponse>, AppError> {
    if !repository::delete_user(&state.db, user.id).await? {
        return Err(AppError::NotFound);
    }
    info!("Deleted user {}", user.username);
    Ok(Json(MessageResponse {
        message: "User account deleted successfully".to_string(),
    }))
}

/// Binds a school account after proving the credentials work. Only the CAS
/// username is stored.
pub async fn bind_cas(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<CasBindRequest>,
) -> Result<Json<DataResponse<UserProfile>>, AppError> {
    let cas_username = req.cas_username.trim().to_string();
    if cas_username.is_empty() || req.cas_password.is_empty() {
        return Err(AppError::BadRequest("cas_username and cas_password are required".to_string()));
    }

    if let Some(owner) = repository::find_user_by_cas_username(&state.db, &cas_username).await? {
        if owner.id != user.id {
            return Err(AppError::Conflict("CAS account is bound to another user".to_string()));
        }
    }

    let credentials = CasCredentials {
        username: cas_username.clone(),
        password: req.cas_password,
    };
    state.portal.login(&credentials).await?;

    repository::bind_cas(&state.db, user.id, &cas_username, Utc::now()).await?;
    info!("User {} bound CAS account {}", user.username, cas_username);

    let user = repository::find_user_by_id(&state.db, user.id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(DataResponse::new(user.into())))
}

pub async fn unbind_cas(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<DataResponse<UserProfile>>, AppError> {
    if !user.cas_is_bound {
        return Err(AppError::BadRequest("No CAS account is bound".to_string()));
    }
    repository::unbind_cas(&state.db, user.id).await?;
    info!("User {} unbound CAS account", user.username);

    let user = repository::find_user_by_id(&state.db, user.id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(DataResponse::new(user.into())))
}
