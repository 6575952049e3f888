use axum::body::Bytes;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::AppError;
use crate::models::User;
use crate::ucloud::CasCredentials;

/// Body accepted by every `/sync` endpoint. All fields are optional.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SyncRequest {
    pub school_username: Option<String>,
    pub school_password: Option<String>,
    pub cas_password: Option<String>,
}

/// Decodes an optional JSON body; an empty body yields the default value.
pub fn parse_optional_json<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {}", e)))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Picks the school account a sync runs as.
///
/// A bound user who sends no school account uses the bound CAS username and
/// must confirm with `cas_password`. Anything the caller sends explicitly
/// takes precedence over the binding.
pub fn resolve_credentials(user: &User, request: SyncRequest) -> Result<CasCredentials, AppError> {
    let school_username = non_blank(request.school_username);
    let school_password = non_blank(request.school_password);
    let cas_password = non_blank(request.cas_password);

    let bound_username = if user.cas_is_bound {
        non_blank(user.cas_username.clone())
    } else {
        None
    };

    let explicit = school_username.is_some() || school_password.is_some();
    let (username, password) = match bound_username {
        Some(bound) if !explicit => match cas_password {
            Some(password) => (Some(bound), Some(password)),
            None => return Err(AppError::CasPasswordRequired { cas_username: bound }),
        },
        Some(bound) => (
            school_username.or(Some(bound)),
            school_password.or(cas_password),
        ),
        None => (school_username, school_password),
    };

    match (username, password) {
        (Some(username), Some(password)) => Ok(CasCredentials { username, password }),
        _ => Err(AppError::BadRequest("Missing credentials".to_string())),
    }
}
