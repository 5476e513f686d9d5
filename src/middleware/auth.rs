use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use std::future::{ready, Ready};

use crate::{context::AppContext, services::auth_service::Claims, utils::error::AppError};

/// Authenticated caller, extracted from `Authorization: Bearer <jwt>`.
///
/// Handlers that take an `AuthUser` reject the request with 401 before running
/// when the header is missing, malformed or carries an invalid token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub claims: Claims,
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthUser, AppError> {
    let ctx = req
        .app_data::<web::Data<AppContext>>()
        .ok_or_else(|| AppError::Internal("AppContext not registered".to_string()))?;

    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::Auth("Missing authorization token".to_string()))?;

    let token = header_value
        .to_str()
        .ok()
        .and_then(|h| h.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Auth("Invalid token format".to_string()))?;

    let claims = ctx.tokens.verify(token).map_err(|e| {
        log::warn!("❌ Invalid token: {}", e);
        AppError::Auth("Invalid or expired token".to_string())
    })?;

    Ok(AuthUser {
        user_id: claims.sub.clone(),
        claims,
    })
}
