use actix_web::{web, HttpResponse, ResponseError};
use serde::Deserialize;

use crate::context::AppContext;
use crate::services::auth_service;
use crate::services::sync_service::{self, ProfileResponse};
use crate::utils::error::AppError;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProfileQuery {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateProfileRequest {
    pub id: Option<String>,
    pub name: Option<String>,
    pub avatar: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/profile",
    tag = "Profile",
    params(ProfileQuery),
    responses(
        (status = 200, description = "Profile with partner fields when paired", body = ProfileResponse),
        (status = 400, description = "Id missing"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_profile(ctx: web::Data<AppContext>, query: web::Query<ProfileQuery>) -> HttpResponse {
    let Some(id) = query.id.as_deref().filter(|id| !id.is_empty()) else {
        return AppError::validation("User ID required").error_response();
    };

    log::debug!("👤 GET /profile - user: {}", id);

    match sync_service::profile_view(&ctx, id).await {
        Ok(profile) => HttpResponse::Ok().json(profile),
        Err(e) => {
            log::warn!("❌ Failed to load profile {}: {}", id, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    put,
    path = "/api/profile",
    tag = "Profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ProfileResponse),
        (status = 400, description = "Id missing"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_profile(
    ctx: web::Data<AppContext>,
    request: web::Json<UpdateProfileRequest>,
) -> HttpResponse {
    let Some(id) = request.id.as_deref().filter(|id| !id.is_empty()) else {
        return AppError::validation("User ID required").error_response();
    };

    log::info!("👤 PUT /profile - user: {}", id);

    match auth_service::update_profile(&ctx, id, request.name.as_deref(), request.avatar.as_deref()).await {
        Ok(user) => {
            log::info!("✅ Profile updated: {}", id);
            HttpResponse::Ok().json(ProfileResponse::own(&user))
        }
        Err(e) => {
            log::warn!("❌ Failed to update profile {}: {}", id, e);
            e.error_response()
        }
    }
}
