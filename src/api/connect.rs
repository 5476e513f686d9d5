use actix_web::{web, HttpResponse, ResponseError};

use crate::context::AppContext;
use crate::services::pairing_service::{self, ConnectRequest, ConnectResponse};
use crate::utils::error::AppError;

#[utoipa::path(
    post,
    path = "/api/connect",
    tag = "Pairing",
    request_body = ConnectRequest,
    responses(
        (status = 200, description = "Connected (or already connected)", body = ConnectResponse),
        (status = 400, description = "Missing fields or self-connection"),
        (status = 404, description = "Unknown account or partner code")
    )
)]
pub async fn connect(
    ctx: web::Data<AppContext>,
    request: web::Json<ConnectRequest>,
) -> HttpResponse {
    let (my_id, partner_code) = match (request.my_id.as_deref(), request.partner_code.as_deref()) {
        (Some(id), Some(code)) if !id.is_empty() && !code.is_empty() => (id, code),
        _ => return AppError::validation("Missing ID or Partner Code").error_response(),
    };

    log::info!("💞 POST /connect - user: {}, partner code: {}", my_id, partner_code);

    match pairing_service::connect(&ctx, my_id, partner_code).await {
        Ok(response) => {
            log::info!("✅ Connected {} -> {}", my_id, response.partner_id);
            HttpResponse::Ok().json(response)
        }
        Err(e) => {
            log::warn!("❌ Connection failed: {}", e);
            e.error_response()
        }
    }
}
