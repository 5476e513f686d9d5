use actix_web::{web, HttpResponse, ResponseError};
use serde::Deserialize;

use crate::context::AppContext;
use crate::services::sync_service::{self, WidgetPushRequest, WidgetPushResponse, WidgetStatusResponse};
use crate::utils::error::AppError;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct WidgetQuery {
    pub my_id: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/widget",
    tag = "Widget",
    params(WidgetQuery),
    responses(
        (status = 200, description = "Partner snapshot (connected=false when unpaired)", body = WidgetStatusResponse),
        (status = 400, description = "myId missing")
    )
)]
pub async fn get_widget(ctx: web::Data<AppContext>, query: web::Query<WidgetQuery>) -> HttpResponse {
    let Some(my_id) = query.my_id.as_deref().filter(|id| !id.is_empty()) else {
        return AppError::validation("Missing myId").error_response();
    };

    log::debug!("📱 GET /widget - user: {}", my_id);

    match sync_service::widget_status(&ctx, my_id).await {
        Ok(status) => HttpResponse::Ok().json(status),
        Err(e) => {
            log::error!("❌ Failed to load widget for {}: {}", my_id, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/widget",
    tag = "Widget",
    request_body = WidgetPushRequest,
    responses(
        (status = 200, description = "Note stored and partner notified", body = WidgetPushResponse),
        (status = 400, description = "Missing fields or no partner connected"),
        (status = 404, description = "User, partner or note not found")
    )
)]
pub async fn post_widget(
    ctx: web::Data<AppContext>,
    request: web::Json<WidgetPushRequest>,
) -> HttpResponse {
    log::info!("📱 POST /widget - user: {}", request.my_id.as_deref().unwrap_or("N/A"));

    match sync_service::widget_push(&ctx, request.into_inner()).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => {
            log::warn!("❌ Widget push failed: {}", e);
            e.error_response()
        }
    }
}
