use actix_web::{web, HttpResponse, ResponseError};
use serde::Deserialize;

use crate::api::OwnerQuery;
use crate::context::AppContext;
use crate::middleware::AuthUser;
use crate::models::Note;
use crate::services::note_service::{self, CreateNoteRequest, UpdateNoteRequest};
use crate::utils::error::AppError;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NoteIdQuery {
    pub id: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/notes",
    tag = "Notes",
    params(OwnerQuery),
    responses(
        (status = 200, description = "Notes ordered by timestamp, newest first", body = Vec<Note>),
        (status = 400, description = "Owner id missing")
    )
)]
pub async fn get_notes(ctx: web::Data<AppContext>, query: web::Query<OwnerQuery>) -> HttpResponse {
    let Some(owner) = query.owner() else {
        return AppError::validation("User ID required").error_response();
    };

    log::debug!("📒 GET /notes - owner: {}", owner);

    match note_service::list_by_owner(&ctx, owner).await {
        Ok(notes) => HttpResponse::Ok().json(notes),
        Err(e) => {
            log::error!("❌ Failed to list notes for {}: {}", owner, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/notes",
    tag = "Notes",
    request_body = CreateNoteRequest,
    responses(
        (status = 200, description = "Note created", body = Note),
        (status = 400, description = "Missing or invalid fields"),
        (status = 500, description = "Image upload failed")
    )
)]
pub async fn create_note(
    ctx: web::Data<AppContext>,
    request: web::Json<CreateNoteRequest>,
) -> HttpResponse {
    log::info!("📝 POST /notes - owner: {}", request.owner().unwrap_or("N/A"));

    match note_service::create(&ctx, request.into_inner()).await {
        Ok(note) => HttpResponse::Ok().json(note),
        Err(e) => {
            log::warn!("❌ Failed to create note: {}", e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    patch,
    path = "/api/notes",
    tag = "Notes",
    request_body = UpdateNoteRequest,
    responses(
        (status = 200, description = "Note updated", body = Note),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Note belongs to another user"),
        (status = 404, description = "Note not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_note(
    ctx: web::Data<AppContext>,
    user: AuthUser,
    request: web::Json<UpdateNoteRequest>,
) -> HttpResponse {
    let UpdateNoteRequest { id, patch } = request.into_inner();
    let Some(id) = id.filter(|id| !id.is_empty()) else {
        return AppError::validation("Note ID required").error_response();
    };

    log::info!("✏️  PATCH /notes - note: {}, user: {}", id, user.user_id);

    match note_service::update(&ctx, &user.user_id, &id, patch).await {
        Ok(note) => HttpResponse::Ok().json(note),
        Err(e) => {
            log::warn!("❌ Failed to update note {}: {}", id, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    delete,
    path = "/api/notes",
    tag = "Notes",
    params(NoteIdQuery),
    responses(
        (status = 200, description = "Note deleted (or already gone)"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Note belongs to another user")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_note(
    ctx: web::Data<AppContext>,
    user: AuthUser,
    query: web::Query<NoteIdQuery>,
) -> HttpResponse {
    let Some(id) = query.id.as_deref().filter(|id| !id.is_empty()) else {
        return AppError::validation("Note ID required").error_response();
    };

    log::info!("🗑️ DELETE /notes - note: {}, user: {}", id, user.user_id);

    match note_service::delete(&ctx, &user.user_id, id).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "success": true })),
        Err(e) => {
            log::warn!("❌ Failed to delete note {}: {}", id, e);
            e.error_response()
        }
    }
}
