use actix_web::{web, HttpResponse, ResponseError};

use crate::api::OwnerQuery;
use crate::context::AppContext;
use crate::models::Task;
use crate::services::task_service::{self, TaskPayload};
use crate::utils::error::AppError;

#[utoipa::path(
    get,
    path = "/api/tasks",
    tag = "Tasks",
    params(OwnerQuery),
    responses(
        (status = 200, description = "Tasks, newest first", body = Vec<Task>),
        (status = 400, description = "Owner id missing")
    )
)]
pub async fn get_tasks(ctx: web::Data<AppContext>, query: web::Query<OwnerQuery>) -> HttpResponse {
    let Some(owner) = query.owner() else {
        return AppError::validation("User ID required").error_response();
    };

    match task_service::list_by_owner(&ctx, owner).await {
        Ok(tasks) => HttpResponse::Ok().json(tasks),
        Err(e) => {
            log::error!("❌ Failed to list tasks for {}: {}", owner, e);
            e.error_response()
        }
    }
}

/// POST /tasks
///
/// Um objeto cria uma tarefa. Um array substitui a lista inteira do dono
/// (dono vem da query ou do primeiro elemento).
#[utoipa::path(
    post,
    path = "/api/tasks",
    tag = "Tasks",
    params(OwnerQuery),
    request_body = TaskPayload,
    responses(
        (status = 200, description = "Created task, or {success} for a full replace"),
        (status = 400, description = "Missing owner or text")
    )
)]
pub async fn post_tasks(
    ctx: web::Data<AppContext>,
    query: web::Query<OwnerQuery>,
    payload: web::Json<TaskPayload>,
) -> HttpResponse {
    match payload.into_inner() {
        TaskPayload::One(input) => {
            log::info!("📋 POST /tasks - single task for {}", input.owner().unwrap_or("N/A"));

            match task_service::create_one(&ctx, &input).await {
                Ok(task) => HttpResponse::Ok().json(task),
                Err(e) => {
                    log::warn!("❌ Failed to create task: {}", e);
                    e.error_response()
                }
            }
        }
        TaskPayload::Many(inputs) => {
            let owner = query
                .owner()
                .or_else(|| inputs.first().and_then(|t| t.owner()))
                .map(str::to_string);

            let Some(owner) = owner else {
                // Lista vazia sem dono: nada a fazer
                log::debug!("ℹ️  POST /tasks - empty list without owner, skipping");
                return HttpResponse::Ok().json(serde_json::json!({ "success": true }));
            };

            log::info!("📋 POST /tasks - replacing {} task(s) for {}", inputs.len(), owner);

            match task_service::replace_all(&ctx, &owner, &inputs).await {
                Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "success": true })),
                Err(e) => {
                    log::warn!("❌ Failed to replace tasks for {}: {}", owner, e);
                    e.error_response()
                }
            }
        }
    }
}
