use serde::Deserialize;

use crate::{
    context::AppContext,
    models::{Task, TaskInput},
    utils::error::AppError,
};

/// Corpo do POST /tasks: uma tarefa ou a lista inteira
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(untagged)]
pub enum TaskPayload {
    Many(Vec<TaskInput>),
    One(TaskInput),
}

/// Newest first.
pub async fn list_by_owner(ctx: &AppContext, user_id: &str) -> Result<Vec<Task>, AppError> {
    Ok(ctx.tasks.list_by_owner(user_id).await?)
}

pub async fn create_one(ctx: &AppContext, input: &TaskInput) -> Result<Task, AppError> {
    let owner = input
        .owner()
        .ok_or_else(|| AppError::validation("User ID required"))?;
    let text = input
        .text
        .as_deref()
        .ok_or_else(|| AppError::validation("Task text is required"))?;

    let task = Task::new(
        owner,
        text,
        input.completed.unwrap_or(false),
        chrono::Utc::now().timestamp_millis(),
    );
    ctx.tasks.prepend(&task).await?;
    Ok(task)
}

/// Replaces the owner's whole list in one write.
///
/// The list is stored in input order and `list_by_owner` returns it as is;
/// the decreasing stamps only keep `created_at` consistent with that order.
pub async fn replace_all(ctx: &AppContext, owner_id: &str, inputs: &[TaskInput]) -> Result<(), AppError> {
    let base = chrono::Utc::now().timestamp_millis();

    let tasks = inputs
        .iter()
        .enumerate()
        .map(|(i, input)| {
            let text = input
                .text
                .as_deref()
                .ok_or_else(|| AppError::validation("Task text is required"))?;
            Ok(Task::new(
                owner_id,
                text,
                input.completed.unwrap_or(false),
                base - i as i64,
            ))
        })
        .collect::<Result<Vec<Task>, AppError>>()?;

    ctx.tasks.replace_all(owner_id, &tasks).await?;

    log::info!("📋 Task list replaced for {}: {} task(s)", owner_id, tasks.len());
    Ok(())
}
