use serde::Deserialize;

use crate::{
    context::AppContext,
    models::{Note, NoteDraft, NotePatch},
    services::{media_service::resolve_images, sync_service},
    utils::error::AppError,
};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteRequest {
    pub profile_id: Option<String>,
    pub user_id: Option<String>,
    #[serde(flatten)]
    pub note: NoteDraft,
}

impl CreateNoteRequest {
    pub fn owner(&self) -> Option<&str> {
        self.profile_id
            .as_deref()
            .or(self.user_id.as_deref())
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateNoteRequest {
    pub id: Option<String>,
    #[serde(flatten)]
    pub patch: NotePatch,
}

/// Outcome of persisting a draft: the stored note and whether it was inserted now.
pub struct Persisted {
    pub note: Note,
    pub created: bool,
}

pub async fn list_by_owner(ctx: &AppContext, user_id: &str) -> Result<Vec<Note>, AppError> {
    Ok(ctx.notes.list_by_owner(user_id).await?)
}

pub async fn latest_for_owner(ctx: &AppContext, user_id: &str) -> Result<Option<Note>, AppError> {
    Ok(ctx.notes.latest_for_owner(user_id).await?)
}

/// Validates the draft, uploads inline images and inserts the note.
///
/// A draft carrying the id of a note the owner already has returns that note
/// untouched, so a client retry (or the widget flow) never double-inserts.
pub async fn persist(ctx: &AppContext, owner_id: &str, draft: NoteDraft) -> Result<Persisted, AppError> {
    if let Some(id) = draft.id.as_deref().filter(|id| !id.is_empty()) {
        if let Some(existing) = ctx.notes.find_by_id(id).await? {
            if existing.user_id != owner_id {
                return Err(AppError::Forbidden("Note id belongs to another user".to_string()));
            }
            log::info!("ℹ️  Note {} already stored, skipping insert", id);
            return Ok(Persisted {
                note: existing,
                created: false,
            });
        }
    }

    let note_type = draft
        .note_type
        .ok_or_else(|| AppError::validation("Note type is required"))?;
    let content = draft
        .content
        .ok_or_else(|| AppError::validation("Note content is required"))?;
    let timestamp = draft
        .timestamp
        .ok_or_else(|| AppError::validation("Note timestamp is required"))?;

    // Upload antes de qualquer escrita: se falhar, nada é salvo
    let images = match draft.images {
        Some(images) => Some(resolve_images(ctx.media.as_ref(), images).await?),
        None => None,
    };

    let note = Note {
        id: draft
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        user_id: owner_id.to_string(),
        note_type,
        content,
        color: draft.color,
        images,
        font_family: draft.font_family,
        font_weight: draft.font_weight,
        font_style: draft.font_style,
        text_decoration_line: draft.text_decoration_line,
        pinned: draft.pinned.unwrap_or(false),
        bookmarked: draft.bookmarked.unwrap_or(false),
        timestamp,
        music_track: draft.music_track,
        created_at: chrono::Utc::now().timestamp_millis(),
    };

    ctx.notes.insert(&note).await?;

    Ok(Persisted {
        note,
        created: true,
    })
}

/// Persists the note and, if it is new, queues a notification for the partner.
pub async fn create(ctx: &AppContext, request: CreateNoteRequest) -> Result<Note, AppError> {
    let owner_id = request
        .owner()
        .ok_or_else(|| AppError::validation("User ID required"))?
        .to_string();

    let persisted = persist(ctx, &owner_id, request.note).await?;

    if persisted.created {
        log::info!("📝 Note {} created for {}", persisted.note.id, owner_id);
        sync_service::notify_partner_of_note(ctx, &owner_id, &persisted.note).await;
    }

    Ok(persisted.note)
}

async fn owned_note(ctx: &AppContext, caller_id: &str, id: &str) -> Result<Option<Note>, AppError> {
    match ctx.notes.find_by_id(id).await? {
        Some(note) if note.user_id != caller_id => {
            log::warn!("❌ User {} tried to modify note {} owned by {}", caller_id, id, note.user_id);
            Err(AppError::Forbidden("You can only modify your own notes".to_string()))
        }
        other => Ok(other),
    }
}

pub async fn update(
    ctx: &AppContext,
    caller_id: &str,
    id: &str,
    mut patch: NotePatch,
) -> Result<Note, AppError> {
    owned_note(ctx, caller_id, id)
        .await?
        .ok_or_else(|| AppError::not_found("Note not found"))?;

    if let Some(images) = patch.images.take() {
        patch.images = Some(resolve_images(ctx.media.as_ref(), images).await?);
    }

    ctx.notes
        .update(id, &patch)
        .await?
        .ok_or_else(|| AppError::not_found("Note not found"))
}

/// Idempotent: deleting a note that does not exist succeeds.
pub async fn delete(ctx: &AppContext, caller_id: &str, id: &str) -> Result<(), AppError> {
    if owned_note(ctx, caller_id, id).await?.is_some() {
        ctx.notes.delete(id).await?;
    }
    Ok(())
}
