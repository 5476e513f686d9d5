// ==================== SYNC FLOWS ====================
// Combina pareamento, notas e notificações: aviso ao parceiro, widget e perfil

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    context::AppContext,
    jobs::NotificationJob,
    models::{Note, NoteDraft, User, WidgetNote},
    services::{note_service, pairing_service},
    utils::error::AppError,
};

pub const NOTE_RECEIVED: &str = "NOTE_RECEIVED";
pub const WIDGET_UPDATE: &str = "WIDGET_UPDATE";

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WidgetPushRequest {
    pub my_id: Option<String>,
    pub note: Option<NoteDraft>,
    pub note_id: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PartnerWidget {
    pub has_note: bool,
    pub last_note: Option<WidgetNote>,
}

#[derive(Debug, Serialize, PartialEq, ToSchema)]
pub struct PartnerSummary {
    pub id: String,
    pub name: Option<String>,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connected: Option<bool>,
}

#[derive(Debug, Serialize, PartialEq, ToSchema)]
pub struct WidgetStatusResponse {
    pub connected: bool,
    pub partner: Option<PartnerSummary>,
    pub widget: Option<PartnerWidget>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WidgetPushResponse {
    pub success: bool,
    pub note: Note,
    pub partner: PartnerSummary,
    pub partner_widget: PartnerWidget,
}

/// User's public fields, plus the partner fields when paired
#[derive(Debug, Serialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: String,
    pub name: Option<String>,
    pub code: String,
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner_code: Option<String>,
    /// RFC 3339
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connected_at: Option<String>,
}

impl ProfileResponse {
    pub fn own(user: &User) -> Self {
        ProfileResponse {
            id: user.user_id.clone(),
            name: user.name.clone(),
            code: user.code.clone(),
            avatar: user.avatar.clone(),
            partner_id: None,
            partner_name: None,
            partner_code: None,
            connected_at: None,
        }
    }
}

fn summary(partner: &User, connected: Option<bool>) -> PartnerSummary {
    PartnerSummary {
        id: partner.user_id.clone(),
        name: partner.name.clone(),
        code: partner.code.clone(),
        connected,
    }
}

async fn partner_widget(ctx: &AppContext, partner_id: &str) -> Result<PartnerWidget, AppError> {
    let latest = note_service::latest_for_owner(ctx, partner_id).await?;
    Ok(PartnerWidget {
        has_note: latest.is_some(),
        last_note: latest.as_ref().map(WidgetNote::from),
    })
}

/// Queues a NOTE_RECEIVED push for the owner's partner. Lookup failures are
/// logged and swallowed: the note is already stored.
pub async fn notify_partner_of_note(ctx: &AppContext, owner_id: &str, note: &Note) {
    let partner = match pairing_service::resolve_partner(ctx, owner_id).await {
        Ok(Some((_, partner))) => partner,
        Ok(None) => return,
        Err(e) => {
            log::error!("❌ Partner lookup for notification failed: {}", e);
            return;
        }
    };

    let Some(push_token) = partner.push_token else {
        log::debug!("ℹ️  Partner {} has no push token", partner.user_id);
        return;
    };

    ctx.notifications.enqueue(NotificationJob {
        push_token,
        title: "New Note! 💌".to_string(),
        body: "Your partner sent you a new note!".to_string(),
        data: serde_json::json!({
            "type": NOTE_RECEIVED,
            "noteId": note.id,
            "note": note,
        }),
    });
}

/// GET /widget: partner identity and a snapshot of their latest note.
pub async fn widget_status(ctx: &AppContext, my_id: &str) -> Result<WidgetStatusResponse, AppError> {
    let Some((_, partner)) = pairing_service::resolve_partner(ctx, my_id).await? else {
        return Ok(WidgetStatusResponse {
            connected: false,
            partner: None,
            widget: None,
        });
    };

    Ok(WidgetStatusResponse {
        connected: true,
        partner: Some(summary(&partner, None)),
        widget: Some(partner_widget(ctx, &partner.user_id).await?),
    })
}

/// POST /widget: stores (or reuses) my note, pings the partner and returns
/// the partner's widget snapshot.
pub async fn widget_push(ctx: &AppContext, request: WidgetPushRequest) -> Result<WidgetPushResponse, AppError> {
    let my_id = request
        .my_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::validation("Missing required fields: myId, note"))?;

    if request.note.is_none() && request.note_id.is_none() {
        return Err(AppError::validation("Missing required fields: myId, note"));
    }

    ctx.users
        .find_by_id(&my_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let pairing = pairing_service::find_pairing(ctx, &my_id)
        .await?
        .ok_or_else(|| AppError::validation("No partner connected"))?;

    let partner = ctx
        .users
        .find_by_id(pairing.other_side(&my_id))
        .await?
        .ok_or_else(|| AppError::not_found("Partner not found in database"))?;

    // noteId: nota já salva, só notifica. note: salva (ou reaproveita pelo id) e notifica.
    let note = if let Some(note_id) = request.note_id {
        ctx.notes
            .find_by_id(&note_id)
            .await?
            .filter(|n| n.user_id == my_id)
            .ok_or_else(|| AppError::not_found("Note not found"))?
    } else if let Some(draft) = request.note {
        note_service::persist(ctx, &my_id, draft).await?.note
    } else {
        return Err(AppError::validation("Missing required fields: myId, note"));
    };

    if let Some(push_token) = partner.push_token.clone() {
        ctx.notifications.enqueue(NotificationJob {
            push_token,
            title: "New Note!".to_string(),
            body: "Your partner sent you a new note.".to_string(),
            data: serde_json::json!({ "type": WIDGET_UPDATE, "noteId": note.id }),
        });
    }

    let widget = partner_widget(ctx, &partner.user_id).await?;

    log::info!("📲 Widget note {} pushed from {} to {}", note.id, my_id, partner.user_id);

    Ok(WidgetPushResponse {
        success: true,
        note,
        partner: summary(&partner, Some(true)),
        partner_widget: widget,
    })
}

/// GET /profile
pub async fn profile_view(ctx: &AppContext, user_id: &str) -> Result<ProfileResponse, AppError> {
    let user = ctx
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let mut profile = ProfileResponse::own(&user);

    if let Some((pairing, partner)) = pairing_service::resolve_partner(ctx, user_id).await? {
        profile.partner_id = Some(partner.user_id);
        profile.partner_name = partner.name;
        profile.partner_code = Some(partner.code);
        profile.connected_at = chrono::DateTime::from_timestamp_millis(pairing.created_at)
            .map(|d| d.to_rfc3339());
    }

    Ok(profile)
}
