use utoipa::OpenApi;
use utoipa::openapi::security::{SecurityScheme, HttpAuthScheme, HttpBuilder};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Couples Service API",
        version = "1.0.0",
        description = "Backend for the couples notes app. \n\n**Authentication:** register/login return a JWT. Note mutation (PATCH/DELETE /api/notes) and account deletion require it as a Bearer token.\n\n**Features:**\n- Invite-code pairing\n- Notes with image upload\n- Shared task lists\n- Home-screen widget sync with push notifications",
    ),
    paths(
        // Auth
        crate::api::auth::register,
        crate::api::auth::login,
        crate::api::auth::push_token,
        crate::api::auth::delete_account,

        // Health
        crate::api::health::health_check,

        // Pairing
        crate::api::connect::connect,

        // Notes
        crate::api::notes::get_notes,
        crate::api::notes::create_note,
        crate::api::notes::update_note,
        crate::api::notes::delete_note,

        // Profile
        crate::api::profile::get_profile,
        crate::api::profile::update_profile,

        // Tasks
        crate::api::tasks::get_tasks,
        crate::api::tasks::post_tasks,

        // Widget
        crate::api::widget::get_widget,
        crate::api::widget::post_widget,
    ),
    components(
        schemas(
            crate::services::auth_service::RegisterRequest,
            crate::services::auth_service::LoginRequest,
            crate::services::auth_service::PushTokenRequest,
            crate::services::auth_service::AuthResponse,
            crate::models::UserInfo,

            crate::api::health::HealthResponse,

            crate::services::pairing_service::ConnectRequest,
            crate::services::pairing_service::ConnectResponse,

            crate::models::Note,
            crate::models::NoteType,
            crate::models::MusicTrack,
            crate::models::NoteDraft,
            crate::models::NotePatch,
            crate::services::note_service::CreateNoteRequest,
            crate::services::note_service::UpdateNoteRequest,

            crate::api::profile::UpdateProfileRequest,
            crate::services::sync_service::ProfileResponse,

            crate::models::Task,
            crate::models::TaskInput,
            crate::services::task_service::TaskPayload,

            crate::models::WidgetNote,
            crate::services::sync_service::WidgetPushRequest,
            crate::services::sync_service::WidgetPushResponse,
            crate::services::sync_service::WidgetStatusResponse,
            crate::services::sync_service::PartnerSummary,
            crate::services::sync_service::PartnerWidget,
        )
    ),
    tags(
        (name = "Auth", description = "Registration with generated invite code, login and push token sync."),
        (name = "Health", description = "Health check endpoint for monitoring service status."),
        (name = "Pairing", description = "Connect two users through an invite code."),
        (name = "Notes", description = "Text, drawing and collage notes. Inline images are uploaded before storing."),
        (name = "Profile", description = "User profile with partner fields when paired."),
        (name = "Tasks", description = "Per-user task lists. POSTing an array replaces the whole list."),
        (name = "Widget", description = "Home-screen widget: partner snapshot and note push."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token returned by /api/auth/register or /api/auth/login"))
                        .build()
                ),
            );
        }
    }
}
