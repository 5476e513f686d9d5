use std::sync::Arc;

use crate::{
    config::AppConfig,
    database::{MongoDB, NoteStore, PairingStore, TaskStore, UserStore},
    jobs::NotificationQueue,
    services::{
        auth_service::TokenIssuer,
        media_service::{CloudinaryUploader, DisabledUploader, MediaUploader},
    },
    utils::crypto::PasswordHasher,
};

/// Everything a request handler needs, injected once at startup.
pub struct AppContext {
    pub users: Arc<dyn UserStore>,
    pub pairings: Arc<dyn PairingStore>,
    pub notes: Arc<dyn NoteStore>,
    pub tasks: Arc<dyn TaskStore>,
    pub media: Arc<dyn MediaUploader>,
    pub hasher: PasswordHasher,
    pub tokens: TokenIssuer,
    pub notifications: NotificationQueue,
    pub code_prefix: String,
}

impl AppContext {
    pub fn from_mongo(db: MongoDB, config: &AppConfig, notifications: NotificationQueue) -> Self {
        let media: Arc<dyn MediaUploader> = match (
            config.cloudinary_cloud_name.as_deref(),
            config.cloudinary_upload_preset.as_deref(),
        ) {
            (Some(cloud), Some(preset)) => Arc::new(CloudinaryUploader::new(cloud, preset)),
            _ => {
                log::warn!("⚠️  Cloudinary not configured: inline images will be rejected");
                Arc::new(DisabledUploader)
            }
        };

        let db = Arc::new(db);

        AppContext {
            users: db.clone(),
            pairings: db.clone(),
            notes: db.clone(),
            tasks: db,
            media,
            hasher: PasswordHasher::new(config.bcrypt_cost),
            tokens: TokenIssuer::new(
                &config.jwt_secret,
                &config.jwt_issuer,
                &config.jwt_audience,
                config.jwt_ttl_hours,
            ),
            notifications,
            code_prefix: config.code_prefix.clone(),
        }
    }
}
