// ==================== MEDIA UPLOADS ====================
// Imagens inline (data URI base64) vão para o Cloudinary antes de a nota ser salva;
// URLs já existentes passam direto.

use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;

use crate::utils::error::AppError;

const CLOUDINARY_API_BASE: &str = "https://api.cloudinary.com/v1_1";

#[async_trait]
pub trait MediaUploader: Send + Sync {
    /// Uploads one inline image (full data URI) and returns its durable URL.
    async fn upload(&self, data_uri: &str) -> Result<String, AppError>;
}

#[derive(Debug, Deserialize)]
struct CloudinaryUploadResponse {
    secure_url: String,
}

/// Unsigned uploads through an upload preset
pub struct CloudinaryUploader {
    client: reqwest::Client,
    cloud_name: String,
    upload_preset: String,
}

impl CloudinaryUploader {
    pub fn new(cloud_name: &str, upload_preset: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            cloud_name: cloud_name.to_string(),
            upload_preset: upload_preset.to_string(),
        }
    }
}

#[async_trait]
impl MediaUploader for CloudinaryUploader {
    async fn upload(&self, data_uri: &str) -> Result<String, AppError> {
        let url = format!("{}/{}/image/upload", CLOUDINARY_API_BASE, self.cloud_name);

        let response = self
            .client
            .post(&url)
            .form(&[("file", data_uri), ("upload_preset", self.upload_preset.as_str())])
            .timeout(std::time::Duration::from_secs(30))
            .send()
            .await
            .map_err(|e| AppError::Upload(format!("Cloudinary request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Upload(format!("Cloudinary API error: {}", response.status())));
        }

        let uploaded: CloudinaryUploadResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upload(format!("Failed to parse Cloudinary response: {}", e)))?;

        Ok(uploaded.secure_url)
    }
}

/// Used when no object storage is configured: inline images are rejected.
pub struct DisabledUploader;

#[async_trait]
impl MediaUploader for DisabledUploader {
    async fn upload(&self, _data_uri: &str) -> Result<String, AppError> {
        Err(AppError::Upload("Media storage is not configured".to_string()))
    }
}

pub fn is_inline_image(entry: &str) -> bool {
    entry.starts_with("data:image/")
}

/// Checks that a `data:image/...;base64,` entry carries a decodable payload.
fn validate_inline_image(entry: &str) -> Result<(), AppError> {
    let payload = entry
        .split_once(";base64,")
        .map(|(_, payload)| payload)
        .ok_or_else(|| AppError::validation("Inline image must be base64 encoded"))?;

    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|_| AppError::validation("Inline image is not valid base64"))?;

    Ok(())
}

/// Uploads every inline image in order and returns the list with URLs only.
/// The first failed upload aborts the whole operation.
pub async fn resolve_images(
    uploader: &dyn MediaUploader,
    images: Vec<String>,
) -> Result<Vec<String>, AppError> {
    let mut resolved = Vec::with_capacity(images.len());

    for entry in images {
        if is_inline_image(&entry) {
            validate_inline_image(&entry)?;
            let url = uploader.upload(&entry).await?;
            log::info!("🖼️  Inline image uploaded: {}", url);
            resolved.push(url);
        } else {
            resolved.push(entry);
        }
    }

    Ok(resolved)
}
