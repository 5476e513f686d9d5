// ==================== PUSH NOTIFICATIONS ====================
// Entrega best-effort via Expo Push API. Nenhum erro sobe para o chamador:
// falhas vão para o log `dead_letter`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Expo aceita no máximo 100 mensagens por requisição
pub const MAX_MESSAGES_PER_CHUNK: usize = 100;

pub const DEAD_LETTER: &str = "dead_letter";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PushMessage {
    pub to: String,
    pub sound: String,
    pub title: String,
    pub body: String,
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PushTicket {
    pub status: String,
    pub id: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExpoResponse {
    #[serde(default)]
    data: Vec<PushTicket>,
}

#[derive(Debug)]
pub enum DeliveryError {
    Transport(String),
    Gateway(String),
}

impl fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryError::Transport(msg) => write!(f, "Push transport error: {}", msg),
            DeliveryError::Gateway(msg) => write!(f, "Push gateway error: {}", msg),
        }
    }
}

impl std::error::Error for DeliveryError {}

#[async_trait]
pub trait PushGateway: Send + Sync {
    async fn send(&self, chunk: &[PushMessage]) -> Result<Vec<PushTicket>, DeliveryError>;
}

pub struct ExpoPushGateway {
    client: reqwest::Client,
    url: String,
}

impl ExpoPushGateway {
    pub fn new(url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl PushGateway for ExpoPushGateway {
    async fn send(&self, chunk: &[PushMessage]) -> Result<Vec<PushTicket>, DeliveryError> {
        let response = self
            .client
            .post(&self.url)
            .header("Accept", "application/json")
            .json(chunk)
            .timeout(std::time::Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(DeliveryError::Gateway(format!("HTTP {}", response.status())));
        }

        let parsed: ExpoResponse = response
            .json()
            .await
            .map_err(|e| DeliveryError::Gateway(format!("Failed to parse tickets: {}", e)))?;

        Ok(parsed.data)
    }
}

/// Valida o formato de um token Expo:
/// `ExponentPushToken[...]`, `ExpoPushToken[...]` ou um UUID 8-4-4-4-12.
///
/// Mais estrito que o `isExpoPushToken` do SDK: colchetes vazios
/// (`ExponentPushToken[]`) são recusados, o gateway nunca aceitaria esse token.
pub fn is_push_token(token: &str) -> bool {
    let bracketed = ["ExponentPushToken[", "ExpoPushToken["].iter().any(|prefix| {
        token
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_suffix(']'))
            .map(|inner| !inner.is_empty())
            .unwrap_or(false)
    });

    bracketed || is_uuid_shaped(token)
}

fn is_uuid_shaped(token: &str) -> bool {
    let groups: Vec<&str> = token.split('-').collect();
    let lengths = [8, 4, 4, 4, 12];

    groups.len() == lengths.len()
        && groups
            .iter()
            .zip(lengths)
            .all(|(g, len)| g.len() == len && g.chars().all(|c| c.is_ascii_alphanumeric()))
}

pub fn chunk_messages(messages: Vec<PushMessage>) -> Vec<Vec<PushMessage>> {
    messages
        .chunks(MAX_MESSAGES_PER_CHUNK)
        .map(|c| c.to_vec())
        .collect()
}

/// Notification dispatcher: validate, batch, deliver, log. Never fails.
#[derive(Clone)]
pub struct NotificationDispatcher {
    gateway: Arc<dyn PushGateway>,
}

impl NotificationDispatcher {
    pub fn new(gateway: Arc<dyn PushGateway>) -> Self {
        Self { gateway }
    }

    pub async fn notify(&self, push_token: &str, title: &str, body: &str, data: serde_json::Value) {
        if !is_push_token(push_token) {
            log::error!(
                target: DEAD_LETTER,
                "Push token {} is not a valid Expo push token",
                push_token
            );
            return;
        }

        let message = PushMessage {
            to: push_token.to_string(),
            sound: "default".to_string(),
            title: title.to_string(),
            body: body.to_string(),
            data,
        };

        self.deliver(vec![message]).await;
    }

    async fn deliver(&self, messages: Vec<PushMessage>) {
        for chunk in chunk_messages(messages) {
            match self.gateway.send(&chunk).await {
                Ok(tickets) => {
                    for ticket in tickets.iter().filter(|t| t.status != "ok") {
                        log::warn!(
                            target: DEAD_LETTER,
                            "⚠️  Push ticket rejected: {}",
                            ticket.message.as_deref().unwrap_or("unknown reason")
                        );
                    }
                    log::info!("📨 Push notification sent: {} ticket(s)", tickets.len());
                }
                Err(e) => {
                    let recipients: Vec<&str> = chunk.iter().map(|m| m.to.as_str()).collect();
                    log::error!(target: DEAD_LETTER, "❌ {} (recipients: {:?})", e, recipients);
                }
            }
        }
    }
}
