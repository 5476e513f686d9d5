// ==================== NOTIFICATION WORKER ====================
// Notificações são enfileiradas depois que a escrita principal termina e entregues
// por uma task em background. A resposta HTTP nunca espera por elas.

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::services::push_service::{NotificationDispatcher, DEAD_LETTER};

#[derive(Debug, Clone, PartialEq)]
pub struct NotificationJob {
    pub push_token: String,
    pub title: String,
    pub body: String,
    pub data: serde_json::Value,
}

#[derive(Clone)]
pub struct NotificationQueue {
    tx: UnboundedSender<NotificationJob>,
}

impl NotificationQueue {
    pub fn new() -> (Self, UnboundedReceiver<NotificationJob>) {
        let (tx, rx) = unbounded_channel();
        (Self { tx }, rx)
    }

    /// Never blocks and never fails; a closed queue only produces a dead-letter entry.
    pub fn enqueue(&self, job: NotificationJob) {
        if let Err(e) = self.tx.send(job) {
            log::error!(
                target: DEAD_LETTER,
                "❌ Notification queue closed, dropping '{}' for {}",
                e.0.title,
                e.0.push_token
            );
        }
    }
}

/// Inicia o worker que consome a fila e chama o dispatcher
pub fn start_notification_worker(
    mut rx: UnboundedReceiver<NotificationJob>,
    dispatcher: NotificationDispatcher,
) -> tokio::task::JoinHandle<()> {
    log::info!("📨 Starting notification worker");

    tokio::spawn(async move {
        while let Some(job) = rx.recv().await {
            dispatcher
                .notify(&job.push_token, &job.title, &job.body, job.data)
                .await;
        }
        log::info!("📨 Notification worker stopped");
    })
}
